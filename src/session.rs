//! Emulation session
//!
//! A [`Session`] owns one FIFO pair together with the hardware it touches:
//! both I/O register banks, the interrupt lines and the reschedule latch.
//! Several sessions can coexist; nothing is global.
//!
//! Memory-mapped dispatch (addresses are per processor):
//! - `0x04000184` `IPCFIFOCNT`: 8/16/32-bit writes go through
//!   [`IpcFifo::configure`], reads return the register
//! - `0x04000188` `IPCFIFOSEND`: 32-bit writes push a word
//! - `0x04100000` `IPCFIFORECV`: 32-bit reads pop a word
//! - `0x04000208` `IME`, `0x04000210` `IE`, `0x04000214` `IF`
//! - anything else in the I/O bank is plain storage

use crate::config::SessionConfig;
use crate::io::{IoRegisters, IO_BANK_SIZE, IO_BASE};
use crate::irq::{InterruptLines, REG_IE, REG_IF, REG_IME};
use crate::renderer::{AudioRenderer, SampleSource};
use crate::Result;
use ncsf_ipc::{
    InterruptController, IpcFifo, IpcFifoCnt, IpcIrq, Processor, RegisterBus, Scheduler,
    IPCFIFOCNT, IPCFIFORECV_ADDR, IPCFIFOSEND,
};
use ncsf_transposer::Sample;
use parking_lot::Mutex;
use std::sync::Arc;

/// Session shared between a CPU thread and a render thread.
pub type SharedSession = Arc<Mutex<Session>>;

/// Counts reschedule requests until the driver collects them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescheduleLatch {
    requests: usize,
}

impl RescheduleLatch {
    /// Latch with no pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request.
    pub fn request(&mut self) {
        self.requests += 1;
    }

    /// Requests recorded since the last [`take`](Self::take).
    pub fn pending(&self) -> usize {
        self.requests
    }

    /// Return the pending count and reset it.
    pub fn take(&mut self) -> usize {
        std::mem::take(&mut self.requests)
    }
}

impl Scheduler for RescheduleLatch {
    fn reschedule(&mut self) {
        self.request();
    }
}

/// The hardware around the FIFO.
#[derive(Debug, Clone, Default)]
struct Board {
    io: IoRegisters,
    irq: InterruptLines,
    latch: RescheduleLatch,
}

impl RegisterBus for Board {
    fn read_io16(&self, cpu: Processor, offset: u32) -> u16 {
        self.io.read16(cpu, offset)
    }

    fn write_io16(&mut self, cpu: Processor, offset: u32, value: u16) {
        self.io.write16(cpu, offset, value);
    }
}

impl InterruptController for Board {
    fn raise_interrupt(&mut self, cpu: Processor, irq: IpcIrq) {
        log::trace!("{cpu}: IRQ {irq:?} (bit {})", irq.bit());
        self.irq.raise(cpu, irq);
    }
}

impl Scheduler for Board {
    fn reschedule(&mut self) {
        self.latch.request();
    }
}

/// One running emulation instance.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    fifo: IpcFifo,
    board: Board,
}

impl Session {
    /// Session with the default configuration and both FIFOs initialized.
    pub fn new() -> Self {
        Self::build(SessionConfig::default())
    }

    /// Session with `config`, validated first.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SessionConfig) -> Self {
        let mut session = Self {
            config,
            fifo: IpcFifo::new(),
            board: Board::default(),
        };
        session.reset();
        session
    }

    /// Clear every register and re-initialize both FIFOs.
    pub fn reset(&mut self) {
        self.board.io.reset();
        self.board.irq.reset();
        self.board.latch = RescheduleLatch::new();
        for cpu in Processor::ALL {
            self.fifo.init(cpu, &mut self.board);
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The FIFO pair.
    pub fn fifo(&self) -> &IpcFifo {
        &self.fifo
    }

    /// I/O register banks.
    pub fn io(&self) -> &IoRegisters {
        &self.board.io
    }

    /// Interrupt lines.
    pub fn interrupts(&self) -> &InterruptLines {
        &self.board.irq
    }

    /// Mutable interrupt lines, for the CPU core to acknowledge requests.
    pub fn interrupts_mut(&mut self) -> &mut InterruptLines {
        &mut self.board.irq
    }

    /// Current `IPCFIFOCNT` of `cpu`.
    pub fn fifo_control(&self, cpu: Processor) -> IpcFifoCnt {
        IpcFifoCnt::from_register(self.board.io.read16(cpu, IPCFIFOCNT))
    }

    /// Number of reschedule requests since the last call; resets the count.
    pub fn take_reschedule(&mut self) -> usize {
        self.board.latch.take()
    }

    /// `cpu` writes `value` to `IPCFIFOSEND`.
    pub fn fifo_send(&mut self, cpu: Processor, value: u32) {
        self.fifo.send(cpu, value, &mut self.board);
    }

    /// `cpu` reads `IPCFIFORECV`.
    pub fn fifo_receive(&mut self, cpu: Processor) -> u32 {
        self.fifo.receive(cpu, &mut self.board)
    }

    /// `cpu` writes `value` to `IPCFIFOCNT`.
    pub fn fifo_configure(&mut self, cpu: Processor, value: u16) {
        self.fifo.configure(cpu, value, &mut self.board);
    }

    /// Build a renderer from this session's audio configuration.
    pub fn audio_renderer<S, Src>(&self, source: Src) -> Result<AudioRenderer<S, Src>>
    where
        S: Sample,
        Src: SampleSource<S>,
    {
        AudioRenderer::new(&self.config.audio, source)
    }

    /// Wrap the session for use from several threads.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// 8-bit read.
    pub fn read8(&self, cpu: Processor, addr: u32) -> u8 {
        match io_offset(addr) {
            Some(offset) if is_irq_register(offset) => {
                let word = self.board.irq.read_register(cpu, offset & !3);
                (word >> ((offset & 3) * 8)) as u8
            }
            Some(offset) => self.board.io.read8(cpu, offset),
            None => unmapped_read(cpu, addr),
        }
    }

    /// 16-bit read. The address is halfword aligned first.
    pub fn read16(&self, cpu: Processor, addr: u32) -> u16 {
        let addr = addr & !1;
        match io_offset(addr) {
            Some(offset) if is_irq_register(offset) => {
                let word = self.board.irq.read_register(cpu, offset & !3);
                (word >> ((offset & 3) * 8)) as u16
            }
            Some(offset) => self.board.io.read16(cpu, offset),
            None => unmapped_read(cpu, addr) as u16,
        }
    }

    /// 32-bit read. The address is word aligned first.
    pub fn read32(&mut self, cpu: Processor, addr: u32) -> u32 {
        let addr = addr & !3;
        if addr == IPCFIFORECV_ADDR {
            return self.fifo_receive(cpu);
        }
        match io_offset(addr) {
            Some(offset) if is_irq_register(offset) => self.board.irq.read_register(cpu, offset),
            Some(offset) => self.board.io.read32(cpu, offset),
            None => unmapped_read(cpu, addr) as u32,
        }
    }

    /// 8-bit write.
    pub fn write8(&mut self, cpu: Processor, addr: u32, value: u8) {
        self.write_lanes(cpu, addr, u32::from(value), 1);
    }

    /// 16-bit write. The address is halfword aligned first.
    pub fn write16(&mut self, cpu: Processor, addr: u32, value: u16) {
        self.write_lanes(cpu, addr & !1, u32::from(value), 2);
    }

    /// 32-bit write. The address is word aligned first.
    pub fn write32(&mut self, cpu: Processor, addr: u32, value: u32) {
        let addr = addr & !3;
        if addr == IO_BASE + IPCFIFOSEND {
            self.fifo_send(cpu, value);
            return;
        }
        self.write_lanes(cpu, addr, value, 4);
    }

    /// Write `width` bytes of `value` at `addr`, splitting by register.
    fn write_lanes(&mut self, cpu: Processor, addr: u32, value: u32, width: u32) {
        let Some(offset) = io_offset(addr) else {
            log::trace!("{cpu}: write of {value:#x} to unmapped {addr:#010x} ignored");
            return;
        };
        let shift = (offset & 3) * 8;
        let lanes = if width == 4 {
            u32::MAX
        } else {
            ((1u32 << (width * 8)) - 1) << shift
        };
        let word = offset & !3;

        if word == IPCFIFOCNT & !3 && offset & 2 == 0 {
            // Only the low halfword of the word holds IPCFIFOCNT
            let current = u32::from(self.board.io.read16(cpu, IPCFIFOCNT) & IpcFifoCnt::WRITEABLE.bits());
            let merged = (current & !lanes) | ((value << shift) & lanes);
            self.fifo_configure(cpu, merged as u16);
        } else if word == IPCFIFOSEND {
            log::trace!("{cpu}: {width}-byte write to IPCFIFOSEND ignored");
        } else if is_irq_register(offset) {
            let value = (value << shift) & lanes;
            let merged = if word == REG_IF {
                value
            } else {
                (self.board.irq.read_register(cpu, word) & !lanes) | value
            };
            self.board.irq.write_register(cpu, word, merged);
        } else {
            match width {
                1 => self.board.io.write8(cpu, offset, value as u8),
                2 => self.board.io.write16(cpu, offset, value as u16),
                _ => self.board.io.write32(cpu, offset, value),
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn io_offset(addr: u32) -> Option<u32> {
    let offset = addr.checked_sub(IO_BASE)?;
    (offset < IO_BANK_SIZE as u32).then_some(offset)
}

fn is_irq_register(offset: u32) -> bool {
    matches!(offset & !3, REG_IME | REG_IE | REG_IF)
}

fn unmapped_read(cpu: Processor, addr: u32) -> u8 {
    log::trace!("{cpu}: read from unmapped {addr:#010x}");
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_initialized() {
        let session = Session::new();
        for cpu in Processor::ALL {
            let cnt = session.fifo_control(cpu);
            assert!(cnt.is_enabled());
            assert!(cnt.contains(IpcFifoCnt::SEND_EMPTY | IpcFifoCnt::RECV_EMPTY));
            assert!(session.fifo().queue(cpu).is_empty());
        }
    }

    #[test]
    fn test_reschedule_latch() {
        let mut latch = RescheduleLatch::new();
        latch.reschedule();
        latch.request();
        assert_eq!(latch.pending(), 2);
        assert_eq!(latch.take(), 2);
        assert_eq!(latch.take(), 0);
    }

    #[test]
    fn test_io_offset() {
        assert_eq!(io_offset(0x0400_0184), Some(0x184));
        assert_eq!(io_offset(0x03FF_FFFF), None);
        assert_eq!(io_offset(IO_BASE + IO_BANK_SIZE as u32), None);
        assert!(is_irq_register(0x216));
        assert!(!is_irq_register(0x20C));
    }
}
