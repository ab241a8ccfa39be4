//! Inter-processor FIFO
//!
//! Two 16-word queues, one per direction. Processor `n` pushes into queue `n`
//! and pops from queue `n ^ 1`. Every operation mirrors its effect into both
//! processors' `IPCFIFOCNT` registers; errors are reported only through the
//! sticky error bit, never to the caller.

use crate::bus::{IpcHost, RegisterBus};
use crate::registers::{IpcFifoCnt, IpcIrq, Processor, IPCFIFOCNT, IPCFIFOCNT_RESET};

/// Number of 32-bit slots in each queue.
pub const FIFO_DEPTH: usize = 16;

/// One direction of the FIFO.
///
/// `size` is tracked separately from `head`/`tail`; the indices wrap
/// unconditionally and a push is refused only once `size` reaches the depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FifoQueue {
    buf: [u32; FIFO_DEPTH],
    head: usize,
    tail: usize,
    size: usize,
}

impl FifoQueue {
    /// Index of the next word to be popped.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Index of the next free slot.
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Number of queued words.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when no words are queued.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// True when a further push would overflow.
    pub fn is_full(&self) -> bool {
        self.size > FIFO_DEPTH - 1
    }

    /// Queued words in FIFO order, without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.size.min(FIFO_DEPTH)).map(move |i| self.buf[(self.head + i) % FIFO_DEPTH])
    }

    fn push(&mut self, value: u32) {
        self.buf[self.tail] = value;
        self.tail = (self.tail + 1) % FIFO_DEPTH;
        self.size += 1;
    }

    fn pop(&mut self) -> u32 {
        let value = self.buf[self.head];
        self.head = (self.head + 1) % FIFO_DEPTH;
        self.size -= 1;
        value
    }

    /// Drop the indices without touching the stored words.
    fn flush(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.size = 0;
    }
}

#[inline]
fn read_cnt<H: RegisterBus + ?Sized>(host: &H, cpu: Processor) -> IpcFifoCnt {
    IpcFifoCnt::from_register(host.read_io16(cpu, IPCFIFOCNT))
}

#[inline]
fn write_cnt<H: RegisterBus + ?Sized>(host: &mut H, cpu: Processor, cnt: IpcFifoCnt) {
    host.write_io16(cpu, IPCFIFOCNT, cnt.bits());
}

/// The FIFO pair shared by the two processors.
#[derive(Debug, Clone, Default)]
pub struct IpcFifo {
    queues: [FifoQueue; 2],
}

impl IpcFifo {
    /// Create a FIFO pair with both queues empty.
    ///
    /// The registers on the bus are not touched; call [`IpcFifo::init`] for
    /// each processor once the bus exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// The queue `cpu` sends into.
    pub fn queue(&self, cpu: Processor) -> &FifoQueue {
        &self.queues[cpu.index()]
    }

    /// Zero `cpu`'s queue and write the reset value to its `IPCFIFOCNT`.
    pub fn init<H: RegisterBus + ?Sized>(&mut self, cpu: Processor, host: &mut H) {
        self.queues[cpu.index()] = FifoQueue::default();
        host.write_io16(cpu, IPCFIFOCNT, IPCFIFOCNT_RESET);
    }

    /// Push `value` from `cpu` towards its peer (`IPCFIFOSEND` write).
    pub fn send<H: IpcHost + ?Sized>(&mut self, cpu: Processor, value: u32, host: &mut H) {
        let mut cnt_l = read_cnt(host, cpu);
        if !cnt_l.is_enabled() {
            return;
        }
        let remote = cpu.remote();

        if self.queues[cpu.index()].is_full() {
            log::debug!("IPC {cpu} send FIFO overflow, dropping 0x{value:08X}");
            cnt_l.insert(IpcFifoCnt::ERROR);
            write_cnt(host, cpu, cnt_l);
            return;
        }

        let mut cnt_r = read_cnt(host, remote);

        cnt_l.remove(IpcFifoCnt::SEND_STATUS);
        cnt_r.remove(IpcFifoCnt::RECV_STATUS);

        let queue = &mut self.queues[cpu.index()];
        queue.push(value);
        log::trace!(
            "IPC {cpu} send 0x{value:08X} size {} (l 0x{:04X}, r 0x{:04X}, tail {})",
            queue.size,
            cnt_l.bits(),
            cnt_r.bits(),
            queue.tail
        );

        if queue.is_full() {
            cnt_l.insert(IpcFifoCnt::SEND_FULL);
            cnt_r.insert(IpcFifoCnt::RECV_FULL);
        }

        write_cnt(host, cpu, cnt_l);
        write_cnt(host, remote, cnt_r);

        if cnt_r.contains(IpcFifoCnt::RECV_IRQ_ENABLE) {
            host.raise_interrupt(remote, IpcIrq::RecvNotEmpty);
        }

        host.reschedule();
    }

    /// Pop the oldest word the peer sent to `cpu` (`IPCFIFORECV` read).
    ///
    /// Returns 0 when the FIFO is disabled or the peer's queue is empty; the
    /// latter also latches the error bit.
    pub fn receive<H: IpcHost + ?Sized>(&mut self, cpu: Processor, host: &mut H) -> u32 {
        let mut cnt_l = read_cnt(host, cpu);
        if !cnt_l.is_enabled() {
            return 0;
        }
        let remote = cpu.remote();

        if self.queues[remote.index()].is_empty() {
            log::debug!("IPC {cpu} receive on empty FIFO");
            cnt_l.insert(IpcFifoCnt::ERROR);
            write_cnt(host, cpu, cnt_l);
            return 0;
        }

        let mut cnt_r = read_cnt(host, remote);

        cnt_l.remove(IpcFifoCnt::RECV_STATUS);
        cnt_r.remove(IpcFifoCnt::SEND_STATUS);

        let queue = &mut self.queues[remote.index()];
        let value = queue.pop();
        log::trace!(
            "IPC {cpu} recv 0x{value:08X} size {} (l 0x{:04X}, r 0x{:04X}, head {})",
            queue.size,
            cnt_l.bits(),
            cnt_r.bits(),
            queue.head
        );

        if queue.is_empty() {
            cnt_l.insert(IpcFifoCnt::RECV_EMPTY);
            cnt_r.insert(IpcFifoCnt::SEND_EMPTY);

            if cnt_r.contains(IpcFifoCnt::SEND_IRQ_ENABLE) {
                host.raise_interrupt(remote, IpcIrq::SendEmpty);
            }
        }

        write_cnt(host, cpu, cnt_l);
        write_cnt(host, remote, cnt_r);

        host.reschedule();

        value
    }

    /// Handle a write of `value` to `cpu`'s `IPCFIFOCNT`.
    ///
    /// Interrupts are evaluated against the register state after the write,
    /// so unmasking an IRQ whose condition already holds raises it at once.
    pub fn configure<H: IpcHost + ?Sized>(&mut self, cpu: Processor, value: u16, host: &mut H) {
        let remote = cpu.remote();
        let mut cnt_l = read_cnt(host, cpu);
        let mut cnt_r = read_cnt(host, remote);
        let value = IpcFifoCnt::from_register(value);

        if value.contains(IpcFifoCnt::ERROR) {
            cnt_l.remove(IpcFifoCnt::ERROR);
        }

        if value.contains(IpcFifoCnt::SEND_CLEAR) {
            log::trace!("IPC {cpu} send FIFO clear");
            self.queues[cpu.index()].flush();

            cnt_l.insert(IpcFifoCnt::SEND_EMPTY);
            cnt_r.insert(IpcFifoCnt::RECV_EMPTY);

            cnt_l.remove(IpcFifoCnt::SEND_FULL);
            cnt_r.remove(IpcFifoCnt::RECV_FULL);
        }

        cnt_l.remove(IpcFifoCnt::WRITEABLE);
        cnt_l.insert(value & IpcFifoCnt::WRITEABLE);

        if cnt_l.contains(IpcFifoCnt::SEND_IRQ_ENABLE | IpcFifoCnt::SEND_EMPTY) {
            host.raise_interrupt(cpu, IpcIrq::SendEmpty);
        }

        if cnt_l.contains(IpcFifoCnt::RECV_IRQ_ENABLE) && !cnt_l.contains(IpcFifoCnt::RECV_EMPTY)
        {
            host.raise_interrupt(cpu, IpcIrq::RecvNotEmpty);
        }

        write_cnt(host, cpu, cnt_l);
        write_cnt(host, remote, cnt_r);

        host.reschedule();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{InterruptController, Scheduler};

    #[derive(Default)]
    struct Host {
        cnt: [u16; 2],
        irqs: Vec<(Processor, IpcIrq)>,
        reschedules: usize,
    }

    impl RegisterBus for Host {
        fn read_io16(&self, cpu: Processor, offset: u32) -> u16 {
            assert_eq!(offset, IPCFIFOCNT);
            self.cnt[cpu.index()]
        }

        fn write_io16(&mut self, cpu: Processor, offset: u32, value: u16) {
            assert_eq!(offset, IPCFIFOCNT);
            self.cnt[cpu.index()] = value;
        }
    }

    impl InterruptController for Host {
        fn raise_interrupt(&mut self, cpu: Processor, irq: IpcIrq) {
            self.irqs.push((cpu, irq));
        }
    }

    impl Scheduler for Host {
        fn reschedule(&mut self) {
            self.reschedules += 1;
        }
    }

    fn setup() -> (IpcFifo, Host) {
        let mut fifo = IpcFifo::new();
        let mut host = Host::default();
        for cpu in Processor::ALL {
            fifo.init(cpu, &mut host);
        }
        (fifo, host)
    }

    #[test]
    fn test_queue_wraps_indices() {
        let mut queue = FifoQueue::default();
        for i in 0..10 {
            queue.push(i);
        }
        for i in 0..10 {
            assert_eq!(queue.pop(), i);
        }
        for i in 0..12 {
            queue.push(100 + i);
        }
        assert_eq!(queue.tail(), 6);
        assert_eq!(queue.head(), 10);
        assert_eq!(queue.iter().collect::<Vec<_>>(), (100..112).collect::<Vec<_>>());
    }

    #[test]
    fn test_send_updates_both_registers() {
        let (mut fifo, mut host) = setup();
        fifo.send(Processor::Arm9, 0xCAFE_BABE, &mut host);

        let cnt9 = IpcFifoCnt::from_register(host.cnt[0]);
        let cnt7 = IpcFifoCnt::from_register(host.cnt[1]);
        assert!(!cnt9.contains(IpcFifoCnt::SEND_EMPTY));
        assert!(!cnt7.contains(IpcFifoCnt::RECV_EMPTY));
        assert!(cnt9.contains(IpcFifoCnt::RECV_EMPTY));
        assert!(cnt7.contains(IpcFifoCnt::SEND_EMPTY));
        assert_eq!(host.reschedules, 1);
        assert!(host.irqs.is_empty());
    }

    #[test]
    fn test_disabled_fifo_ignores_traffic() {
        let (mut fifo, mut host) = setup();
        host.cnt[0] &= !IpcFifoCnt::FIFO_ENABLE.bits();
        let before = host.cnt;

        fifo.send(Processor::Arm9, 1, &mut host);
        assert_eq!(fifo.receive(Processor::Arm9, &mut host), 0);

        assert_eq!(host.cnt, before);
        assert!(fifo.queue(Processor::Arm9).is_empty());
        assert_eq!(host.reschedules, 0);
    }

    #[test]
    fn test_successful_send_clears_error() {
        let (mut fifo, mut host) = setup();
        assert_eq!(fifo.receive(Processor::Arm7, &mut host), 0);
        assert!(IpcFifoCnt::from_register(host.cnt[1]).has_error());

        fifo.send(Processor::Arm7, 5, &mut host);
        assert!(!IpcFifoCnt::from_register(host.cnt[1]).has_error());
    }
}
