//! IPC FIFO register definitions
//!
//! The FIFO is controlled through the 16-bit `IPCFIFOCNT` register that each
//! processor sees at offset `0x184` of its own I/O bank. Status bits mirror the
//! state of the two queues; the control bits select interrupt sources and
//! enable the FIFO as a whole.
//!
//! | Bit | Name | Access |
//! |-----|------|--------|
//! | 0   | Send FIFO empty | R |
//! | 1   | Send FIFO full | R |
//! | 2   | Send FIFO empty IRQ enable | R/W |
//! | 3   | Send FIFO clear | W |
//! | 8   | Receive FIFO empty | R |
//! | 9   | Receive FIFO full | R |
//! | 10  | Receive FIFO not empty IRQ enable | R/W |
//! | 14  | Error (read empty / send full) | R, write 1 to acknowledge |
//! | 15  | FIFO enable | R/W |

use bitflags::bitflags;
use std::fmt;

/// Offset of `IPCFIFOCNT` inside a processor's I/O bank.
pub const IPCFIFOCNT: u32 = 0x184;

/// Offset of `IPCFIFOSEND` (32-bit, write only) inside a processor's I/O bank.
pub const IPCFIFOSEND: u32 = 0x188;

/// Absolute address of `IPCFIFORECV` (32-bit, read only).
pub const IPCFIFORECV_ADDR: u32 = 0x0410_0000;

/// Value written to `IPCFIFOCNT` by [`crate::IpcFifo::init`].
pub const IPCFIFOCNT_RESET: u16 = 0x8101;

bitflags! {
    /// `IPCFIFOCNT` bitflags
    ///
    /// Raw register values are carried with [`IpcFifoCnt::from_bits_retain`] so
    /// that bits without a name survive a read-modify-write cycle untouched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IpcFifoCnt: u16 {
        /// Send FIFO empty
        const SEND_EMPTY = 0x0001;
        /// Send FIFO full
        const SEND_FULL = 0x0002;
        /// Raise an interrupt when the send FIFO drains
        const SEND_IRQ_ENABLE = 0x0004;
        /// Write-only: flush the send FIFO
        const SEND_CLEAR = 0x0008;
        /// Receive FIFO empty
        const RECV_EMPTY = 0x0100;
        /// Receive FIFO full
        const RECV_FULL = 0x0200;
        /// Raise an interrupt when the receive FIFO holds data
        const RECV_IRQ_ENABLE = 0x0400;
        /// Sticky error flag
        const ERROR = 0x4000;
        /// FIFO enable
        const FIFO_ENABLE = 0x8000;

        /// Bits a `configure` write replaces verbatim (`0x8404`)
        const WRITEABLE = Self::SEND_IRQ_ENABLE.bits()
            | Self::RECV_IRQ_ENABLE.bits()
            | Self::FIFO_ENABLE.bits();
        /// Bits stripped from the sender's register before a push (`!0xBFFC`)
        const SEND_STATUS = Self::SEND_EMPTY.bits()
            | Self::SEND_FULL.bits()
            | Self::ERROR.bits();
        /// Bits stripped from the receiver's register before a push (`!0xBCFF`)
        const RECV_STATUS = Self::RECV_EMPTY.bits()
            | Self::RECV_FULL.bits()
            | Self::ERROR.bits();
    }
}

impl IpcFifoCnt {
    /// Wrap a raw register value, keeping unnamed bits.
    pub fn from_register(value: u16) -> Self {
        IpcFifoCnt::from_bits_retain(value)
    }

    /// Check whether the FIFO is enabled
    pub fn is_enabled(&self) -> bool {
        self.contains(IpcFifoCnt::FIFO_ENABLE)
    }

    /// Check whether the error flag is latched
    pub fn has_error(&self) -> bool {
        self.contains(IpcFifoCnt::ERROR)
    }
}

impl Default for IpcFifoCnt {
    fn default() -> Self {
        IpcFifoCnt::from_bits_retain(IPCFIFOCNT_RESET)
    }
}

/// One of the two emulated processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Processor {
    /// Main CPU (ARM946E-S)
    Arm9 = 0,
    /// Sound/IO CPU (ARM7TDMI)
    Arm7 = 1,
}

impl Processor {
    /// Both processors in index order.
    pub const ALL: [Processor; 2] = [Processor::Arm9, Processor::Arm7];

    /// Index used for per-processor arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The peer on the other end of the FIFO (`index ^ 1`).
    #[inline]
    pub fn remote(self) -> Self {
        match self {
            Processor::Arm9 => Processor::Arm7,
            Processor::Arm7 => Processor::Arm9,
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Processor::Arm9 => write!(f, "ARM9"),
            Processor::Arm7 => write!(f, "ARM7"),
        }
    }
}

/// Interrupt sources owned by the IPC FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpcIrq {
    /// Send FIFO became empty (IRQ bit 17)
    SendEmpty,
    /// Receive FIFO holds data (IRQ bit 18)
    RecvNotEmpty,
}

impl IpcIrq {
    /// Bit number in the interrupt enable/request registers.
    pub fn bit(self) -> u32 {
        match self {
            IpcIrq::SendEmpty => 17,
            IpcIrq::RecvNotEmpty => 18,
        }
    }

    /// Single-bit mask for the interrupt enable/request registers.
    pub fn mask(self) -> u32 {
        1 << self.bit()
    }
}
