//! # ncsf-ipc
//!
//! Inter-processor FIFO of the Nintendo DS, as used by sound drivers to pass
//! commands between the ARM9 and the ARM7.
//!
//! The crate models:
//!
//! - **Two 16-word queues**, one per direction
//! - **`IPCFIFOCNT`**: the per-processor control/status register, with its
//!   exact hardware bit layout
//! - **Interrupt side effects**: "send FIFO empty" and "receive FIFO not empty"
//!
//! Register storage, the interrupt controller and the scheduler are supplied by
//! the caller through the [`RegisterBus`], [`InterruptController`] and
//! [`Scheduler`] traits, so the FIFO carries no global state.
//!
//! ## Example
//!
//! ```rust
//! use ncsf_ipc::{
//!     InterruptController, IpcFifo, IpcFifoCnt, IpcIrq, Processor, RegisterBus, Scheduler,
//! };
//!
//! /// Only `IPCFIFOCNT` is backed; interrupts and reschedules are counted.
//! #[derive(Default)]
//! struct Host {
//!     cnt: [u16; 2],
//!     irqs: usize,
//!     reschedules: usize,
//! }
//!
//! impl RegisterBus for Host {
//!     fn read_io16(&self, cpu: Processor, _offset: u32) -> u16 {
//!         self.cnt[cpu.index()]
//!     }
//!     fn write_io16(&mut self, cpu: Processor, _offset: u32, value: u16) {
//!         self.cnt[cpu.index()] = value;
//!     }
//! }
//!
//! impl InterruptController for Host {
//!     fn raise_interrupt(&mut self, _cpu: Processor, _irq: IpcIrq) {
//!         self.irqs += 1;
//!     }
//! }
//!
//! impl Scheduler for Host {
//!     fn reschedule(&mut self) {
//!         self.reschedules += 1;
//!     }
//! }
//!
//! let mut host = Host::default();
//! let mut fifo = IpcFifo::new();
//! fifo.init(Processor::Arm9, &mut host);
//! fifo.init(Processor::Arm7, &mut host);
//!
//! fifo.send(Processor::Arm9, 0x0001_0000, &mut host);
//! let cnt = IpcFifoCnt::from_register(host.cnt[Processor::Arm7.index()]);
//! assert!(!cnt.contains(IpcFifoCnt::RECV_EMPTY));
//!
//! assert_eq!(fifo.receive(Processor::Arm7, &mut host), 0x0001_0000);
//! assert_eq!(host.reschedules, 2);
//! assert_eq!(host.irqs, 0);
//! ```

#![warn(missing_docs)]

mod bus;
mod fifo;
mod registers;

pub use bus::{InterruptController, IpcHost, RegisterBus, Scheduler};
pub use fifo::{FifoQueue, IpcFifo, FIFO_DEPTH};
pub use registers::{
    IpcFifoCnt, IpcIrq, Processor, IPCFIFOCNT, IPCFIFOCNT_RESET, IPCFIFORECV_ADDR, IPCFIFOSEND,
};
