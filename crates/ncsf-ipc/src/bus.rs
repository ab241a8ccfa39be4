//! Collaborator interfaces used by the FIFO.
//!
//! The FIFO never owns the hardware around it. Register storage, the
//! interrupt controller and the scheduler belong to the emulation session and
//! are reached through these traits.

use crate::registers::{IpcIrq, Processor};

/// Per-processor I/O register space.
///
/// Offsets are relative to the start of the processor's I/O bank
/// (`0x04000000` in the emulated address space). Halfwords are little-endian.
pub trait RegisterBus {
    /// Read a 16-bit register.
    fn read_io16(&self, cpu: Processor, offset: u32) -> u16;

    /// Write a 16-bit register.
    fn write_io16(&mut self, cpu: Processor, offset: u32, value: u16);
}

/// Interrupt request sink.
pub trait InterruptController {
    /// Latch `irq` as pending for `cpu`.
    fn raise_interrupt(&mut self, cpu: Processor, irq: IpcIrq);
}

/// Hook asking the emulation driver to re-evaluate its next event time.
pub trait Scheduler {
    /// Request a reschedule. Carries no data and never blocks.
    fn reschedule(&mut self);
}

/// Everything a FIFO operation touches.
///
/// Implemented automatically for any type that provides the three
/// collaborator traits.
pub trait IpcHost: RegisterBus + InterruptController + Scheduler {}

impl<T: RegisterBus + InterruptController + Scheduler + ?Sized> IpcHost for T {}
