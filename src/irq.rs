//! Interrupt lines (IME / IE / IF) of both processors.

use ncsf_ipc::{IpcIrq, Processor};

/// Interrupt master enable, I/O offset.
pub const REG_IME: u32 = 0x208;
/// Interrupt enable mask, I/O offset.
pub const REG_IE: u32 = 0x210;
/// Interrupt request flags, I/O offset. Writing 1 to a bit acknowledges it.
pub const REG_IF: u32 = 0x214;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Lines {
    ime: u32,
    ie: u32,
    flags: u32,
}

/// Latched interrupt requests and their masks, per processor.
#[derive(Debug, Clone, Default)]
pub struct InterruptLines {
    cpus: [Lines; 2],
}

impl InterruptLines {
    /// All lines clear, all masks off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every register.
    pub fn reset(&mut self) {
        self.cpus = Default::default();
    }

    /// Latch `irq` into `cpu`'s IF register.
    pub fn raise(&mut self, cpu: Processor, irq: IpcIrq) {
        self.cpus[cpu.index()].flags |= irq.mask();
    }

    /// Requests that would be delivered now: `IF & IE`, gated by IME bit 0.
    pub fn pending(&self, cpu: Processor) -> u32 {
        let lines = &self.cpus[cpu.index()];
        if lines.ime & 1 == 0 {
            return 0;
        }
        lines.flags & lines.ie
    }

    /// Whether `irq` is latched, regardless of masks.
    pub fn is_requested(&self, cpu: Processor, irq: IpcIrq) -> bool {
        self.cpus[cpu.index()].flags & irq.mask() != 0
    }

    /// Clear the IF bits set in `mask`.
    pub fn acknowledge(&mut self, cpu: Processor, mask: u32) {
        self.cpus[cpu.index()].flags &= !mask;
    }

    /// IME register.
    pub fn ime(&self, cpu: Processor) -> u32 {
        self.cpus[cpu.index()].ime
    }

    /// Set IME. Only bit 0 is stored.
    pub fn set_ime(&mut self, cpu: Processor, value: u32) {
        self.cpus[cpu.index()].ime = value & 1;
    }

    /// IE register.
    pub fn ie(&self, cpu: Processor) -> u32 {
        self.cpus[cpu.index()].ie
    }

    /// Set IE.
    pub fn set_ie(&mut self, cpu: Processor, value: u32) {
        self.cpus[cpu.index()].ie = value;
    }

    /// IF register.
    pub fn flags(&self, cpu: Processor) -> u32 {
        self.cpus[cpu.index()].flags
    }

    /// Read one of `REG_IME`, `REG_IE` or `REG_IF` (word aligned).
    pub(crate) fn read_register(&self, cpu: Processor, reg: u32) -> u32 {
        match reg {
            REG_IME => self.ime(cpu),
            REG_IE => self.ie(cpu),
            REG_IF => self.flags(cpu),
            _ => 0,
        }
    }

    /// Write one of `REG_IME`, `REG_IE` or `REG_IF` (word aligned).
    pub(crate) fn write_register(&mut self, cpu: Processor, reg: u32, value: u32) {
        match reg {
            REG_IME => self.set_ime(cpu, value),
            REG_IE => self.set_ie(cpu, value),
            REG_IF => self.acknowledge(cpu, value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_and_pending() {
        let mut irq = InterruptLines::new();
        irq.raise(Processor::Arm7, IpcIrq::RecvNotEmpty);
        assert!(irq.is_requested(Processor::Arm7, IpcIrq::RecvNotEmpty));
        assert!(!irq.is_requested(Processor::Arm9, IpcIrq::RecvNotEmpty));
        assert_eq!(irq.pending(Processor::Arm7), 0, "IME and IE off");

        irq.set_ime(Processor::Arm7, 1);
        assert_eq!(irq.pending(Processor::Arm7), 0, "IE off");
        irq.set_ie(Processor::Arm7, IpcIrq::RecvNotEmpty.mask());
        assert_eq!(irq.pending(Processor::Arm7), 1 << 18);
    }

    #[test]
    fn test_acknowledge_clears_written_bits() {
        let mut irq = InterruptLines::new();
        irq.raise(Processor::Arm9, IpcIrq::SendEmpty);
        irq.raise(Processor::Arm9, IpcIrq::RecvNotEmpty);
        irq.write_register(Processor::Arm9, REG_IF, IpcIrq::SendEmpty.mask());
        assert_eq!(irq.flags(Processor::Arm9), IpcIrq::RecvNotEmpty.mask());
    }

    #[test]
    fn test_ime_keeps_bit_zero() {
        let mut irq = InterruptLines::new();
        irq.write_register(Processor::Arm9, REG_IME, 0xFFFF_FFFE);
        assert_eq!(irq.read_register(Processor::Arm9, REG_IME), 0);
        irq.write_register(Processor::Arm9, REG_IME, 3);
        assert_eq!(irq.read_register(Processor::Arm9, REG_IME), 1);
    }
}
