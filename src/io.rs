//! Per-processor I/O register banks
//!
//! Plain little-endian storage for the `0x04000000` region of each CPU.
//! Accesses outside the bank read as zero and are otherwise ignored.

use ncsf_ipc::{Processor, RegisterBus};

/// Start of the I/O region in the emulated address space.
pub const IO_BASE: u32 = 0x0400_0000;

/// Bytes of register storage per processor.
pub const IO_BANK_SIZE: usize = 0x400;

/// Two banks of memory-mapped I/O registers, one per processor.
#[derive(Debug, Clone)]
pub struct IoRegisters {
    banks: [Box<[u8]>; 2],
}

impl IoRegisters {
    /// Zero-filled banks.
    pub fn new() -> Self {
        Self {
            banks: [
                vec![0; IO_BANK_SIZE].into_boxed_slice(),
                vec![0; IO_BANK_SIZE].into_boxed_slice(),
            ],
        }
    }

    /// Zero both banks.
    pub fn reset(&mut self) {
        for bank in &mut self.banks {
            bank.fill(0);
        }
    }

    fn slice<const N: usize>(&self, cpu: Processor, offset: u32) -> Option<[u8; N]> {
        let at = offset as usize;
        let bytes = self.banks[cpu.index()].get(at..at.checked_add(N)?)?;
        bytes.try_into().ok()
    }

    fn store(&mut self, cpu: Processor, offset: u32, bytes: &[u8]) {
        let at = offset as usize;
        let Some(end) = at.checked_add(bytes.len()) else {
            return;
        };
        match self.banks[cpu.index()].get_mut(at..end) {
            Some(dst) => dst.copy_from_slice(bytes),
            None => log::trace!("{cpu}: I/O write past bank at {offset:#05x} dropped"),
        }
    }

    /// Read a byte at `offset` within the bank.
    pub fn read8(&self, cpu: Processor, offset: u32) -> u8 {
        self.slice::<1>(cpu, offset).map_or(0, |b| b[0])
    }

    /// Read a little-endian halfword.
    pub fn read16(&self, cpu: Processor, offset: u32) -> u16 {
        self.slice(cpu, offset).map_or(0, u16::from_le_bytes)
    }

    /// Read a little-endian word.
    pub fn read32(&self, cpu: Processor, offset: u32) -> u32 {
        self.slice(cpu, offset).map_or(0, u32::from_le_bytes)
    }

    /// Write a byte.
    pub fn write8(&mut self, cpu: Processor, offset: u32, value: u8) {
        self.store(cpu, offset, &[value]);
    }

    /// Write a little-endian halfword.
    pub fn write16(&mut self, cpu: Processor, offset: u32, value: u16) {
        self.store(cpu, offset, &value.to_le_bytes());
    }

    /// Write a little-endian word.
    pub fn write32(&mut self, cpu: Processor, offset: u32, value: u32) {
        self.store(cpu, offset, &value.to_le_bytes());
    }
}

impl Default for IoRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for IoRegisters {
    fn read_io16(&self, cpu: Processor, offset: u32) -> u16 {
        self.read16(cpu, offset)
    }

    fn write_io16(&mut self, cpu: Processor, offset: u32, value: u16) {
        self.write16(cpu, offset, value);
    }
}
