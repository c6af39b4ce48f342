//! # Memory Abstraction
//!
//! The [`Memory16`] trait is the bus the CPU talks to: single-byte loads
//! and stores that each cost one clock cycle, plus bulk setup operations
//! (image loading, range inspection) that do not tick the clock because
//! they model tooling, not execution.
//!
//! [`Ram`] is the flat 64 KiB implementation. Composed address spaces with
//! mapped devices live in [`crate::devices`].

use log::trace;
use thiserror::Error;

use crate::clock::Clock;
use crate::program::{SparseBinaryCode, FILL_BYTE};

/// Access to an address no device services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bus error at {address:#06x}")]
pub struct BusError {
    pub address: u16,
}

/// 16-bit addressed byte bus.
///
/// `load` and `store` are execution-path accesses: each one advances the
/// shared clock by exactly one cycle. `write_bulk`, `read_range` and
/// `write_sparse` are setup paths and never tick.
pub trait Memory16 {
    /// Read one byte. Costs one clock cycle.
    fn load(&mut self, address: u16) -> Result<u8, BusError>;

    /// Write one byte. Costs one clock cycle.
    fn store(&mut self, address: u16, value: u8) -> Result<(), BusError>;

    /// Copy a byte run into memory without ticking the clock. Addresses
    /// wrap at 0xFFFF.
    fn write_bulk(&mut self, address: u16, bytes: &[u8]) -> Result<(), BusError>;

    /// Read a byte run without ticking the clock. Addresses wrap at 0xFFFF.
    fn read_range(&mut self, address: u16, len: usize) -> Result<Vec<u8>, BusError>;

    /// Load an assembled sparse image without ticking the clock.
    fn write_sparse(&mut self, code: &SparseBinaryCode) -> Result<(), BusError> {
        for (address, byte) in code.iter() {
            self.write_bulk(address, std::slice::from_ref(&byte))?;
        }
        Ok(())
    }
}

/// Flat 64 KiB RAM covering the whole address space.
///
/// Fresh memory is filled with [`FILL_BYTE`] rather than zero, so code that
/// wanders into uninitialized memory fails loudly instead of executing BRK
/// slides.
///
/// # Examples
///
/// ```
/// use emu6502::{Clock, Memory16, Ram};
///
/// let clock = Clock::new();
/// let mut ram = Ram::new(&clock);
///
/// ram.store(0x1234, 0x42).unwrap();
/// assert_eq!(ram.load(0x1234).unwrap(), 0x42);
/// assert_eq!(clock.current_cycle(), 2);
/// ```
pub struct Ram<'c> {
    clock: &'c Clock,
    mem: Box<[u8; 0x10000]>,
}

impl<'c> Ram<'c> {
    pub fn new(clock: &'c Clock) -> Self {
        Self {
            clock,
            mem: Box::new([FILL_BYTE; 0x10000]),
        }
    }
}

impl Memory16 for Ram<'_> {
    fn load(&mut self, address: u16) -> Result<u8, BusError> {
        self.clock.wait_for_next_cycle();
        let value = self.mem[address as usize];
        trace!("MEM  READ [{address:04x}] -> {value:02x}");
        Ok(value)
    }

    fn store(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        self.clock.wait_for_next_cycle();
        trace!("MEM WRITE [{address:04x}] <- {value:02x}");
        self.mem[address as usize] = value;
        Ok(())
    }

    fn write_bulk(&mut self, address: u16, bytes: &[u8]) -> Result<(), BusError> {
        for (index, byte) in bytes.iter().enumerate() {
            self.mem[address.wrapping_add(index as u16) as usize] = *byte;
        }
        Ok(())
    }

    fn read_range(&mut self, address: u16, len: usize) -> Result<Vec<u8>, BusError> {
        Ok((0..len)
            .map(|index| self.mem[address.wrapping_add(index as u16) as usize])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_starts_with_fill_pattern() {
        let clock = Clock::new();
        let mut ram = Ram::new(&clock);
        assert_eq!(ram.load(0x0000).unwrap(), FILL_BYTE);
        assert_eq!(ram.load(0xFFFF).unwrap(), FILL_BYTE);
    }

    #[test]
    fn test_load_store_tick_the_clock() {
        let clock = Clock::new();
        let mut ram = Ram::new(&clock);

        ram.store(0x0100, 0x11).unwrap();
        ram.store(0x0101, 0x22).unwrap();
        assert_eq!(ram.load(0x0100).unwrap(), 0x11);
        assert_eq!(clock.current_cycle(), 3);
    }

    #[test]
    fn test_bulk_operations_do_not_tick() {
        let clock = Clock::new();
        let mut ram = Ram::new(&clock);

        ram.write_bulk(0x2000, &[1, 2, 3]).unwrap();
        assert_eq!(ram.read_range(0x2000, 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(clock.current_cycle(), 0);
    }

    #[test]
    fn test_write_sparse_loads_image() {
        let clock = Clock::new();
        let mut ram = Ram::new(&clock);

        let code = SparseBinaryCode::with_bytes(0x8000, &[0xA9, 0x42]);
        ram.write_sparse(&code).unwrap();

        assert_eq!(ram.read_range(0x8000, 2).unwrap(), vec![0xA9, 0x42]);
        assert_eq!(clock.current_cycle(), 0);
    }

    #[test]
    fn test_bulk_write_wraps_address_space() {
        let clock = Clock::new();
        let mut ram = Ram::new(&clock);

        ram.write_bulk(0xFFFF, &[0xAA, 0xBB]).unwrap();
        assert_eq!(ram.load(0xFFFF).unwrap(), 0xAA);
        assert_eq!(ram.load(0x0000).unwrap(), 0xBB);
    }
}
