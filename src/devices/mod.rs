//! Memory-mapped device support.
//!
//! A [`MemoryMapper16`] composes non-overlapping address ranges, each backed
//! by a [`Device`] (RAM block, ROM block, peripheral). The mapper implements
//! [`Memory16`], so a CPU runs against it exactly as it runs against flat
//! RAM — except that access to an unmapped address is a bus error instead of
//! open-bus garbage.

use log::trace;
use thiserror::Error;

use crate::clock::Clock;
use crate::memory::{BusError, Memory16};

pub mod ram;
pub mod rom;

pub use ram::RamDevice;
pub use rom::RomDevice;

/// A memory-mapped hardware component.
///
/// Devices are addressed by offset (0 to `size() - 1`), never by absolute
/// address, so the same device can be mounted anywhere. Reads take `&mut
/// self` because real peripherals may change state when read (FIFO pops,
/// status latches).
pub trait Device {
    /// Read the byte at `offset` within the device.
    fn read(&mut self, offset: u16) -> u8;

    /// Write a byte at `offset` within the device.
    fn write(&mut self, offset: u16, value: u8);

    /// Number of bytes this device services. Must be stable after mounting.
    fn size(&self) -> u16;
}

/// Inclusive address range helper; inclusive so a device ending at 0xFFFF
/// needs no overflow special-casing.
#[derive(Debug, Clone, Copy)]
struct AddressRange {
    start: u16,
    end: u16,
}

impl AddressRange {
    fn new(base: u16, size: u16) -> Self {
        let (end_plus_one, overflowed) = base.overflowing_add(size);
        let end = if overflowed { 0xFFFF } else { end_plus_one.wrapping_sub(1) };
        Self { start: base, end }
    }

    fn contains(&self, address: u16) -> bool {
        self.start <= address && address <= self.end
    }

    fn overlaps(&self, other: &AddressRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

/// Error returned when a device cannot be mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("device at {base:#06x} overlaps an existing mapping")]
    Overlap { base: u16 },

    #[error("device at {base:#06x} has zero size")]
    ZeroSize { base: u16 },
}

struct DeviceMapping {
    range: AddressRange,
    device: Box<dyn Device>,
}

/// Routes loads and stores to mounted devices by address range.
///
/// # Examples
///
/// ```
/// use emu6502::{Clock, Memory16, MemoryMapper16, RamDevice, RomDevice};
///
/// let clock = Clock::new();
/// let mut mapper = MemoryMapper16::new(&clock);
///
/// // 4 KiB RAM at 0x0000, 4 KiB ROM at 0xF000
/// mapper.mount(0x0000, Box::new(RamDevice::new(0x1000))).unwrap();
/// mapper.mount(0xF000, Box::new(RomDevice::new(vec![0xEA; 0x1000]))).unwrap();
///
/// mapper.store(0x0200, 0x42).unwrap();
/// assert_eq!(mapper.load(0x0200).unwrap(), 0x42);
/// assert_eq!(mapper.load(0xF000).unwrap(), 0xEA);
///
/// // Nothing mounted between the two ranges
/// assert!(mapper.load(0x8000).is_err());
/// ```
pub struct MemoryMapper16<'c> {
    clock: &'c Clock,
    mappings: Vec<DeviceMapping>,
}

impl<'c> MemoryMapper16<'c> {
    pub fn new(clock: &'c Clock) -> Self {
        Self {
            clock,
            mappings: Vec::new(),
        }
    }

    /// Mount a device at `base`. The device must not overlap any existing
    /// mapping and must service at least one byte.
    pub fn mount(&mut self, base: u16, device: Box<dyn Device>) -> Result<(), MountError> {
        if device.size() == 0 {
            return Err(MountError::ZeroSize { base });
        }
        let range = AddressRange::new(base, device.size());
        if self.mappings.iter().any(|m| m.range.overlaps(&range)) {
            return Err(MountError::Overlap { base });
        }
        self.mappings.push(DeviceMapping { range, device });
        Ok(())
    }

    fn mapping_for(&mut self, address: u16) -> Result<(&mut DeviceMapping, u16), BusError> {
        let mapping = self
            .mappings
            .iter_mut()
            .find(|m| m.range.contains(address))
            .ok_or(BusError { address })?;
        let offset = address - mapping.range.start;
        Ok((mapping, offset))
    }
}

impl Memory16 for MemoryMapper16<'_> {
    fn load(&mut self, address: u16) -> Result<u8, BusError> {
        self.clock.wait_for_next_cycle();
        let (mapping, offset) = self.mapping_for(address)?;
        let value = mapping.device.read(offset);
        trace!("BUS  READ [{address:04x}] -> {value:02x}");
        Ok(value)
    }

    fn store(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        self.clock.wait_for_next_cycle();
        let (mapping, offset) = self.mapping_for(address)?;
        trace!("BUS WRITE [{address:04x}] <- {value:02x}");
        mapping.device.write(offset, value);
        Ok(())
    }

    fn write_bulk(&mut self, address: u16, bytes: &[u8]) -> Result<(), BusError> {
        for (index, byte) in bytes.iter().enumerate() {
            let addr = address.wrapping_add(index as u16);
            let (mapping, offset) = self.mapping_for(addr)?;
            mapping.device.write(offset, *byte);
        }
        Ok(())
    }

    fn read_range(&mut self, address: u16, len: usize) -> Result<Vec<u8>, BusError> {
        let mut out = Vec::with_capacity(len);
        for index in 0..len {
            let addr = address.wrapping_add(index as u16);
            let (mapping, offset) = self.mapping_for(addr)?;
            out.push(mapping.device.read(offset));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_rejects_overlap() {
        let clock = Clock::new();
        let mut mapper = MemoryMapper16::new(&clock);

        mapper.mount(0x1000, Box::new(RamDevice::new(0x1000))).unwrap();
        let err = mapper.mount(0x1FFF, Box::new(RamDevice::new(16))).unwrap_err();
        assert_eq!(err, MountError::Overlap { base: 0x1FFF });

        // Adjacent is fine
        mapper.mount(0x2000, Box::new(RamDevice::new(16))).unwrap();
    }

    #[test]
    fn test_unmapped_access_is_bus_error() {
        let clock = Clock::new();
        let mut mapper = MemoryMapper16::new(&clock);
        mapper.mount(0x0000, Box::new(RamDevice::new(0x100))).unwrap();

        assert_eq!(mapper.load(0x0200), Err(BusError { address: 0x0200 }));
        assert_eq!(mapper.store(0x0200, 0), Err(BusError { address: 0x0200 }));
    }

    #[test]
    fn test_device_sees_offsets_not_addresses() {
        let clock = Clock::new();
        let mut mapper = MemoryMapper16::new(&clock);
        mapper.mount(0xE000, Box::new(RamDevice::new(0x100))).unwrap();

        mapper.store(0xE042, 0x99).unwrap();
        assert_eq!(mapper.load(0xE042).unwrap(), 0x99);
    }

    #[test]
    fn test_device_at_top_of_address_space() {
        let clock = Clock::new();
        let mut mapper = MemoryMapper16::new(&clock);
        mapper.mount(0xFF00, Box::new(RamDevice::new(0x100))).unwrap();

        mapper.store(0xFFFF, 0x5A).unwrap();
        assert_eq!(mapper.load(0xFFFF).unwrap(), 0x5A);
    }

    #[test]
    fn test_mapper_ticks_per_single_access() {
        let clock = Clock::new();
        let mut mapper = MemoryMapper16::new(&clock);
        mapper.mount(0x0000, Box::new(RamDevice::new(0x100))).unwrap();

        mapper.store(0x0010, 1).unwrap();
        mapper.load(0x0010).unwrap();
        mapper.write_bulk(0x0000, &[1, 2, 3, 4]).unwrap();
        assert_eq!(clock.current_cycle(), 2);
    }
}
