mod mbc3;

use crate::memory::address;
use pgb_proc_macros::EnumDisplay;
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;

pub(crate) use mbc3::{Mbc3Select, RtcRegisters};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay)]
pub enum MapperType {
    None,
    MBC1,
    MBC3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamMapResult {
    // Relative address into the full RAM array
    RamAddress(u32),
    // The RAM address is currently mapped to a cartridge-internal register
    MapperRegister,
    // RAM access is disabled
    None,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Mapper {
    None,
    MBC1 {
        rom_bank_count: u16,
        ram_bank_count: u8,
        ram_enabled: bool,
        rom_bank: u8,
        extra_rom_bits: u8,
        ram_bank: u8,
    },
    MBC3 {
        rom_bank_count: u16,
        ram_bank_count: u8,
        ram_enabled: bool,
        rom_bank: u8,
        select: Mbc3Select,
        rtc: Option<RtcRegisters>,
    },
}

impl Mapper {
    pub(crate) fn new(
        mapper_type: MapperType,
        mapper_features: MapperFeatures,
        rom_bank_count: u16,
        ram_bank_count: u8,
    ) -> Self {
        log::debug!(
            "creating {mapper_type} mapper with {rom_bank_count} ROM banks and {ram_bank_count} RAM banks"
        );

        match mapper_type {
            MapperType::None => Self::None,
            MapperType::MBC1 => Self::MBC1 {
                rom_bank_count,
                ram_bank_count,
                ram_enabled: false,
                rom_bank: 0x01,
                extra_rom_bits: 0x00,
                ram_bank: 0x00,
            },
            MapperType::MBC3 => Self::MBC3 {
                rom_bank_count,
                ram_bank_count,
                ram_enabled: false,
                rom_bank: 0x01,
                select: Mbc3Select::Ram(0x00),
                rtc: mapper_features.has_rtc.then(RtcRegisters::new),
            },
        }
    }

    /// Return the mapper to its power-on bank selection. RTC register contents are kept.
    pub(crate) fn reset(&mut self) {
        match self {
            Self::None => {}
            Self::MBC1 {
                ram_enabled,
                rom_bank,
                extra_rom_bits,
                ram_bank,
                ..
            } => {
                *ram_enabled = false;
                *rom_bank = 0x01;
                *extra_rom_bits = 0x00;
                *ram_bank = 0x00;
            }
            Self::MBC3 {
                ram_enabled,
                rom_bank,
                select,
                ..
            } => {
                *ram_enabled = false;
                *rom_bank = 0x01;
                *select = Mbc3Select::Ram(0x00);
            }
        }
    }

    /// Map an address in $0000-$7FFF to an offset into the ROM image.
    pub(crate) fn map_rom_address(&self, address: u16) -> u32 {
        if address <= address::ROM_BANK_0_END {
            return u32::from(address);
        }

        match self {
            Self::None => u32::from(address),
            &Self::MBC1 {
                rom_bank_count,
                rom_bank,
                ..
            }
            | &Self::MBC3 {
                rom_bank_count,
                rom_bank,
                ..
            } => {
                // Switchable reads never resolve to physical bank 0
                let bank_number = (u16::from(rom_bank) % rom_bank_count.max(1)).max(1);
                (u32::from(bank_number) << 14) | u32::from(address & 0x3FFF)
            }
        }
    }

    // ROM writes don't actually modify the ROM (it is read-only after all) but they do modify
    // cartridge registers
    pub(crate) fn write_rom_address(&mut self, address: u16, value: u8) {
        match self {
            Self::None => {}
            Self::MBC1 {
                rom_bank_count,
                ram_bank_count,
                ram_enabled,
                rom_bank,
                extra_rom_bits,
                ram_bank,
            } => match address {
                0x0000..=0x1FFF => {
                    *ram_enabled = value & 0x0F == 0x0A;
                    log::trace!("MBC1 ram_enabled changed to {ram_enabled}");
                }
                0x2000..=0x3FFF => {
                    let mut bank = value & 0x1F;
                    if *ram_bank_count < 4 {
                        bank |= *extra_rom_bits << 5;
                    }
                    if matches!(bank, 0x00 | 0x20 | 0x40 | 0x60) {
                        bank += 1;
                    }

                    log::trace!("MBC1 rom_bank changed to {bank:02X}");
                    *rom_bank = bank;
                }
                0x4000..=0x5FFF => {
                    let bits = value & 0x03;
                    if *ram_bank_count >= 4 {
                        log::trace!("MBC1 ram_bank changed to {bits}");
                        *ram_bank = bits;
                    } else if *rom_bank_count >= 64 {
                        log::trace!("MBC1 extra_rom_bits changed to {bits}");
                        *extra_rom_bits = bits;
                    }
                }
                _ => {}
            },
            Self::MBC3 {
                ram_enabled,
                rom_bank,
                select,
                ..
            } => match address {
                0x0000..=0x1FFF => {
                    *ram_enabled = value == 0x0A;
                    log::trace!("MBC3 ram_enabled changed to {ram_enabled}");
                }
                0x2000..=0x3FFF => {
                    *rom_bank = match value & 0x7F {
                        0x00 => 0x01,
                        bank => bank,
                    };
                    log::trace!("MBC3 rom_bank changed to {rom_bank:02X}");
                }
                0x4000..=0x5FFF => {
                    if let Some(new_select) = Mbc3Select::from_byte(value) {
                        log::trace!("MBC3 select changed to {new_select:?}");
                        *select = new_select;
                    }
                }
                // Clock latch; the clock registers never advance so there is nothing to latch
                _ => {}
            },
        }
    }

    /// Map an address in $A000-$BFFF to an offset into cartridge RAM.
    pub(crate) fn map_ram_address(&self, address: u16) -> RamMapResult {
        let relative_address = u32::from(address - address::EXTERNAL_RAM_START);

        match self {
            Self::None => RamMapResult::RamAddress(relative_address),
            &Self::MBC1 {
                ram_bank_count,
                ram_enabled,
                ram_bank,
                ..
            } => {
                if ram_enabled {
                    RamMapResult::RamAddress(banked_ram_offset(
                        ram_bank_count,
                        ram_bank,
                        relative_address,
                    ))
                } else {
                    RamMapResult::None
                }
            }
            &Self::MBC3 {
                ram_bank_count,
                ram_enabled,
                select,
                ..
            } => {
                if !ram_enabled {
                    return RamMapResult::None;
                }

                match select {
                    Mbc3Select::Ram(ram_bank) => RamMapResult::RamAddress(banked_ram_offset(
                        ram_bank_count,
                        ram_bank,
                        relative_address,
                    )),
                    Mbc3Select::Rtc(_) => RamMapResult::MapperRegister,
                }
            }
        }
    }

    pub(crate) fn read_ram_addressed_register(&self) -> Option<u8> {
        match self {
            Self::MBC3 {
                select: Mbc3Select::Rtc(index),
                rtc: Some(rtc),
                ..
            } => Some(rtc.read(*index)),
            _ => None,
        }
    }

    pub(crate) fn write_ram_addressed_register(&mut self, value: u8) {
        if let Self::MBC3 {
            select: Mbc3Select::Rtc(index),
            rtc: Some(rtc),
            ..
        } = self
        {
            rtc.write(*index, value);
        }
    }
}

// Cartridges with fewer than 4 RAM banks ignore the bank select
fn banked_ram_offset(ram_bank_count: u8, ram_bank: u8, relative_address: u32) -> u32 {
    if ram_bank_count >= 4 {
        (u32::from(ram_bank) << 13) | relative_address
    } else {
        relative_address
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperFeatures {
    pub has_ram: bool,
    pub has_battery: bool,
    pub has_rtc: bool,
}

impl std::fmt::Display for MapperFeatures {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "has_ram={}, has_battery={}, has_rtc={}",
            self.has_ram, self.has_battery, self.has_rtc
        )
    }
}

pub(crate) fn parse_byte(mapper_byte: u8) -> Option<(MapperType, MapperFeatures)> {
    let (mapper_type, has_ram, has_battery, has_rtc) = match mapper_byte {
        0x00 => (MapperType::None, false, false, false),
        0x08 => (MapperType::None, true, false, false),
        0x09 => (MapperType::None, true, true, false),
        0x01 => (MapperType::MBC1, false, false, false),
        0x02 => (MapperType::MBC1, true, false, false),
        0x03 => (MapperType::MBC1, true, true, false),
        0x0F => (MapperType::MBC3, false, true, true),
        0x10 => (MapperType::MBC3, true, true, true),
        0x11 => (MapperType::MBC3, false, false, false),
        0x12 => (MapperType::MBC3, true, false, false),
        0x13 => (MapperType::MBC3, true, true, false),
        _ => return None,
    };

    Some((
        mapper_type,
        MapperFeatures {
            has_ram,
            has_battery,
            has_rtc,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_FEATURES: MapperFeatures = MapperFeatures {
        has_ram: false,
        has_battery: false,
        has_rtc: false,
    };

    fn switchable_bank(mapper: &Mapper) -> u32 {
        mapper.map_rom_address(0x4000) >> 14
    }

    #[test]
    fn mbc1_bank_zero_correction() {
        let mut mapper = Mapper::new(MapperType::MBC1, NO_FEATURES, 128, 0);

        for (value, expected_bank) in [(0x00, 1), (0x01, 1), (0x05, 5), (0x1F, 0x1F), (0x20, 1)] {
            mapper.write_rom_address(0x2000, value);
            assert_eq!(expected_bank, switchable_bank(&mapper), "value={value:02X}");
        }

        for (extra_bits, expected_bank) in [(1, 0x21), (2, 0x41), (3, 0x61)] {
            mapper.write_rom_address(0x4000, extra_bits);
            mapper.write_rom_address(0x2000, 0x00);
            assert_eq!(expected_bank, switchable_bank(&mapper));
        }
    }

    #[test]
    fn mbc1_extra_bits_fold_on_next_bank_write() {
        let mut mapper = Mapper::new(MapperType::MBC1, NO_FEATURES, 128, 0);

        mapper.write_rom_address(0x2000, 0x03);
        mapper.write_rom_address(0x4000, 0x01);
        assert_eq!(0x03, switchable_bank(&mapper));

        mapper.write_rom_address(0x2000, 0x03);
        assert_eq!(0x23, switchable_bank(&mapper));
    }

    #[test]
    fn mbc1_capacity_selects_register_meaning() {
        // 4 RAM banks: $4000 writes select the RAM bank, never extra ROM bits
        let mut mapper = Mapper::new(MapperType::MBC1, NO_FEATURES, 128, 4);
        mapper.write_rom_address(0x0000, 0x0A);
        mapper.write_rom_address(0x4000, 0x02);
        mapper.write_rom_address(0x2000, 0x00);
        assert_eq!(1, switchable_bank(&mapper));
        assert_eq!(
            RamMapResult::RamAddress(0x4123),
            mapper.map_ram_address(0xA123)
        );

        // Small ROM: extra bits are dropped entirely
        let mut mapper = Mapper::new(MapperType::MBC1, NO_FEATURES, 32, 0);
        mapper.write_rom_address(0x4000, 0x03);
        mapper.write_rom_address(0x2000, 0x02);
        assert_eq!(2, switchable_bank(&mapper));
    }

    #[test]
    fn mbc1_ram_enable() {
        let mut mapper = Mapper::new(MapperType::MBC1, NO_FEATURES, 4, 1);
        assert_eq!(RamMapResult::None, mapper.map_ram_address(0xA000));

        mapper.write_rom_address(0x1000, 0x3A);
        assert_eq!(
            RamMapResult::RamAddress(0x0010),
            mapper.map_ram_address(0xA010)
        );

        mapper.write_rom_address(0x1000, 0x0B);
        assert_eq!(RamMapResult::None, mapper.map_ram_address(0xA010));
    }

    #[test]
    fn rom_bank_wraps_to_bank_count() {
        let mut mapper = Mapper::new(MapperType::MBC3, NO_FEATURES, 4, 0);

        mapper.write_rom_address(0x2000, 0x06);
        assert_eq!((2 << 14) | 0x0123, mapper.map_rom_address(0x4123));

        // 4 % 4 == 0, which must still not resolve to bank 0
        mapper.write_rom_address(0x2000, 0x04);
        assert_eq!(1, switchable_bank(&mapper));

        assert_eq!(0x3FFF, mapper.map_rom_address(0x3FFF));
    }

    #[test]
    fn mbc3_registers() {
        let features = MapperFeatures {
            has_ram: true,
            has_battery: true,
            has_rtc: true,
        };
        let mut mapper = Mapper::new(MapperType::MBC3, features, 128, 4);

        mapper.write_rom_address(0x2000, 0x00);
        assert_eq!(1, switchable_bank(&mapper));
        mapper.write_rom_address(0x2000, 0xFF);
        assert_eq!(0x7F, switchable_bank(&mapper));

        // Only exactly 0x0A enables RAM
        mapper.write_rom_address(0x0000, 0x1A);
        assert_eq!(RamMapResult::None, mapper.map_ram_address(0xA000));
        mapper.write_rom_address(0x0000, 0x0A);

        mapper.write_rom_address(0x4000, 0x03);
        assert_eq!(
            RamMapResult::RamAddress(0x6001),
            mapper.map_ram_address(0xA001)
        );

        // Out of range selects are ignored
        mapper.write_rom_address(0x4000, 0x05);
        assert_eq!(
            RamMapResult::RamAddress(0x6001),
            mapper.map_ram_address(0xA001)
        );

        mapper.write_rom_address(0x4000, 0x08);
        assert_eq!(RamMapResult::MapperRegister, mapper.map_ram_address(0xA001));
        mapper.write_ram_addressed_register(0x3B);
        assert_eq!(Some(0x3B), mapper.read_ram_addressed_register());

        // Latching is a no-op
        mapper.write_rom_address(0x6000, 0x00);
        mapper.write_rom_address(0x6000, 0x01);
        assert_eq!(Some(0x3B), mapper.read_ram_addressed_register());
    }

    #[test]
    fn reset_restores_default_banks() {
        let mut mapper = Mapper::new(MapperType::MBC1, NO_FEATURES, 64, 0);
        mapper.write_rom_address(0x0000, 0x0A);
        mapper.write_rom_address(0x2000, 0x07);

        mapper.reset();
        assert_eq!(1, switchable_bank(&mapper));
        assert_eq!(RamMapResult::None, mapper.map_ram_address(0xA000));
    }

    #[test]
    fn parse_mapper_bytes() {
        assert_eq!(
            Some((
                MapperType::MBC3,
                MapperFeatures {
                    has_ram: true,
                    has_battery: true,
                    has_rtc: true
                }
            )),
            parse_byte(0x10)
        );
        assert_eq!(None, parse_byte(0x19));
        assert_eq!(None, parse_byte(0x05));
    }
}
