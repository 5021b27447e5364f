use crate::memory::address;
use crate::memory::mapper::{self, Mapper, MapperFeatures, MapperType, RamMapResult};
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartridgeLoadError {
    #[error("ROM image is {len} bytes, too short to contain a cartridge header")]
    HeaderTooShort { len: usize },
    #[error("unsupported mapper byte: {byte:02X}")]
    UnsupportedMapper { byte: u8 },
    #[error("invalid ROM size code: {byte:02X}")]
    InvalidRomSize { byte: u8 },
    #[error("invalid RAM size code: {byte:02X}")]
    InvalidRamSize { byte: u8 },
    #[error("cartridge only supports the color console")]
    ColorOnly,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDataError {
    #[error("cartridge has no external RAM")]
    NoRam,
    #[error("cartridge RAM is not battery-backed")]
    NoBattery,
    #[error("save data is {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Values derived from the cartridge header at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartridgeMetadata {
    pub title: String,
    pub mapper_type: MapperType,
    pub features: MapperFeatures,
    pub rom_bank_count: u16,
    pub ram_bank_count: u8,
}

impl std::fmt::Display for CartridgeMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "title='{}', mapper={}, {}, rom_banks={}, ram_banks={}",
            self.title, self.mapper_type, self.features, self.rom_bank_count, self.ram_bank_count
        )
    }
}

fn rom_bank_count(byte: u8) -> Result<u16, CartridgeLoadError> {
    match byte {
        0x00..=0x08 => Ok(2 << byte),
        0x52 => Ok(72),
        0x53 => Ok(80),
        0x54 => Ok(96),
        _ => Err(CartridgeLoadError::InvalidRomSize { byte }),
    }
}

fn ram_bank_count(byte: u8) -> Result<u8, CartridgeLoadError> {
    match byte {
        0x00 => Ok(0),
        // 2KB, 8KB, 32KB, 128KB; a 2KB chip rounds down to zero whole banks
        0x01..=0x04 => Ok(((1_u32 << (byte * 2 - 1)) / 8) as u8),
        0x05 => Ok(8),
        _ => Err(CartridgeLoadError::InvalidRamSize { byte }),
    }
}

fn parse_title(rom: &[u8]) -> String {
    let title_bytes = &rom[address::TITLE_START as usize..=address::TITLE_END as usize];
    let end = title_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(title_bytes.len());
    String::from_utf8_lossy(&title_bytes[..end]).trim().to_string()
}

/// Validate a ROM image's header and derive its metadata.
pub fn parse_header(rom: &[u8]) -> Result<CartridgeMetadata, CartridgeLoadError> {
    if rom.len() <= address::HEADER_END as usize {
        return Err(CartridgeLoadError::HeaderTooShort { len: rom.len() });
    }

    if rom[address::CGB_SUPPORT as usize] == 0xC0 {
        return Err(CartridgeLoadError::ColorOnly);
    }

    let mapper_byte = rom[address::MAPPER as usize];
    let Some((mapper_type, features)) = mapper::parse_byte(mapper_byte) else {
        return Err(CartridgeLoadError::UnsupportedMapper { byte: mapper_byte });
    };

    let rom_bank_count = rom_bank_count(rom[address::ROM_SIZE as usize])?;
    let ram_bank_count = ram_bank_count(rom[address::RAM_SIZE as usize])?;

    Ok(CartridgeMetadata {
        title: parse_title(rom),
        mapper_type,
        features,
        rom_bank_count,
        ram_bank_count,
    })
}

/// A loaded cartridge: the ROM image, external RAM, and bank controller state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cartridge {
    #[serde(skip)]
    rom: Vec<u8>,
    ram: Vec<u8>,
    metadata: CartridgeMetadata,
    mapper: Mapper,
}

impl Cartridge {
    /// Validate the ROM image and build a cartridge from it. Nothing is constructed unless every
    /// header field is valid.
    pub fn new(rom: Vec<u8>) -> Result<Self, CartridgeLoadError> {
        let metadata = parse_header(&rom)?;

        let expected_len = usize::from(metadata.rom_bank_count) * address::ROM_BANK_LEN as usize;
        if rom.len() < expected_len {
            log::warn!(
                "ROM image is {} bytes but header declares {} banks ({expected_len} bytes); missing bytes read as 0xFF",
                rom.len(),
                metadata.rom_bank_count
            );
        }

        let ram_len = usize::from(metadata.ram_bank_count) * address::RAM_BANK_LEN as usize;
        let mapper = Mapper::new(
            metadata.mapper_type,
            metadata.features,
            metadata.rom_bank_count,
            metadata.ram_bank_count,
        );

        log::info!("Loaded cartridge: {metadata}");

        Ok(Self {
            rom,
            ram: vec![0; ram_len],
            metadata,
            mapper,
        })
    }

    pub fn metadata(&self) -> &CartridgeMetadata {
        &self.metadata
    }

    pub fn read_rom_address(&self, address: u16) -> u8 {
        let rom_address = self.mapper.map_rom_address(address);
        self.rom.get(rom_address as usize).copied().unwrap_or(0xFF)
    }

    pub fn write_rom_address(&mut self, address: u16, value: u8) {
        self.mapper.write_rom_address(address, value);
    }

    pub fn read_ram_address(&self, address: u16) -> u8 {
        match self.mapper.map_ram_address(address) {
            RamMapResult::RamAddress(ram_address) => {
                self.ram.get(ram_address as usize).copied().unwrap_or(0xFF)
            }
            RamMapResult::MapperRegister => {
                self.mapper.read_ram_addressed_register().unwrap_or(0xFF)
            }
            RamMapResult::None => 0xFF,
        }
    }

    pub fn write_ram_address(&mut self, address: u16, value: u8) {
        match self.mapper.map_ram_address(address) {
            RamMapResult::RamAddress(ram_address) => {
                if let Some(byte) = self.ram.get_mut(ram_address as usize) {
                    *byte = value;
                }
            }
            RamMapResult::MapperRegister => {
                self.mapper.write_ram_addressed_register(value);
            }
            RamMapResult::None => {}
        }
    }

    /// Return the bank controller to its power-on bank selection. RAM contents are kept.
    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    /// The full contents of battery-backed cartridge RAM.
    pub fn export_save_data(&self) -> Result<&[u8], SaveDataError> {
        self.check_battery_ram()?;
        Ok(&self.ram)
    }

    /// Replace the contents of battery-backed cartridge RAM, e.g. with a previously exported save.
    pub fn import_save_data(&mut self, data: &[u8]) -> Result<(), SaveDataError> {
        self.check_battery_ram()?;

        if data.len() != self.ram.len() {
            return Err(SaveDataError::LengthMismatch {
                expected: self.ram.len(),
                actual: data.len(),
            });
        }

        self.ram.copy_from_slice(data);
        Ok(())
    }

    fn check_battery_ram(&self) -> Result<(), SaveDataError> {
        if !self.metadata.features.has_ram {
            return Err(SaveDataError::NoRam);
        }
        if !self.metadata.features.has_battery {
            return Err(SaveDataError::NoBattery);
        }
        Ok(())
    }

    pub(crate) fn move_unserializable_fields_from(&mut self, other: Self) {
        self.rom = other.rom;
    }
}
