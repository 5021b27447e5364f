pub mod address;
pub mod cartridge;
pub mod ioregisters;
mod mapper;

use crate::memory::cartridge::Cartridge;
use crate::memory::ioregisters::IoRegisters;
use crate::serialize;
use serde::{Deserialize, Serialize};

pub use mapper::{MapperFeatures, MapperType};

/// Everything the CPU can see through the 16-bit bus, apart from the side effects of I/O register
/// writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressSpace {
    cartridge: Option<Cartridge>,
    #[serde(skip)]
    boot_rom: Option<Vec<u8>>,
    boot_rom_mapped: bool,
    #[serde(
        serialize_with = "serialize::serialize_array",
        deserialize_with = "serialize::deserialize_array"
    )]
    vram: [u8; address::VRAM_LEN],
    #[serde(
        serialize_with = "serialize::serialize_array",
        deserialize_with = "serialize::deserialize_array"
    )]
    working_ram: [u8; address::WORKING_RAM_LEN],
    #[serde(
        serialize_with = "serialize::serialize_array",
        deserialize_with = "serialize::deserialize_array"
    )]
    oam: [u8; address::OAM_LEN],
    io_registers: IoRegisters,
    #[serde(
        serialize_with = "serialize::serialize_array",
        deserialize_with = "serialize::deserialize_array"
    )]
    hram: [u8; address::HRAM_LEN],
    ie_register: u8,
}

impl AddressSpace {
    pub fn new(cartridge: Option<Cartridge>, boot_rom: Option<Vec<u8>>) -> Self {
        let boot_rom_mapped = boot_rom.is_some();
        Self {
            cartridge,
            boot_rom,
            boot_rom_mapped,
            vram: [0; address::VRAM_LEN],
            working_ram: [0; address::WORKING_RAM_LEN],
            oam: [0; address::OAM_LEN],
            io_registers: IoRegisters::new(),
            hram: [0; address::HRAM_LEN],
            ie_register: 0,
        }
    }

    pub fn read_address_u8(&self, address: u16) -> u8 {
        if let Some(byte) = self.read_boot_rom(address) {
            return byte;
        }

        match address {
            address::ROM_START..=address::ROM_END => self
                .cartridge
                .as_ref()
                .map_or(0xFF, |cartridge| cartridge.read_rom_address(address)),
            address::VRAM_START..=address::VRAM_END => {
                self.vram[(address - address::VRAM_START) as usize]
            }
            address::EXTERNAL_RAM_START..=address::EXTERNAL_RAM_END => self
                .cartridge
                .as_ref()
                .map_or(0xFF, |cartridge| cartridge.read_ram_address(address)),
            address::WORKING_RAM_START..=address::WORKING_RAM_END => {
                self.working_ram[(address - address::WORKING_RAM_START) as usize]
            }
            address::ECHO_RAM_START..=address::ECHO_RAM_END => {
                self.working_ram
                    [(address - address::ECHO_RAM_OFFSET - address::WORKING_RAM_START) as usize]
            }
            address::OAM_START..=address::OAM_END => {
                self.oam[(address - address::OAM_START) as usize]
            }
            address::UNUSABLE_START..=address::UNUSABLE_END => 0x00,
            address::IO_REGISTERS_START..=address::IO_REGISTERS_END => {
                self.io_registers.read_address(address)
            }
            address::HRAM_START..=address::HRAM_END => {
                self.hram[(address - address::HRAM_START) as usize]
            }
            address::IE_REGISTER => self.ie_register,
        }
    }

    /// Store a byte. Writes to the I/O register range are stored raw; callers that need register
    /// side effects must dispatch those writes themselves.
    pub fn write_address_u8(&mut self, address: u16, value: u8) {
        match address {
            address::ROM_START..=address::ROM_END => {
                if let Some(cartridge) = &mut self.cartridge {
                    cartridge.write_rom_address(address, value);
                }
            }
            address::VRAM_START..=address::VRAM_END => {
                self.vram[(address - address::VRAM_START) as usize] = value;
            }
            address::EXTERNAL_RAM_START..=address::EXTERNAL_RAM_END => {
                if let Some(cartridge) = &mut self.cartridge {
                    cartridge.write_ram_address(address, value);
                }
            }
            address::WORKING_RAM_START..=address::WORKING_RAM_END => {
                self.working_ram[(address - address::WORKING_RAM_START) as usize] = value;
            }
            address::ECHO_RAM_START..=address::ECHO_RAM_END => {
                self.working_ram
                    [(address - address::ECHO_RAM_OFFSET - address::WORKING_RAM_START) as usize] =
                    value;
            }
            address::OAM_START..=address::OAM_END => {
                self.oam[(address - address::OAM_START) as usize] = value;
            }
            address::UNUSABLE_START..=address::UNUSABLE_END => {
                log::trace!("Dropped write to unusable address {address:04X}: {value:02X}");
            }
            address::IO_REGISTERS_START..=address::IO_REGISTERS_END => {
                self.io_registers.write_address(address, value);
            }
            address::HRAM_START..=address::HRAM_END => {
                self.hram[(address - address::HRAM_START) as usize] = value;
            }
            address::IE_REGISTER => {
                self.ie_register = value;
            }
        }
    }

    fn read_boot_rom(&self, address: u16) -> Option<u8> {
        if !self.boot_rom_mapped {
            return None;
        }

        self.boot_rom
            .as_ref()
            .and_then(|boot_rom| boot_rom.get(usize::from(address)).copied())
    }

    pub fn boot_rom_mapped(&self) -> bool {
        self.boot_rom_mapped
    }

    pub(crate) fn unmap_boot_rom(&mut self) {
        if self.boot_rom_mapped {
            log::debug!("Boot ROM unmapped");
        }
        self.boot_rom_mapped = false;
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    /// Insert a new cartridge, returning the previous one if any.
    pub fn replace_cartridge(&mut self, cartridge: Cartridge) -> Option<Cartridge> {
        self.cartridge.replace(cartridge)
    }

    pub fn io_registers(&self) -> &IoRegisters {
        &self.io_registers
    }

    pub fn io_registers_mut(&mut self) -> &mut IoRegisters {
        &mut self.io_registers
    }

    pub fn ie_register(&self) -> u8 {
        self.ie_register
    }

    /// Split borrows for the picture state machine, which updates registers while reading video
    /// memory.
    pub(crate) fn ppu_fields(
        &mut self,
    ) -> (
        &mut IoRegisters,
        &[u8; address::VRAM_LEN],
        &[u8; address::OAM_LEN],
    ) {
        (&mut self.io_registers, &self.vram, &self.oam)
    }

    /// Clear every RAM region owned by the console and return the cartridge's bank controller to
    /// its power-on state. Cartridge RAM is kept. I/O registers are left for the caller to
    /// reinitialize.
    pub fn reset(&mut self) {
        self.boot_rom_mapped = self.boot_rom.is_some();
        self.vram = [0; address::VRAM_LEN];
        self.working_ram = [0; address::WORKING_RAM_LEN];
        self.oam = [0; address::OAM_LEN];
        self.hram = [0; address::HRAM_LEN];
        self.ie_register = 0;

        if let Some(cartridge) = &mut self.cartridge {
            cartridge.reset();
        }
    }

    pub(crate) fn replace_io_registers(&mut self, io_registers: IoRegisters) {
        self.io_registers = io_registers;
    }

    pub(crate) fn move_unserializable_fields_from(&mut self, other: Self) {
        self.boot_rom = other.boot_rom;

        if let (Some(cartridge), Some(other_cartridge)) = (&mut self.cartridge, other.cartridge) {
            cartridge.move_unserializable_fields_from(other_cartridge);
        }
    }
}
