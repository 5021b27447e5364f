mod lcdc;
mod stat;

use crate::interrupts::InterruptFlags;
use crate::memory::address;
use crate::serialize;
use pgb_proc_macros::{EnumAll, EnumDisplay};
use serde::{Deserialize, Serialize};

pub use lcdc::{Lcdc, TileDataArea};
pub use stat::Stat;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay, EnumAll)]
pub enum IoRegister {
    JOYP,
    SB,
    SC,
    DIV,
    TIMA,
    TMA,
    TAC,
    IF,
    NR10,
    NR11,
    NR12,
    NR13,
    NR14,
    NR21,
    NR22,
    NR23,
    NR24,
    NR30,
    NR31,
    NR32,
    NR33,
    NR34,
    NR41,
    NR42,
    NR43,
    NR44,
    NR50,
    NR51,
    NR52,
    LCDC,
    STAT,
    SCY,
    SCX,
    LY,
    LYC,
    DMA,
    BGP,
    OBP0,
    OBP1,
    WY,
    WX,
    BOOT,
}

impl IoRegister {
    /// Return the hardware register corresponding to the given address.
    pub fn from_address(address: u16) -> Option<Self> {
        let register = match address {
            0xFF00 => Self::JOYP,
            0xFF01 => Self::SB,
            0xFF02 => Self::SC,
            0xFF04 => Self::DIV,
            0xFF05 => Self::TIMA,
            0xFF06 => Self::TMA,
            0xFF07 => Self::TAC,
            0xFF0F => Self::IF,
            0xFF10 => Self::NR10,
            0xFF11 => Self::NR11,
            0xFF12 => Self::NR12,
            0xFF13 => Self::NR13,
            0xFF14 => Self::NR14,
            0xFF16 => Self::NR21,
            0xFF17 => Self::NR22,
            0xFF18 => Self::NR23,
            0xFF19 => Self::NR24,
            0xFF1A => Self::NR30,
            0xFF1B => Self::NR31,
            0xFF1C => Self::NR32,
            0xFF1D => Self::NR33,
            0xFF1E => Self::NR34,
            0xFF20 => Self::NR41,
            0xFF21 => Self::NR42,
            0xFF22 => Self::NR43,
            0xFF23 => Self::NR44,
            0xFF24 => Self::NR50,
            0xFF25 => Self::NR51,
            0xFF26 => Self::NR52,
            0xFF40 => Self::LCDC,
            0xFF41 => Self::STAT,
            0xFF42 => Self::SCY,
            0xFF43 => Self::SCX,
            0xFF44 => Self::LY,
            0xFF45 => Self::LYC,
            0xFF46 => Self::DMA,
            0xFF47 => Self::BGP,
            0xFF48 => Self::OBP0,
            0xFF49 => Self::OBP1,
            0xFF4A => Self::WY,
            0xFF4B => Self::WX,
            0xFF50 => Self::BOOT,
            _ => return None,
        };

        Some(register)
    }

    /// Return the address for this hardware register.
    pub fn to_address(self) -> u16 {
        match self {
            Self::JOYP => 0xFF00,
            Self::SB => 0xFF01,
            Self::SC => 0xFF02,
            Self::DIV => 0xFF04,
            Self::TIMA => 0xFF05,
            Self::TMA => 0xFF06,
            Self::TAC => 0xFF07,
            Self::IF => 0xFF0F,
            Self::NR10 => 0xFF10,
            Self::NR11 => 0xFF11,
            Self::NR12 => 0xFF12,
            Self::NR13 => 0xFF13,
            Self::NR14 => 0xFF14,
            Self::NR21 => 0xFF16,
            Self::NR22 => 0xFF17,
            Self::NR23 => 0xFF18,
            Self::NR24 => 0xFF19,
            Self::NR30 => 0xFF1A,
            Self::NR31 => 0xFF1B,
            Self::NR32 => 0xFF1C,
            Self::NR33 => 0xFF1D,
            Self::NR34 => 0xFF1E,
            Self::NR41 => 0xFF20,
            Self::NR42 => 0xFF21,
            Self::NR43 => 0xFF22,
            Self::NR44 => 0xFF23,
            Self::NR50 => 0xFF24,
            Self::NR51 => 0xFF25,
            Self::NR52 => 0xFF26,
            Self::LCDC => 0xFF40,
            Self::STAT => 0xFF41,
            Self::SCY => 0xFF42,
            Self::SCX => 0xFF43,
            Self::LY => 0xFF44,
            Self::LYC => 0xFF45,
            Self::DMA => 0xFF46,
            Self::BGP => 0xFF47,
            Self::OBP0 => 0xFF48,
            Self::OBP1 => 0xFF49,
            Self::WY => 0xFF4A,
            Self::WX => 0xFF4B,
            Self::BOOT => 0xFF50,
        }
    }

    fn relative_address(self) -> usize {
        (self.to_address() - address::IO_REGISTERS_START) as usize
    }
}

/// Raw storage for the I/O register bank at $FF00-$FF7F.
///
/// This type only stores bytes; the side effects of CPU writes are dispatched by the emulation
/// state, which owns every device that a register write can affect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoRegisters {
    #[serde(
        serialize_with = "serialize::serialize_array",
        deserialize_with = "serialize::deserialize_array"
    )]
    contents: [u8; address::IO_REGISTERS_LEN],
}

impl IoRegisters {
    const JOYP_RELATIVE_ADDR: usize = 0x00;
    const DIV_RELATIVE_ADDR: usize = 0x04;
    const IF_RELATIVE_ADDR: usize = 0x0F;
    const LCDC_RELATIVE_ADDR: usize = 0x40;
    const STAT_RELATIVE_ADDR: usize = 0x41;
    const LY_RELATIVE_ADDR: usize = 0x44;

    /// Create the register bank as it looks immediately after the boot ROM has finished.
    pub fn new() -> Self {
        let mut registers = Self::zeroed();

        for (register, value) in [
            (IoRegister::JOYP, 0xCF),
            (IoRegister::SC, 0x7E),
            (IoRegister::DIV, 0xAB),
            (IoRegister::TAC, 0xF8),
            (IoRegister::IF, 0xE1),
            (IoRegister::NR10, 0x80),
            (IoRegister::NR11, 0xBF),
            (IoRegister::NR12, 0xF3),
            (IoRegister::NR14, 0xBF),
            (IoRegister::NR21, 0x3F),
            (IoRegister::NR24, 0xBF),
            (IoRegister::NR30, 0x7F),
            (IoRegister::NR31, 0xFF),
            (IoRegister::NR32, 0x9F),
            (IoRegister::NR34, 0xBF),
            (IoRegister::NR41, 0xFF),
            (IoRegister::NR44, 0xBF),
            (IoRegister::NR50, 0x77),
            (IoRegister::NR51, 0xF3),
            (IoRegister::NR52, 0xF1),
            (IoRegister::LCDC, 0x91),
            (IoRegister::STAT, 0x85),
            (IoRegister::DMA, 0xFF),
            (IoRegister::BGP, 0xFC),
            (IoRegister::OBP0, 0xFF),
            (IoRegister::OBP1, 0xFF),
            (IoRegister::BOOT, 0xFF),
        ] {
            registers.write_register(register, value);
        }

        registers
    }

    /// Create a register bank with every byte cleared, as seen by a boot ROM at power-on.
    pub fn zeroed() -> Self {
        Self {
            contents: [0; address::IO_REGISTERS_LEN],
        }
    }

    /// Read the value at the given address. Returns 0xFF if no register is mapped there.
    pub fn read_address(&self, address: u16) -> u8 {
        let relative_addr = (address - address::IO_REGISTERS_START) as usize;

        if is_waveform_address(address) || IoRegister::from_address(address).is_some() {
            self.contents[relative_addr]
        } else {
            0xFF
        }
    }

    /// Store a byte at the given address with no side effects. Bytes stored at unmapped addresses
    /// are kept but never read back.
    pub fn write_address(&mut self, address: u16, value: u8) {
        self.contents[(address - address::IO_REGISTERS_START) as usize] = value;
    }

    pub fn read_register(&self, register: IoRegister) -> u8 {
        self.contents[register.relative_address()]
    }

    pub fn write_register(&mut self, register: IoRegister, value: u8) {
        self.contents[register.relative_address()] = value;
    }

    /// Assign a value to the JOYP register's low 6 bits; bits 6-7 always read 1.
    pub fn privileged_set_joyp(&mut self, value: u8) {
        self.contents[Self::JOYP_RELATIVE_ADDR] = 0xC0 | (value & 0x3F);
    }

    /// Assign a value to the STAT register (LCD status), including the read-only mode and
    /// coincidence bits. Should only be used by the PPU.
    pub fn privileged_set_stat(&mut self, value: u8) {
        self.contents[Self::STAT_RELATIVE_ADDR] = 0x80 | value;
    }

    /// Assign a value to the LY register (current scanline), which the CPU cannot write to.
    /// Should only be used by the PPU.
    pub fn privileged_set_ly(&mut self, value: u8) {
        self.contents[Self::LY_RELATIVE_ADDR] = value;
    }

    /// Assign a value to the DIV register (timer divider), which is normally always reset to 0x00
    /// when the CPU writes to it. Should only be used by the timer code.
    pub fn privileged_set_div(&mut self, value: u8) {
        self.contents[Self::DIV_RELATIVE_ADDR] = value;
    }

    /// Obtain a read-only view around the LCDC register (LCD control).
    pub fn lcdc(&self) -> Lcdc<'_> {
        Lcdc(&self.contents[Self::LCDC_RELATIVE_ADDR])
    }

    /// Obtain a read-only view around the STAT register (LCD status).
    pub fn stat(&self) -> Stat<'_> {
        Stat(&self.contents[Self::STAT_RELATIVE_ADDR])
    }

    /// Obtain a read/write view around the IF register (interrupt request flags).
    pub fn interrupt_flags(&mut self) -> InterruptFlags<'_> {
        InterruptFlags(&mut self.contents[Self::IF_RELATIVE_ADDR])
    }
}

impl Default for IoRegisters {
    fn default() -> Self {
        Self::new()
    }
}

fn is_waveform_address(address: u16) -> bool {
    (0xFF30..=0xFF3F).contains(&address)
}
