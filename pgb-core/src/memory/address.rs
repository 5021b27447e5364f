//
// Cartridge header addresses
//

pub const TITLE_START: u16 = 0x0134;
pub const TITLE_END: u16 = 0x013E;
pub const CGB_SUPPORT: u16 = 0x0143;
pub const MAPPER: u16 = 0x0147;
pub const ROM_SIZE: u16 = 0x0148;
pub const RAM_SIZE: u16 = 0x0149;
pub const HEADER_END: u16 = 0x014F;

//
// Address space boundaries
//

pub const ROM_START: u16 = 0x0000;
pub const ROM_BANK_0_END: u16 = 0x3FFF;
pub const ROM_END: u16 = 0x7FFF;

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;

pub const EXTERNAL_RAM_START: u16 = 0xA000;
pub const EXTERNAL_RAM_END: u16 = 0xBFFF;

pub const WORKING_RAM_START: u16 = 0xC000;
pub const WORKING_RAM_END: u16 = 0xDFFF;

pub const ECHO_RAM_START: u16 = 0xE000;
pub const ECHO_RAM_END: u16 = 0xFDFF;

// Echo RAM address minus this offset is the mirrored working RAM address
pub const ECHO_RAM_OFFSET: u16 = ECHO_RAM_START - WORKING_RAM_START;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFE9F;

pub const UNUSABLE_START: u16 = 0xFEA0;
pub const UNUSABLE_END: u16 = 0xFEFF;

pub const IO_REGISTERS_START: u16 = 0xFF00;
pub const IO_REGISTERS_END: u16 = 0xFF7F;

pub const HRAM_START: u16 = 0xFF80;
pub const HRAM_END: u16 = 0xFFFE;

pub const IE_REGISTER: u16 = 0xFFFF;

//
// Region sizes
//

pub const ROM_BANK_LEN: u32 = 0x4000;
pub const RAM_BANK_LEN: u32 = 0x2000;

pub const VRAM_LEN: usize = (VRAM_END - VRAM_START + 1) as usize;
pub const WORKING_RAM_LEN: usize = (WORKING_RAM_END - WORKING_RAM_START + 1) as usize;
pub const OAM_LEN: usize = (OAM_END - OAM_START + 1) as usize;
pub const IO_REGISTERS_LEN: usize = (IO_REGISTERS_END - IO_REGISTERS_START + 1) as usize;
pub const HRAM_LEN: usize = (HRAM_END - HRAM_START + 1) as usize;
