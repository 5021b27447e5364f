use serde::{Deserialize, Serialize};

/// What $A000-$BFFF is currently mapped to on an MBC3 cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Mbc3Select {
    Ram(u8),
    // Index 0-4, corresponding to select values 0x08-0x0C
    Rtc(u8),
}

impl Mbc3Select {
    pub(crate) fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x00..=0x03 => Some(Self::Ram(value)),
            0x08..=0x0C => Some(Self::Rtc(value - 0x08)),
            _ => None,
        }
    }
}

/// The clock register bank of an MBC3 cartridge: seconds, minutes, hours, day low, day high.
///
/// The registers hold whatever was last written to them and never advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RtcRegisters([u8; 5]);

impl RtcRegisters {
    pub(crate) fn new() -> Self {
        Self([0; 5])
    }

    pub(crate) fn read(&self, index: u8) -> u8 {
        self.0.get(usize::from(index)).copied().unwrap_or(0xFF)
    }

    pub(crate) fn write(&mut self, index: u8, value: u8) {
        log::trace!("RTC register {index} written with {value:02X}");
        if let Some(register) = self.0.get_mut(usize::from(index)) {
            *register = value;
        }
    }
}
