/// A read-only view around the STAT register's interrupt source enable bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat<'a>(pub(super) &'a u8);

impl<'a> Stat<'a> {
    pub fn lyc_interrupt_enabled(self) -> bool {
        *self.0 & 0x40 != 0
    }

    pub fn mode_2_interrupt_enabled(self) -> bool {
        *self.0 & 0x20 != 0
    }

    pub fn mode_1_interrupt_enabled(self) -> bool {
        *self.0 & 0x10 != 0
    }

    pub fn mode_0_interrupt_enabled(self) -> bool {
        *self.0 & 0x08 != 0
    }

    pub fn coincidence_flag(self) -> bool {
        *self.0 & 0x04 != 0
    }
}
