const TILE_MAP_AREA_0: u16 = 0x9800;
const TILE_MAP_AREA_1: u16 = 0x9C00;

/// Which of the two tile data addressing modes is selected by LCDC bit 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileDataArea {
    // Signed tile indices relative to $9000
    Signed,
    // Unsigned tile indices relative to $8000
    Unsigned,
}

impl TileDataArea {
    /// Return the address of the first byte of the given tile.
    pub fn tile_address(self, tile_number: u8) -> u16 {
        match self {
            Self::Signed => 0x9000_u16.wrapping_add(((tile_number as i8) as u16) << 4),
            Self::Unsigned => 0x8000 | (u16::from(tile_number) << 4),
        }
    }
}

/// A read-only view around the LCDC register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcdc<'a>(pub(super) &'a u8);

impl<'a> Lcdc<'a> {
    pub fn lcd_enabled(self) -> bool {
        *self.0 & 0x80 != 0
    }

    pub fn window_tile_map_base(self) -> u16 {
        if *self.0 & 0x40 != 0 {
            TILE_MAP_AREA_1
        } else {
            TILE_MAP_AREA_0
        }
    }

    pub fn window_enabled(self) -> bool {
        *self.0 & 0x20 != 0
    }

    pub fn bg_tile_data_area(self) -> TileDataArea {
        if *self.0 & 0x10 != 0 {
            TileDataArea::Unsigned
        } else {
            TileDataArea::Signed
        }
    }

    pub fn bg_tile_map_base(self) -> u16 {
        if *self.0 & 0x08 != 0 {
            TILE_MAP_AREA_1
        } else {
            TILE_MAP_AREA_0
        }
    }

    pub fn sprite_height(self) -> u8 {
        if *self.0 & 0x04 != 0 {
            16
        } else {
            8
        }
    }

    pub fn sprites_enabled(self) -> bool {
        *self.0 & 0x02 != 0
    }

    pub fn bg_enabled(self) -> bool {
        *self.0 & 0x01 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_addresses() {
        assert_eq!(0x8000, TileDataArea::Unsigned.tile_address(0));
        assert_eq!(0x8FF0, TileDataArea::Unsigned.tile_address(0xFF));

        assert_eq!(0x9000, TileDataArea::Signed.tile_address(0));
        assert_eq!(0x97F0, TileDataArea::Signed.tile_address(0x7F));
        assert_eq!(0x8800, TileDataArea::Signed.tile_address(0x80));
        assert_eq!(0x8FF0, TileDataArea::Signed.tile_address(0xFF));
    }

    #[test]
    fn map_bases() {
        let value = 0x08;
        let lcdc = Lcdc(&value);
        assert_eq!(0x9C00, lcdc.bg_tile_map_base());
        assert_eq!(0x9800, lcdc.window_tile_map_base());

        let value = 0x40;
        let lcdc = Lcdc(&value);
        assert_eq!(0x9800, lcdc.bg_tile_map_base());
        assert_eq!(0x9C00, lcdc.window_tile_map_base());
    }
}
