use crate::memory::address;
use crate::serialize;
use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;

pub const OAM_SPRITE_COUNT: usize = 40;
pub const MAX_SPRITES_PER_LINE: usize = 10;

pub type SelectedSprites = ArrayVec<[SpriteData; MAX_SPRITES_PER_LINE]>;

/// One decoded OAM entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpriteData {
    pub oam_index: u8,
    pub y: u8,
    pub x: u8,
    pub tile: u8,
    pub flags: u8,
}

impl SpriteData {
    pub fn from_oam(oam: &[u8; address::OAM_LEN], oam_index: usize) -> Self {
        let base = 4 * oam_index;
        Self {
            oam_index: oam_index as u8,
            y: oam[base],
            x: oam[base + 1],
            tile: oam[base + 2],
            flags: oam[base + 3],
        }
    }

    pub fn uses_obp1(self) -> bool {
        self.flags & 0x10 != 0
    }

    pub fn x_flip(self) -> bool {
        self.flags & 0x20 != 0
    }

    pub fn y_flip(self) -> bool {
        self.flags & 0x40 != 0
    }
}

/// Per-sprite index of the next tile row to draw. Reset to 0 for every sprite on VBlank entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCursors(
    #[serde(
        serialize_with = "serialize::serialize_array",
        deserialize_with = "serialize::deserialize_array"
    )]
    [u8; OAM_SPRITE_COUNT],
);

impl RowCursors {
    pub fn new() -> Self {
        Self([0; OAM_SPRITE_COUNT])
    }

    pub fn reset(&mut self) {
        self.0 = [0; OAM_SPRITE_COUNT];
    }

    pub fn get(&self, oam_index: u8) -> u8 {
        self.0[usize::from(oam_index)]
    }

    pub fn set(&mut self, oam_index: u8, row: u8) {
        self.0[usize::from(oam_index)] = row;
    }
}

impl Default for RowCursors {
    fn default() -> Self {
        Self::new()
    }
}

/// Select the sprites that overlap the given line, in OAM order, stopping once 10 are found.
/// X position plays no part in selection.
pub fn scan_oam(oam: &[u8; address::OAM_LEN], ly: u8, sprite_height: u8) -> SelectedSprites {
    let line = u16::from(ly) + 16;

    let mut selected = SelectedSprites::new();
    for oam_index in 0..OAM_SPRITE_COUNT {
        let sprite = SpriteData::from_oam(oam, oam_index);

        let top = u16::from(sprite.y);
        if !(top..top + u16::from(sprite_height)).contains(&line) {
            continue;
        }

        selected.push(sprite);
        if selected.len() == MAX_SPRITES_PER_LINE {
            break;
        }
    }

    log::trace!("Line {ly}: selected {} sprites", selected.len());

    selected
}
