use crate::memory::address;
use crate::memory::ioregisters::{IoRegister, IoRegisters, TileDataArea};
use crate::ppu::sprites::{RowCursors, SpriteData};
use crate::ppu::SCREEN_WIDTH;

pub type ScanlineBuffer = [u8; SCREEN_WIDTH];

fn vram_byte(vram: &[u8; address::VRAM_LEN], address: u16) -> u8 {
    vram[((address - address::VRAM_START) & 0x1FFF) as usize]
}

fn tile_color_index(vram: &[u8; address::VRAM_LEN], tile_address: u16, row: u8, col: u8) -> u8 {
    let row_address = tile_address + 2 * u16::from(row);
    let lo = vram_byte(vram, row_address);
    let hi = vram_byte(vram, row_address + 1);

    let bit = 7 - col;
    (((hi >> bit) & 0x01) << 1) | ((lo >> bit) & 0x01)
}

/// Resolve a 2-bit color index through a palette register to a 2-bit shade.
pub fn palette_shade(palette: u8, color_index: u8) -> u8 {
    (palette >> (2 * color_index)) & 0x03
}

/// Draw the background and window layers for line `ly` into `line`.
///
/// Returns whether any window pixels were drawn, which determines whether the internal window line
/// counter advances.
pub fn render_background_line(
    io_registers: &IoRegisters,
    vram: &[u8; address::VRAM_LEN],
    ly: u8,
    window_line: u8,
    line: &mut ScanlineBuffer,
) -> bool {
    let lcdc = io_registers.lcdc();
    if !lcdc.bg_enabled() {
        line.fill(0);
        return false;
    }

    let scx = io_registers.read_register(IoRegister::SCX);
    let scy = io_registers.read_register(IoRegister::SCY);
    let wx = u16::from(io_registers.read_register(IoRegister::WX));
    let wy = io_registers.read_register(IoRegister::WY);
    let bgp = io_registers.read_register(IoRegister::BGP);
    let tile_data_area: TileDataArea = lcdc.bg_tile_data_area();

    let window_active = lcdc.window_enabled() && ly >= wy;
    let mut window_drawn = false;

    for (x, pixel) in line.iter_mut().enumerate() {
        let x = x as u16;

        let (map_base, map_x, map_y) = if window_active && x + 7 >= wx {
            window_drawn = true;
            (lcdc.window_tile_map_base(), (x + 7 - wx) as u8, window_line)
        } else {
            (
                lcdc.bg_tile_map_base(),
                (x as u8).wrapping_add(scx),
                ly.wrapping_add(scy),
            )
        };

        let map_address = map_base + 32 * u16::from(map_y / 8) + u16::from(map_x / 8);
        let tile_number = vram_byte(vram, map_address);
        let tile_address = tile_data_area.tile_address(tile_number);

        let color_index = tile_color_index(vram, tile_address, map_y % 8, map_x % 8);
        *pixel = palette_shade(bgp, color_index);
    }

    window_drawn
}

/// Draw the selected sprites for line `ly` over `line`, advancing each drawn sprite's row cursor.
///
/// Sprites are drawn in reverse selection order so that the lowest OAM index ends up on top.
pub fn render_sprite_line(
    io_registers: &IoRegisters,
    vram: &[u8; address::VRAM_LEN],
    ly: u8,
    sprites: &[SpriteData],
    row_cursors: &mut RowCursors,
    line: &mut ScanlineBuffer,
) {
    let lcdc = io_registers.lcdc();
    if !lcdc.sprites_enabled() {
        return;
    }

    let sprite_height = lcdc.sprite_height();
    let obp0 = io_registers.read_register(IoRegister::OBP0);
    let obp1 = io_registers.read_register(IoRegister::OBP1);

    for &sprite in sprites.iter().rev() {
        // Selection guarantees ly + 16 >= y
        let line_row = (u16::from(ly) + 16).saturating_sub(u16::from(sprite.y)) as u8;

        // Sprites partially above the top of the screen start partway through their rows
        let row = row_cursors.get(sprite.oam_index).max(line_row);
        if row >= sprite_height {
            continue;
        }
        row_cursors.set(sprite.oam_index, row + 1);

        let tile_row = if sprite.y_flip() {
            sprite_height - 1 - row
        } else {
            row
        };

        // Tall sprites ignore the lowest bit of the tile number
        let tile_number = if sprite_height == 16 {
            sprite.tile & 0xFE
        } else {
            sprite.tile
        };
        let tile_address = TileDataArea::Unsigned.tile_address(tile_number);

        let palette = if sprite.uses_obp1() { obp1 } else { obp0 };

        for col in 0..8_u8 {
            let screen_x = i16::from(sprite.x) - 8 + i16::from(col);
            if !(0..SCREEN_WIDTH as i16).contains(&screen_x) {
                continue;
            }

            let tile_col = if sprite.x_flip() { 7 - col } else { col };
            let color_index = tile_color_index(vram, tile_address, tile_row, tile_col);
            if color_index == 0 {
                // Transparent
                continue;
            }

            line[screen_x as usize] = palette_shade(palette, color_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VRAM_START: usize = address::VRAM_START as usize;

    fn registers(lcdc: u8) -> IoRegisters {
        let mut io_registers = IoRegisters::zeroed();
        io_registers.write_register(IoRegister::LCDC, lcdc);
        // BGP and OBP0 map each color to itself, OBP1 inverts
        io_registers.write_register(IoRegister::BGP, 0xE4);
        io_registers.write_register(IoRegister::OBP0, 0xE4);
        io_registers.write_register(IoRegister::OBP1, 0x1B);
        io_registers
    }

    fn set_tile_row(vram: &mut [u8; address::VRAM_LEN], tile_address: u16, row: u8, lo: u8, hi: u8) {
        let addr = tile_address as usize + 2 * row as usize - VRAM_START;
        vram[addr] = lo;
        vram[addr + 1] = hi;
    }

    #[test]
    fn palette_resolution() {
        assert_eq!(0, palette_shade(0xE4, 0));
        assert_eq!(3, palette_shade(0xE4, 3));
        assert_eq!(3, palette_shade(0x1B, 0));
        assert_eq!(3, palette_shade(0xFC, 1));
    }

    #[test]
    fn background_scroll_wraps() {
        let io_registers = {
            let mut io_registers = registers(0x91);
            io_registers.write_register(IoRegister::SCX, 0xFC);
            io_registers
        };

        let mut vram = [0; address::VRAM_LEN];
        // Map column 31 uses tile 1; tile 1 row 0 is solid color 3
        vram[0x9800 + 31 - VRAM_START] = 0x01;
        set_tile_row(&mut vram, 0x8010, 0, 0xFF, 0xFF);

        let mut line = [0xAA; SCREEN_WIDTH];
        let window_drawn = render_background_line(&io_registers, &vram, 0, 0, &mut line);

        assert!(!window_drawn);
        // Screen x 0-3 show map x 252-255, the right half of map tile 31
        assert_eq!([3, 3, 3, 3, 0, 0], line[..6]);
        assert_eq!(0, line[159]);
    }

    #[test]
    fn signed_tile_addressing() {
        // LCDC bit 4 clear: tile 0x80 lives at $8800
        let io_registers = registers(0x81);

        let mut vram = [0; address::VRAM_LEN];
        vram[0x9800 - VRAM_START] = 0x80;
        set_tile_row(&mut vram, 0x8800, 2, 0x80, 0x00);

        let mut line = [0; SCREEN_WIDTH];
        render_background_line(&io_registers, &vram, 2, 0, &mut line);
        assert_eq!([1, 0], line[..2]);
    }

    #[test]
    fn background_disabled() {
        let io_registers = registers(0x90);

        let vram = [0xFF; address::VRAM_LEN];

        let mut line = [2; SCREEN_WIDTH];
        render_background_line(&io_registers, &vram, 0, 0, &mut line);
        assert!(line.iter().all(|&shade| shade == 0));
    }

    #[test]
    fn window_layer() {
        // BG map at $9800 (tile 0 blank), window map at $9C00 using tile 1 which is solid
        let mut io_registers = registers(0xF1);
        io_registers.write_register(IoRegister::WX, 7 + 100);
        io_registers.write_register(IoRegister::WY, 10);

        let mut vram = [0; address::VRAM_LEN];
        vram[0x9C00 - VRAM_START..0x9C00 - VRAM_START + 32].fill(0x01);
        for row in 0..8 {
            set_tile_row(&mut vram, 0x8010, row, 0x00, 0xFF);
        }

        let mut line = [0; SCREEN_WIDTH];
        assert!(!render_background_line(&io_registers, &vram, 9, 0, &mut line));
        assert!(line.iter().all(|&shade| shade == 0));

        assert!(render_background_line(&io_registers, &vram, 10, 0, &mut line));
        assert_eq!(0, line[99]);
        assert_eq!(2, line[100]);
        assert_eq!(2, line[159]);
    }

    #[test]
    fn sprite_compositing() {
        let io_registers = registers(0x93);

        let mut vram = [0; address::VRAM_LEN];
        // Tile 2 row 0: leftmost pixel color 1, rightmost pixel color 3, rest transparent
        set_tile_row(&mut vram, 0x8020, 0, 0x81, 0x01);
        // Tile 3 row 0: solid color 2
        set_tile_row(&mut vram, 0x8030, 0, 0x00, 0xFF);

        let sprites = [
            SpriteData {
                oam_index: 0,
                y: 16,
                x: 8,
                tile: 2,
                flags: 0,
            },
            SpriteData {
                oam_index: 1,
                y: 16,
                x: 12,
                tile: 3,
                flags: 0x10,
            },
        ];
        let mut row_cursors = RowCursors::new();

        let mut line = [0; SCREEN_WIDTH];
        render_sprite_line(&io_registers, &vram, 0, &sprites, &mut row_cursors, &mut line);

        assert_eq!(1, line[0]);
        // Sprite 0's transparent pixels let sprite 1 show through; OBP1 maps color 2 to shade 1
        assert_eq!(1, line[4]);
        // Where both sprites are opaque, the lower OAM index wins
        assert_eq!(3, line[7]);
        assert_eq!(1, line[11]);
        assert_eq!(0, line[12]);

        assert_eq!(1, row_cursors.get(0));
        assert_eq!(1, row_cursors.get(1));
    }

    #[test]
    fn sprite_flips_and_clipping() {
        let io_registers = registers(0x93);

        let mut vram = [0; address::VRAM_LEN];
        // Tile 0 row 7: leftmost pixel color 3
        set_tile_row(&mut vram, 0x8000, 7, 0x80, 0x80);

        let sprites = [SpriteData {
            oam_index: 5,
            y: 16,
            x: 4,
            tile: 0,
            flags: 0x60,
        }];
        let mut row_cursors = RowCursors::new();

        let mut line = [0; SCREEN_WIDTH];
        render_sprite_line(&io_registers, &vram, 0, &sprites, &mut row_cursors, &mut line);

        // Y flip draws row 7 on the first line; X flip moves its leftmost pixel to screen x 3
        assert_eq!(3, line[3]);
        assert!(line[..3].iter().all(|&shade| shade == 0));
        assert_eq!(1, row_cursors.get(5));
    }

    #[test]
    fn sprite_above_top_edge_starts_mid_tile() {
        let io_registers = registers(0x93);

        let mut vram = [0; address::VRAM_LEN];
        // Tile 1: only row 6 is opaque
        set_tile_row(&mut vram, 0x8010, 6, 0xFF, 0x00);

        let sprites = [SpriteData {
            oam_index: 0,
            y: 10,
            x: 8,
            tile: 1,
            flags: 0,
        }];
        let mut row_cursors = RowCursors::new();

        let mut line = [0; SCREEN_WIDTH];
        render_sprite_line(&io_registers, &vram, 0, &sprites, &mut row_cursors, &mut line);

        assert!(line[..8].iter().all(|&shade| shade == 1));
        assert_eq!(0, line[8]);
        assert_eq!(7, row_cursors.get(0));
    }

    #[test]
    fn tall_sprite_advances_through_both_tiles() {
        let io_registers = registers(0x97);

        let mut vram = [0; address::VRAM_LEN];
        // Tile 4 is the top half, tile 5 the bottom half
        set_tile_row(&mut vram, 0x8040, 0, 0x80, 0x00);
        set_tile_row(&mut vram, 0x8050, 0, 0x80, 0x80);

        let sprites = [SpriteData {
            oam_index: 0,
            y: 16,
            x: 8,
            tile: 5,
            flags: 0,
        }];
        let mut row_cursors = RowCursors::new();

        let mut line = [0; SCREEN_WIDTH];
        render_sprite_line(&io_registers, &vram, 0, &sprites, &mut row_cursors, &mut line);
        assert_eq!(1, line[0]);

        row_cursors.set(0, 8);
        render_sprite_line(&io_registers, &vram, 8, &sprites, &mut row_cursors, &mut line);
        assert_eq!(3, line[0]);
        assert_eq!(9, row_cursors.get(0));
    }

    #[test]
    fn sprites_disabled() {
        let io_registers = registers(0x91);

        let mut vram = [0; address::VRAM_LEN];
        set_tile_row(&mut vram, 0x8000, 0, 0xFF, 0xFF);

        let sprites = [SpriteData {
            oam_index: 0,
            y: 16,
            x: 8,
            tile: 0,
            flags: 0,
        }];
        let mut row_cursors = RowCursors::new();

        let mut line = [0; SCREEN_WIDTH];
        render_sprite_line(&io_registers, &vram, 0, &sprites, &mut row_cursors, &mut line);
        assert!(line.iter().all(|&shade| shade == 0));
        assert_eq!(0, row_cursors.get(0));
    }
}
