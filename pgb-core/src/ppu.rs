//! Picture state machine: mode timing, LY/LYC coincidence, and the STAT interrupt line

pub mod render;
pub mod sprites;

use crate::interrupts::InterruptType;
use crate::memory::address;
use crate::memory::ioregisters::{IoRegister, IoRegisters};
use crate::ppu::sprites::{RowCursors, SelectedSprites};
use crate::serialize;
use pgb_proc_macros::EnumDisplay;
use serde::{Deserialize, Serialize};

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

// 144 rendered lines + 10 VBlank lines
const LINES_PER_FRAME: u8 = 154;
const DOTS_PER_LINE: u64 = 456;

/// One frame of 2-bit shades, already resolved through the palette registers.
pub type FrameBuffer = [[u8; SCREEN_WIDTH]; SCREEN_HEIGHT];

/// Consumer of completed frames, e.g. a presentation surface.
pub trait FrameSink {
    fn present(&mut self, frame: &FrameBuffer);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay)]
pub enum Mode {
    // Mode 0
    HBlank,
    // Mode 1
    VBlank,
    // Mode 2
    ObjectSearch,
    // Mode 3
    PixelTransfer,
}

impl Mode {
    pub fn to_bits(self) -> u8 {
        match self {
            Self::HBlank => 0,
            Self::VBlank => 1,
            Self::ObjectSearch => 2,
            Self::PixelTransfer => 3,
        }
    }

    // VBlank transitions internally once per line
    fn dwell_dots(self) -> u64 {
        match self {
            Self::ObjectSearch => 80,
            Self::PixelTransfer => 172,
            Self::HBlank => 204,
            Self::VBlank => DOTS_PER_LINE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PpuState {
    mode: Mode,
    ly: u8,
    // Dots elapsed in the current mode (or current line during VBlank)
    dots: u64,
    stat_signal: bool,
    window_line: u8,
    row_cursors: RowCursors,
    selected_sprites: SelectedSprites,
    #[serde(
        serialize_with = "serialize::serialize_2d_array",
        deserialize_with = "serialize::deserialize_2d_array"
    )]
    frame_buffer: FrameBuffer,
    blank_frame_pending: bool,
}

impl PpuState {
    pub fn new() -> Self {
        Self {
            mode: Mode::HBlank,
            ly: 0,
            dots: 0,
            stat_signal: false,
            window_line: 0,
            row_cursors: RowCursors::new(),
            selected_sprites: SelectedSprites::new(),
            frame_buffer: [[0; SCREEN_WIDTH]; SCREEN_HEIGHT],
            blank_frame_pending: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn ly(&self) -> u8 {
        self.ly
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    /// Advance the state machine by the given number of cycles. Does nothing while the LCD is off,
    /// other than delivering the blank frame produced when it was switched off.
    pub fn tick<S: FrameSink>(
        &mut self,
        io_registers: &mut IoRegisters,
        vram: &[u8; address::VRAM_LEN],
        oam: &[u8; address::OAM_LEN],
        cycles: u64,
        sink: &mut S,
    ) {
        if !io_registers.lcdc().lcd_enabled() {
            if self.blank_frame_pending {
                self.blank_frame_pending = false;
                sink.present(&self.frame_buffer);
            }
            return;
        }

        self.dots += cycles;
        while self.dots >= self.mode.dwell_dots() {
            self.dots -= self.mode.dwell_dots();

            match self.mode {
                Mode::ObjectSearch => {
                    let sprite_height = io_registers.lcdc().sprite_height();
                    self.selected_sprites = sprites::scan_oam(oam, self.ly, sprite_height);
                    self.set_mode(io_registers, Mode::PixelTransfer);
                }
                Mode::PixelTransfer => {
                    self.render_current_line(io_registers, vram);
                    self.set_mode(io_registers, Mode::HBlank);
                }
                Mode::HBlank => {
                    self.ly += 1;
                    self.check_coincidence(io_registers);
                    io_registers.privileged_set_ly(self.ly);

                    if usize::from(self.ly) == SCREEN_HEIGHT {
                        io_registers.interrupt_flags().set(InterruptType::VBlank);
                        self.set_mode(io_registers, Mode::VBlank);

                        sink.present(&self.frame_buffer);
                        self.row_cursors.reset();
                        self.window_line = 0;
                    } else {
                        self.set_mode(io_registers, Mode::ObjectSearch);
                    }
                }
                Mode::VBlank => {
                    self.ly += 1;
                    if self.ly == LINES_PER_FRAME {
                        self.ly = 0;
                        self.check_coincidence(io_registers);
                        self.set_mode(io_registers, Mode::ObjectSearch);
                    } else {
                        self.check_coincidence(io_registers);
                        self.update_stat_signal(io_registers);
                    }
                    io_registers.privileged_set_ly(self.ly);
                }
            }
        }
    }

    fn render_current_line(&mut self, io_registers: &IoRegisters, vram: &[u8; address::VRAM_LEN]) {
        let mut line = [0; SCREEN_WIDTH];

        let window_drawn = render::render_background_line(
            io_registers,
            vram,
            self.ly,
            self.window_line,
            &mut line,
        );
        render::render_sprite_line(
            io_registers,
            vram,
            self.ly,
            &self.selected_sprites,
            &mut self.row_cursors,
            &mut line,
        );

        if window_drawn {
            self.window_line += 1;
        }

        if let Some(row) = self.frame_buffer.get_mut(usize::from(self.ly)) {
            *row = line;
        }
    }

    fn set_mode(&mut self, io_registers: &mut IoRegisters, mode: Mode) {
        log::trace!("PPU mode {} -> {mode} at LY={}", self.mode, self.ly);
        self.mode = mode;

        let stat = io_registers.read_register(IoRegister::STAT);
        io_registers.privileged_set_stat((stat & 0xFC) | mode.to_bits());

        self.update_stat_signal(io_registers);
    }

    fn check_coincidence(&self, io_registers: &mut IoRegisters) {
        let coincidence = self.ly == io_registers.read_register(IoRegister::LYC);

        let stat = io_registers.read_register(IoRegister::STAT);
        io_registers.privileged_set_stat((stat & 0xFB) | (u8::from(coincidence) << 2));
    }

    fn stat_interrupt_line(&self, io_registers: &IoRegisters) -> bool {
        let stat = io_registers.stat();
        (stat.lyc_interrupt_enabled() && stat.coincidence_flag())
            || (stat.mode_2_interrupt_enabled() && self.mode == Mode::ObjectSearch)
            || (stat.mode_1_interrupt_enabled() && self.mode == Mode::VBlank)
            || (stat.mode_0_interrupt_enabled() && self.mode == Mode::HBlank)
    }

    // Edge-triggered: only a low-to-high transition requests an interrupt
    fn update_stat_signal(&mut self, io_registers: &mut IoRegisters) {
        let stat_signal = self.stat_interrupt_line(io_registers);
        if !self.stat_signal && stat_signal {
            io_registers.interrupt_flags().set(InterruptType::LcdStatus);
        }
        self.stat_signal = stat_signal;
    }

    /// Handle a CPU write to LCDC, switching the LCD on or off if bit 7 changed.
    pub fn write_lcdc(&mut self, io_registers: &mut IoRegisters, value: u8) {
        let was_enabled = io_registers.lcdc().lcd_enabled();
        io_registers.write_register(IoRegister::LCDC, value);

        match (was_enabled, io_registers.lcdc().lcd_enabled()) {
            (false, true) => self.lcd_on(io_registers),
            (true, false) => self.lcd_off(io_registers),
            _ => {}
        }
    }

    /// Handle a CPU write to STAT. The mode and coincidence bits are read-only.
    pub fn write_stat(&mut self, io_registers: &mut IoRegisters, value: u8) {
        let stat = io_registers.read_register(IoRegister::STAT);
        io_registers.privileged_set_stat((value & 0x78) | (stat & 0x07));

        if io_registers.lcdc().lcd_enabled() {
            self.update_stat_signal(io_registers);
        }
    }

    /// Handle a CPU write to LYC.
    pub fn write_lyc(&mut self, io_registers: &mut IoRegisters, value: u8) {
        io_registers.write_register(IoRegister::LYC, value);
        self.check_coincidence(io_registers);

        if io_registers.lcdc().lcd_enabled() {
            self.update_stat_signal(io_registers);
        }
    }

    pub fn lcd_on(&mut self, io_registers: &mut IoRegisters) {
        log::debug!("LCD enabled");

        self.ly = 0;
        self.dots = 0;
        io_registers.privileged_set_ly(0);
        self.check_coincidence(io_registers);
        self.set_mode(io_registers, Mode::ObjectSearch);
    }

    pub fn lcd_off(&mut self, io_registers: &mut IoRegisters) {
        log::debug!("LCD disabled");

        self.dots = 0;
        self.stat_signal = false;
        self.mode = Mode::HBlank;

        let stat = io_registers.read_register(IoRegister::STAT);
        io_registers.privileged_set_stat(stat & 0xFC);

        self.frame_buffer = [[0; SCREEN_WIDTH]; SCREEN_HEIGHT];
        self.blank_frame_pending = true;
    }
}

impl Default for PpuState {
    fn default() -> Self {
        Self::new()
    }
}
