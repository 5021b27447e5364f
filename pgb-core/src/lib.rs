mod clock;
mod config;
mod dispatch;
mod dma;
mod input;
mod interrupts;
mod memory;
mod ppu;
mod serial;
mod serialize;
mod timer;


use crate::dma::DmaBus;
use crate::interrupts::InterruptFlags;
use crate::memory::ioregisters::{IoRegister, IoRegisters};
use crate::memory::AddressSpace;
use crate::ppu::PpuState;
use crate::serial::SerialPort;
use crate::timer::TimerCounter;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use clock::Clock;
pub use config::{ColorScheme, CoreConfig};
pub use input::JoypadState;
pub use interrupts::InterruptType;
pub use memory::cartridge::{Cartridge, CartridgeLoadError, CartridgeMetadata, SaveDataError};
pub use memory::{MapperFeatures, MapperType};
pub use ppu::{FrameBuffer, FrameSink, Mode, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use serialize::{determine_save_state_path, SaveStateError};

/// The memory and video subsystem of the console: the bus, the cartridge, and every device
/// that is driven by I/O register writes or by the passage of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulationState {
    address_space: AddressSpace,
    ppu_state: PpuState,
    timer_counter: TimerCounter,
    serial_port: SerialPort,
    joypad_state: JoypadState,
    clock: Clock,
    #[serde(skip)]
    config: CoreConfig,
}

impl EmulationState {
    /// Power on with the given cartridge inserted.
    pub fn new(cartridge: Cartridge, config: CoreConfig) -> Self {
        Self::create(Some(cartridge), config)
    }

    /// Power on with an empty cartridge slot. ROM and cartridge RAM read as 0xFF.
    pub fn without_cartridge(config: CoreConfig) -> Self {
        Self::create(None, config)
    }

    fn create(cartridge: Option<Cartridge>, config: CoreConfig) -> Self {
        let mut state = Self {
            address_space: AddressSpace::new(cartridge, config.boot_rom.clone()),
            ppu_state: PpuState::new(),
            timer_counter: TimerCounter::new(),
            serial_port: SerialPort::new(),
            joypad_state: JoypadState::new(),
            clock: Clock::new(),
            config,
        };
        state.reset();
        state
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        self.address_space.read_address_u8(address)
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        match address {
            memory::address::IO_REGISTERS_START..=memory::address::IO_REGISTERS_END => {
                self.write_io_register(address, value);
            }
            _ => self.address_space.write_address_u8(address, value),
        }
    }

    /// Advance the timer and picture state machine by the given number of cycles, plus any
    /// cycles charged since the last step.
    pub fn step<S: FrameSink>(&mut self, cycles: u32, sink: &mut S) {
        let cycles = self.clock.advance(u64::from(cycles));

        timer::update_timer_registers(
            self.address_space.io_registers_mut(),
            &mut self.timer_counter,
            cycles,
        );

        let (io_registers, vram, oam) = self.address_space.ppu_fields();
        self.ppu_state.tick(io_registers, vram, oam, cycles, sink);
    }

    /// Return every device to its power-on state, keeping the cartridge (and its RAM contents)
    /// and the configuration.
    pub fn reset(&mut self) {
        log::info!("Resetting");

        self.address_space.reset();
        self.ppu_state = PpuState::new();
        self.timer_counter = TimerCounter::new();
        self.serial_port = SerialPort::new();
        self.clock = Clock::new();

        if self.address_space.boot_rom_mapped() {
            // Start from a blank register bank and let every register's write path establish its
            // own fixed bits
            self.address_space.replace_io_registers(IoRegisters::zeroed());
            for register in IoRegister::ALL {
                if register != IoRegister::DMA {
                    self.write_io_register(register.to_address(), 0x00);
                }
            }
        } else {
            self.address_space.replace_io_registers(IoRegisters::new());
            let io_registers = self.address_space.io_registers_mut();
            if io_registers.lcdc().lcd_enabled() {
                self.ppu_state.lcd_on(io_registers);
            }
        }

        input::update_joyp_register(&self.joypad_state, self.address_space.io_registers_mut());
    }

    /// Validate and insert a new cartridge, then reset. On error the current cartridge and all
    /// other state are left untouched.
    pub fn load_cartridge(&mut self, rom: Vec<u8>) -> Result<(), CartridgeLoadError> {
        let cartridge = Cartridge::new(rom)?;
        self.address_space.replace_cartridge(cartridge);
        self.reset();

        Ok(())
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.address_space.cartridge()
    }

    pub fn cartridge_metadata(&self) -> Option<&CartridgeMetadata> {
        self.cartridge().map(Cartridge::metadata)
    }

    pub fn export_save_data(&self) -> Result<&[u8], SaveDataError> {
        self.cartridge()
            .ok_or(SaveDataError::NoRam)
            .and_then(Cartridge::export_save_data)
    }

    pub fn import_save_data(&mut self, data: &[u8]) -> Result<(), SaveDataError> {
        self.address_space
            .cartridge_mut()
            .ok_or(SaveDataError::NoRam)
            .and_then(|cartridge| cartridge.import_save_data(data))
    }

    /// Set an interrupt request flag in IF.
    pub fn request_interrupt(&mut self, interrupt_type: InterruptType) {
        self.address_space
            .io_registers_mut()
            .interrupt_flags()
            .set(interrupt_type);
    }

    /// Clear an interrupt request flag in IF, as the CPU does when servicing it.
    pub fn acknowledge_interrupt(&mut self, interrupt_type: InterruptType) {
        self.address_space
            .io_registers_mut()
            .interrupt_flags()
            .clear(interrupt_type);
    }

    pub fn interrupt_flags(&self) -> u8 {
        self.address_space
            .io_registers()
            .read_register(IoRegister::IF)
    }

    pub fn interrupt_enable(&self) -> u8 {
        self.address_space.ie_register()
    }

    /// The highest priority interrupt that is both requested and enabled, if any.
    pub fn pending_interrupt(&self) -> Option<InterruptType> {
        let mut flags = self.interrupt_flags();
        InterruptFlags(&mut flags).highest_priority_interrupt(self.interrupt_enable())
    }

    pub fn joypad_state(&self) -> JoypadState {
        self.joypad_state
    }

    pub fn set_joypad_state(&mut self, joypad_state: JoypadState) {
        self.joypad_state = joypad_state;
        input::update_joyp_register(&self.joypad_state, self.address_space.io_registers_mut());
    }

    /// Bytes sent out of the serial port that the host has not yet drained.
    pub fn serial_output(&self) -> &[u8] {
        self.serial_port.sent_bytes()
    }

    /// Remove and return everything in the serial output log.
    pub fn take_serial_output(&mut self) -> Vec<u8> {
        self.serial_port.take_sent_bytes()
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        self.ppu_state.frame_buffer()
    }

    pub fn ppu_mode(&self) -> Mode {
        self.ppu_state.mode()
    }

    pub fn ly(&self) -> u8 {
        self.ppu_state.ly()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn boot_rom_mapped(&self) -> bool {
        self.address_space.boot_rom_mapped()
    }

    pub fn save_state_bytes(&self) -> Result<Vec<u8>, SaveStateError> {
        serialize::save_state_bytes(self)
    }

    /// Replace this state with one produced by [`Self::save_state_bytes`]. On error nothing is
    /// changed.
    pub fn load_state_bytes(&mut self, bytes: &[u8]) -> Result<(), SaveStateError> {
        serialize::load_state_bytes(self, bytes)
    }

    pub fn save_state<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveStateError> {
        serialize::save_state(self, path)
    }

    pub fn load_state<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SaveStateError> {
        serialize::load_state(self, path)
    }
}

impl DmaBus for EmulationState {
    fn read_byte(&self, address: u16) -> u8 {
        EmulationState::read_byte(self, address)
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        EmulationState::write_byte(self, address, value);
    }
}
