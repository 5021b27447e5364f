//! Side effects of CPU writes to the I/O register range

use crate::dma;
use crate::input;
use crate::memory::ioregisters::IoRegister;
use crate::EmulationState;

impl EmulationState {
    pub(crate) fn write_io_register(&mut self, address: u16, value: u8) {
        let Some(register) = IoRegister::from_address(address) else {
            log::trace!("Write to unmapped I/O address {address:04X}: {value:02X}");
            self.address_space.write_address_u8(address, value);
            return;
        };

        log::trace!("{register} <- {value:02X}");

        match register {
            IoRegister::DMA => {
                self.address_space
                    .io_registers_mut()
                    .write_register(IoRegister::DMA, value);
                let cycles = dma::oam_dma_transfer(self, value);
                self.clock.charge(cycles);
            }
            IoRegister::BOOT => {
                self.address_space
                    .io_registers_mut()
                    .write_register(IoRegister::BOOT, 0xFE | value);
                if value & 0x01 != 0 {
                    self.address_space.unmap_boot_rom();
                }
            }
            _ => {
                let io_registers = self.address_space.io_registers_mut();
                match register {
                    IoRegister::JOYP => {
                        input::write_joyp_select(&self.joypad_state, io_registers, value);
                    }
                    IoRegister::SC => self.serial_port.write_control(io_registers, value),
                    IoRegister::DIV => self.timer_counter.reset_divider(io_registers),
                    IoRegister::TAC => io_registers.write_register(IoRegister::TAC, 0xF8 | value),
                    IoRegister::IF => {
                        io_registers.write_register(IoRegister::IF, 0xE0 | (value & 0x1F));
                    }
                    IoRegister::LCDC => self.ppu_state.write_lcdc(io_registers, value),
                    IoRegister::STAT => self.ppu_state.write_stat(io_registers, value),
                    IoRegister::LYC => self.ppu_state.write_lyc(io_registers, value),
                    // Read-only
                    IoRegister::LY => {}
                    _ => io_registers.write_register(register, value),
                }
            }
        }
    }
}
