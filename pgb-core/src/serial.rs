use crate::interrupts::InterruptType;
use crate::memory::ioregisters::{IoRegister, IoRegisters};
use serde::{Deserialize, Serialize};

/// The serial port with nothing plugged into it. Transfers using the internal clock complete
/// instantly; every byte sent is kept in a log until the host drains it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerialPort {
    sent_bytes: Vec<u8>,
}

impl SerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes transferred out since power-on, reset, or the last [`Self::take_sent_bytes`].
    pub fn sent_bytes(&self) -> &[u8] {
        &self.sent_bytes
    }

    pub fn take_sent_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.sent_bytes)
    }

    /// Handle a CPU write to SC.
    pub fn write_control(&mut self, io_registers: &mut IoRegisters, value: u8) {
        // Bit 7 = transfer start, bit 0 = internal clock
        if value & 0x81 != 0x81 {
            io_registers.write_register(IoRegister::SC, 0x7E | value);
            return;
        }

        let byte = io_registers.read_register(IoRegister::SB);
        log::trace!("Serial transfer out: {byte:02X}");
        self.sent_bytes.push(byte);

        // No link partner, so all 1s shift in
        io_registers.write_register(IoRegister::SB, 0xFF);
        io_registers.write_register(IoRegister::SC, 0x7E | (value & 0x7F));
        io_registers.interrupt_flags().set(InterruptType::Serial);
    }
}
