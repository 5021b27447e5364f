use crate::interrupts::InterruptType;
use crate::memory::ioregisters::{IoRegister, IoRegisters};
use serde::{Deserialize, Serialize};

/// The internal 16-bit divider that both DIV and TIMA are derived from, widened so that it never
/// needs to wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerCounter(u64);

impl TimerCounter {
    pub fn new() -> Self {
        Self(0)
    }

    /// Reset the divider, as happens on any write to DIV.
    pub fn reset_divider(&mut self, io_registers: &mut IoRegisters) {
        self.0 = 0;
        io_registers.privileged_set_div(0x00);
    }
}

impl Default for TimerCounter {
    fn default() -> Self {
        Self::new()
    }
}

// DIV increments every 256 cycles
const DIV_SHIFT: u64 = 8;

fn tima_shift(timer_control: u8) -> u64 {
    match timer_control & 0x03 {
        0x00 => 10, // 1024
        0x01 => 4,  // 16
        0x02 => 6,  // 64
        _ => 8,     // 256
    }
}

/// Advance DIV and TIMA by the given number of cycles, requesting a timer interrupt on each TIMA
/// overflow.
pub fn update_timer_registers(
    io_registers: &mut IoRegisters,
    counter: &mut TimerCounter,
    cycles: u64,
) {
    let old_cycles = counter.0;
    let new_cycles = old_cycles + cycles;
    counter.0 = new_cycles;

    let div_diff = (new_cycles >> DIV_SHIFT) - (old_cycles >> DIV_SHIFT);
    if div_diff != 0 {
        let old_div = io_registers.read_register(IoRegister::DIV);
        io_registers.privileged_set_div(old_div.wrapping_add(div_diff as u8));
    }

    let timer_control = io_registers.read_register(IoRegister::TAC);
    if timer_control & 0x04 == 0 {
        // TIMA updates are disabled
        return;
    }

    let shift = tima_shift(timer_control);
    let tima_diff = (new_cycles >> shift) - (old_cycles >> shift);

    // Generally this loop will only execute 0 or 1 times
    for _ in 0..tima_diff {
        let old_tima = io_registers.read_register(IoRegister::TIMA);
        match old_tima.overflowing_add(1) {
            (new_tima, false) => {
                io_registers.write_register(IoRegister::TIMA, new_tima);
            }
            (_, true) => {
                let timer_modulo = io_registers.read_register(IoRegister::TMA);
                io_registers.write_register(IoRegister::TIMA, timer_modulo);

                io_registers.interrupt_flags().set(InterruptType::Timer);
            }
        }
    }
}
