use crate::interrupts::InterruptType;
use crate::memory::ioregisters::{IoRegister, IoRegisters};
use serde::{Deserialize, Serialize};

/// Current pressed state of every button, as supplied by the input polling collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoypadState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub a: bool,
    pub b: bool,
    pub start: bool,
    pub select: bool,
}

impl JoypadState {
    pub fn new() -> Self {
        Self::default()
    }
}

fn should_flag_interrupt(old_joyp: u8, new_joyp: u8) -> bool {
    [0x01, 0x02, 0x04, 0x08]
        .into_iter()
        .any(|bit| old_joyp & bit != 0 && new_joyp & bit == 0)
}

/// Update the contents of the JOYP hardware register based on the current joypad state, and request
/// a joypad interrupt if any selected buttons have been pressed.
///
/// This needs to be called whenever either the select bits or the joypad state change, because the
/// same register bits are used for both directions and button presses.
pub fn update_joyp_register(joypad_state: &JoypadState, io_registers: &mut IoRegisters) {
    let joyp = io_registers.read_register(IoRegister::JOYP);
    let actions_select = joyp & 0x20 == 0;
    let directions_select = joyp & 0x10 == 0;

    let bit_3 =
        !((actions_select && joypad_state.start) || (directions_select && joypad_state.down));
    let bit_2 =
        !((actions_select && joypad_state.select) || (directions_select && joypad_state.up));
    let bit_1 = !((actions_select && joypad_state.b) || (directions_select && joypad_state.left));
    let bit_0 = !((actions_select && joypad_state.a) || (directions_select && joypad_state.right));

    let new_joyp = (joyp & 0x30)
        | (u8::from(bit_3) << 3)
        | (u8::from(bit_2) << 2)
        | (u8::from(bit_1) << 1)
        | u8::from(bit_0);
    io_registers.privileged_set_joyp(new_joyp);

    if should_flag_interrupt(joyp, new_joyp) {
        io_registers.interrupt_flags().set(InterruptType::Joypad);
    }
}

/// Handle a CPU write to JOYP; only the select bits are writable.
pub fn write_joyp_select(
    joypad_state: &JoypadState,
    io_registers: &mut IoRegisters,
    value: u8,
) {
    let joyp = io_registers.read_register(IoRegister::JOYP);
    io_registers.privileged_set_joyp((joyp & 0x0F) | (value & 0x30));
    update_joyp_register(joypad_state, io_registers);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_lines() {
        let mut io_registers = IoRegisters::zeroed();
        let joypad_state = JoypadState {
            a: true,
            down: true,
            ..JoypadState::default()
        };

        // Actions selected
        write_joyp_select(&joypad_state, &mut io_registers, 0x10);
        assert_eq!(0xDE, io_registers.read_register(IoRegister::JOYP));

        // Directions selected
        write_joyp_select(&joypad_state, &mut io_registers, 0x20);
        assert_eq!(0xE7, io_registers.read_register(IoRegister::JOYP));

        // Nothing selected
        write_joyp_select(&joypad_state, &mut io_registers, 0x30);
        assert_eq!(0xFF, io_registers.read_register(IoRegister::JOYP));
    }

    #[test]
    fn press_requests_interrupt() {
        let mut io_registers = IoRegisters::zeroed();
        let mut joypad_state = JoypadState::new();

        write_joyp_select(&joypad_state, &mut io_registers, 0x10);
        assert!(!io_registers.interrupt_flags().get(InterruptType::Joypad));

        joypad_state.start = true;
        update_joyp_register(&joypad_state, &mut io_registers);
        assert!(io_registers.interrupt_flags().get(InterruptType::Joypad));

        // Unselected lines never request an interrupt
        let mut io_registers = IoRegisters::zeroed();
        let mut joypad_state = JoypadState::new();
        write_joyp_select(&joypad_state, &mut io_registers, 0x20);
        joypad_state.start = true;
        update_joyp_register(&joypad_state, &mut io_registers);
        assert!(!io_registers.interrupt_flags().get(InterruptType::Joypad));
    }
}
