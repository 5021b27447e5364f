use serde::{Deserialize, Serialize};

/// Cycle accounting for the whole core. Work charged outside of a step, such as an OAM DMA
/// transfer, is added to the running total immediately and handed to the timer and PPU at the
/// start of the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Clock {
    elapsed: u64,
    pending: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total cycles since power-on or the last reset, including charged work.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Charged cycles that the devices have not yet been advanced by.
    pub fn pending(&self) -> u64 {
        self.pending
    }

    pub(crate) fn charge(&mut self, cycles: u64) {
        self.elapsed += cycles;
        self.pending += cycles;
    }

    /// Account for a step of the given length and return how far the devices should advance.
    pub(crate) fn advance(&mut self, cycles: u64) -> u64 {
        self.elapsed += cycles;
        cycles + std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charged_cycles_are_drained_once() {
        let mut clock = Clock::new();

        clock.charge(160);
        assert_eq!(160, clock.elapsed());
        assert_eq!(160, clock.pending());

        assert_eq!(164, clock.advance(4));
        assert_eq!(164, clock.elapsed());
        assert_eq!(0, clock.pending());

        assert_eq!(4, clock.advance(4));
        assert_eq!(168, clock.elapsed());
    }
}
