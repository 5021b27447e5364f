use crate::memory::address;

// Bytes copied by one OAM DMA transfer, one per cycle
pub const OAM_DMA_LEN: u16 = 0xA0;
pub const OAM_DMA_CYCLES: u64 = 160;

/// Byte-level access to the full 16-bit address space, as seen by the DMA engine.
pub trait DmaBus {
    fn read_byte(&self, address: u16) -> u8;

    fn write_byte(&mut self, address: u16, value: u8);
}

/// Copy 160 bytes from `source_page << 8` into OAM. Reads go through the bus, so ROM banking and
/// the boot overlay apply to the source. Returns the number of cycles the transfer takes.
pub fn oam_dma_transfer<B: DmaBus + ?Sized>(bus: &mut B, source_page: u8) -> u64 {
    let source_address = u16::from(source_page) << 8;
    log::trace!("OAM DMA transfer from {source_address:04X}");

    for offset in 0..OAM_DMA_LEN {
        let byte = bus.read_byte(source_address.wrapping_add(offset));
        bus.write_byte(address::OAM_START + offset, byte);
    }

    OAM_DMA_CYCLES
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatBus(Vec<u8>);

    impl DmaBus for FlatBus {
        fn read_byte(&self, address: u16) -> u8 {
            self.0[usize::from(address)]
        }

        fn write_byte(&mut self, address: u16, value: u8) {
            self.0[usize::from(address)] = value;
        }
    }

    #[test]
    fn copies_page_into_oam() {
        let mut bus = FlatBus(vec![0; 0x10000]);
        for i in 0..0x100 {
            bus.0[0xC100 + i] = i as u8;
        }

        let cycles = oam_dma_transfer(&mut bus, 0xC1);

        assert_eq!(160, cycles);
        for i in 0..0xA0 {
            assert_eq!(i as u8, bus.0[0xFE00 + i]);
        }
        // The byte after OAM is not touched
        assert_eq!(0, bus.0[0xFEA0]);
    }
}
