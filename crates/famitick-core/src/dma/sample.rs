//! Single-byte audio sample fetch.
//!
//! Four CPU slots: three idle, then the fetch. On NTSC the idle slots repeat
//! the CPU's previous bus read, so read side effects of `$2002`, `$2007` and
//! the controller ports happen again. PAL idles without touching the bus.

use tracing::trace;

use super::DmaBus;

const SAMPLE_DMA_TICKS: u8 = 4;

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SampleDma {
    addr: u16,
    remaining: u8,
}

impl SampleDma {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn start(&mut self, addr: u16) {
        self.addr = addr;
        self.remaining = SAMPLE_DMA_TICKS;
        trace!(addr, "sample dma started");
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.remaining > 0
    }

    /// Address being fetched.
    pub fn addr(&self) -> u16 {
        self.addr
    }

    /// Runs one CPU slot. Returns the sample byte on the final slot.
    pub(crate) fn step<B: DmaBus>(&mut self, bus: &mut B, reread: bool) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.remaining > 0 {
            if reread {
                let addr = bus.last_cpu_addr();
                bus.dma_read(addr);
            }
            return None;
        }
        let byte = bus.dma_read(self.addr);
        trace!(addr = self.addr, byte, "sample dma finished");
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::fake::FakeDmaBus;

    #[test]
    fn ntsc_idle_slots_repeat_the_cpu_read() {
        let mut bus = FakeDmaBus::new();
        bus.last_cpu_addr = 0x2002;
        let mut dma = SampleDma::new();
        dma.start(0xC123);

        let results: Vec<Option<u8>> = (0..4).map(|_| dma.step(&mut bus, true)).collect();
        assert_eq!(results, vec![None, None, None, Some(0x23)]);
        assert_eq!(bus.reads, vec![0x2002, 0x2002, 0x2002, 0xC123]);
        assert!(!dma.active());
    }

    #[test]
    fn pal_idles_without_bus_traffic() {
        let mut bus = FakeDmaBus::new();
        let mut dma = SampleDma::new();
        dma.start(0xC000);
        for _ in 0..3 {
            assert_eq!(dma.step(&mut bus, false), None);
        }
        assert!(bus.reads.is_empty());
        assert_eq!(dma.step(&mut bus, false), Some(0x00));
        assert_eq!(dma.step(&mut bus, false), None);
        assert_eq!(bus.reads, vec![0xC000]);
    }
}
