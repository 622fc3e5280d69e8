//! Cycle-stealing DMA engines.
//!
//! Both engines take over the CPU slot of a tick instead of the instruction
//! engine. The sample engine has priority: while it runs, a sprite transfer in
//! progress is paused and later resumed, with the byte-duplication artifact
//! when the pause landed between a read and its write.
//! [`DmaInteractionLedger`] only records what happened between the two.

mod ledger;
mod sample;
mod sprite;

pub use ledger::{DmaInteractionLedger, InterruptedTransfer, PauseKind};
pub use sample::SampleDma;
pub use sprite::{SpriteDma, SpritePhase};

/// Bus side of a DMA transfer.
///
/// DMA reads are real bus cycles with device side effects, but they are not
/// CPU accesses: they never replace the address audio DMA re-reads.
pub(crate) trait DmaBus {
    fn dma_read(&mut self, addr: u16) -> u8;

    /// Writes through OAMDATA so the destination index auto-increments.
    fn write_oam(&mut self, value: u8);

    /// Address of the CPU's most recent read.
    fn last_cpu_addr(&self) -> u16;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::DmaBus;

    /// Flat memory plus a 256-byte OAM, recording every access in order.
    #[derive(Debug)]
    pub(crate) struct FakeDmaBus {
        pub(crate) mem: Vec<u8>,
        pub(crate) oam: [u8; 256],
        pub(crate) oam_addr: u8,
        pub(crate) reads: Vec<u16>,
        pub(crate) oam_writes: Vec<(u8, u8)>,
        pub(crate) last_cpu_addr: u16,
    }

    impl FakeDmaBus {
        pub(crate) fn new() -> Self {
            Self {
                mem: (0..0x10000).map(|addr| (addr & 0xFF) as u8).collect(),
                oam: [0; 256],
                oam_addr: 0,
                reads: Vec::new(),
                oam_writes: Vec::new(),
                last_cpu_addr: 0,
            }
        }
    }

    impl DmaBus for FakeDmaBus {
        fn dma_read(&mut self, addr: u16) -> u8 {
            self.reads.push(addr);
            self.mem[usize::from(addr)]
        }

        fn write_oam(&mut self, value: u8) {
            self.oam_writes.push((self.oam_addr, value));
            self.oam[usize::from(self.oam_addr)] = value;
            self.oam_addr = self.oam_addr.wrapping_add(1);
        }

        fn last_cpu_addr(&self) -> u16 {
            self.last_cpu_addr
        }
    }
}
