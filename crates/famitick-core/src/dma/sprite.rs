//! Sprite-memory bulk transfer triggered by `$4014`.
//!
//! One or two alignment ticks, then 256 read/write pairs from
//! `page << 8` into OAMDATA. A pause between a read and its write makes the
//! held byte land twice on resume.

use tracing::trace;

use super::{DmaBus, PauseKind};

const TRANSFER_LEN: u16 = 256;

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpritePhase {
    #[default]
    Idle,
    Aligning,
    /// Next tick reads the source byte.
    Reading,
    /// Next tick writes the held byte.
    Writing,
    /// Paused with a byte read but not yet written.
    PausedDuringRead,
    /// Paused after a write, before the next read.
    PausedDuringWrite,
    /// Next tick writes the held byte an extra time.
    ResumingWithDuplication,
    /// Next tick reads, as if never paused.
    ResumingNormal,
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpriteDma {
    phase: SpritePhase,
    /// Ticks consumed by the current (or last) transfer.
    ticks: u16,
    page: u8,
    /// Source offset of the next read.
    offset: u16,
    scratch: u8,
    align_remaining: u8,
}

impl SpriteDma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches a transfer from `page`. `cpu_cycle` is the CPU cycle of the
    /// `$4014` write; an odd cycle costs one more alignment tick.
    pub(crate) fn start(&mut self, page: u8, cpu_cycle: u64) {
        let align = 1 + (cpu_cycle & 1) as u8;
        *self = Self {
            phase: SpritePhase::Aligning,
            ticks: 0,
            page,
            offset: 0,
            scratch: 0,
            align_remaining: align,
        };
        trace!(page, align, "sprite dma started");
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.phase != SpritePhase::Idle
    }

    #[inline]
    pub fn paused(&self) -> bool {
        matches!(
            self.phase,
            SpritePhase::PausedDuringRead | SpritePhase::PausedDuringWrite
        )
    }

    pub fn phase(&self) -> SpritePhase {
        self.phase
    }

    pub fn ticks(&self) -> u16 {
        self.ticks
    }

    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// Byte read but not yet written.
    pub fn scratch(&self) -> u8 {
        self.scratch
    }

    /// Runs one CPU slot of the transfer. Idle and paused engines do nothing.
    pub(crate) fn step<B: DmaBus>(&mut self, bus: &mut B) {
        let next = match self.phase {
            SpritePhase::Idle | SpritePhase::PausedDuringRead | SpritePhase::PausedDuringWrite => {
                return;
            }
            SpritePhase::Aligning => {
                self.align_remaining = self.align_remaining.saturating_sub(1);
                if self.align_remaining == 0 {
                    SpritePhase::Reading
                } else {
                    SpritePhase::Aligning
                }
            }
            SpritePhase::Reading | SpritePhase::ResumingNormal => {
                let addr = (u16::from(self.page) << 8) | self.offset;
                self.scratch = bus.dma_read(addr);
                self.offset += 1;
                SpritePhase::Writing
            }
            SpritePhase::ResumingWithDuplication => {
                bus.write_oam(self.scratch);
                SpritePhase::Writing
            }
            SpritePhase::Writing => {
                bus.write_oam(self.scratch);
                if self.offset >= TRANSFER_LEN {
                    SpritePhase::Idle
                } else {
                    SpritePhase::Reading
                }
            }
        };
        self.ticks += 1;
        self.phase = next;
        if next == SpritePhase::Idle {
            trace!(page = self.page, ticks = self.ticks, "sprite dma finished");
        }
    }

    /// Gives the slot to sample DMA. Returns what the transfer was doing, or
    /// `None` when there is no data transfer to interrupt.
    pub(crate) fn pause(&mut self) -> Option<PauseKind> {
        let (phase, kind) = match self.phase {
            SpritePhase::Writing | SpritePhase::ResumingWithDuplication => {
                (SpritePhase::PausedDuringRead, PauseKind::DuringRead)
            }
            SpritePhase::Reading | SpritePhase::ResumingNormal => {
                (SpritePhase::PausedDuringWrite, PauseKind::DuringWrite)
            }
            _ => return None,
        };
        self.phase = phase;
        trace!(?kind, offset = self.offset, "sprite dma paused");
        Some(kind)
    }

    /// Returns `true` when a paused transfer was resumed.
    pub(crate) fn resume(&mut self) -> bool {
        self.phase = match self.phase {
            SpritePhase::PausedDuringRead => SpritePhase::ResumingWithDuplication,
            SpritePhase::PausedDuringWrite => SpritePhase::ResumingNormal,
            _ => return false,
        };
        trace!(phase = ?self.phase, "sprite dma resumed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::fake::FakeDmaBus;

    fn run_to_end(dma: &mut SpriteDma, bus: &mut FakeDmaBus) {
        while dma.active() {
            dma.step(bus);
        }
    }

    /// Steps until `offset` bytes have been read and the engine is about to
    /// do `phase`.
    fn run_until(dma: &mut SpriteDma, bus: &mut FakeDmaBus, offset: u16, phase: SpritePhase) {
        while !(dma.offset() == offset && dma.phase() == phase) {
            dma.step(bus);
        }
    }

    #[test]
    fn even_trigger_takes_513_ticks() {
        let mut bus = FakeDmaBus::new();
        bus.oam_addr = 0x10;
        let mut dma = SpriteDma::new();
        dma.start(0x02, 100);
        run_to_end(&mut dma, &mut bus);

        assert_eq!(dma.ticks(), 513);
        let expected: Vec<u16> = (0x0200..=0x02FF).collect();
        assert_eq!(bus.reads, expected);
        // Starts at the pre-trigger OAMADDR and wraps.
        assert_eq!(bus.oam_writes[0], (0x10, 0x00));
        assert_eq!(bus.oam_writes[255], (0x0F, 0xFF));
        assert_eq!(bus.oam_addr, 0x10);
    }

    #[test]
    fn odd_trigger_takes_514_ticks() {
        let mut bus = FakeDmaBus::new();
        let mut dma = SpriteDma::new();
        dma.start(0x03, 101);
        dma.step(&mut bus);
        assert_eq!(dma.phase(), SpritePhase::Aligning);
        run_to_end(&mut dma, &mut bus);
        assert_eq!(dma.ticks(), 514);
        assert_eq!(bus.oam_writes.len(), 256);
    }

    #[test]
    fn pause_between_read_and_write_duplicates_the_held_byte() {
        let mut bus = FakeDmaBus::new();
        let mut dma = SpriteDma::new();
        dma.start(0x02, 0);
        run_until(&mut dma, &mut bus, 10, SpritePhase::Writing);

        assert_eq!(dma.pause(), Some(PauseKind::DuringRead));
        assert!(dma.paused());
        assert!(dma.active());
        assert_eq!(dma.scratch(), 9);
        // A paused engine does nothing with its slot.
        dma.step(&mut bus);
        assert_eq!(bus.oam_writes.len(), 9);

        assert!(dma.resume());
        assert!(!dma.paused());
        assert_eq!(dma.phase(), SpritePhase::ResumingWithDuplication);
        dma.step(&mut bus);
        dma.step(&mut bus);
        assert_eq!(dma.offset(), 10, "source offset advanced once");
        assert_eq!(&bus.oam_writes[9..11], &[(9, 9), (10, 9)]);

        run_to_end(&mut dma, &mut bus);
        assert_eq!(bus.reads.len(), 256);
        assert_eq!(bus.oam_writes.len(), 257);
        assert_eq!(dma.ticks(), 514);
        assert_eq!(bus.oam[11], 10);
        assert_eq!(bus.oam[0], 0xFF, "last byte wraps onto the first index");
    }

    #[test]
    fn pause_between_write_and_read_resumes_cleanly() {
        let mut bus = FakeDmaBus::new();
        let mut dma = SpriteDma::new();
        dma.start(0x02, 0);
        run_until(&mut dma, &mut bus, 10, SpritePhase::Reading);

        assert_eq!(dma.pause(), Some(PauseKind::DuringWrite));
        assert!(dma.paused());
        assert!(dma.resume());
        assert_eq!(dma.phase(), SpritePhase::ResumingNormal);
        run_to_end(&mut dma, &mut bus);

        assert_eq!(bus.oam_writes.len(), 256);
        let expected: Vec<u8> = (0..=255).collect();
        assert_eq!(bus.oam.to_vec(), expected);
    }

    #[test]
    fn alignment_cannot_be_paused() {
        let mut dma = SpriteDma::new();
        dma.start(0x02, 1);
        assert_eq!(dma.pause(), None);
        assert!(!dma.paused());
        assert!(!dma.resume());
        assert_eq!(SpriteDma::new().pause(), None);
    }
}
