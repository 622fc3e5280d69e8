//! Timestamps of how the two DMA engines interleaved.
//!
//! The ledger owns no transfer logic. The console records into it when sample
//! DMA starts and finishes and when it pauses or resumes a sprite transfer;
//! the "is X active" queries are derived from those timestamps.

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseKind {
    /// A byte had been read and was waiting to be written.
    DuringRead,
    /// The last write completed; the next read had not started.
    DuringWrite,
}

/// Sprite transfer state captured at the moment sample DMA took over.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterruptedTransfer {
    /// Held byte (meaningful for [`PauseKind::DuringRead`]).
    pub byte: u8,
    /// OAM index the next write targets.
    pub dest: u8,
    pub kind: PauseKind,
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DmaInteractionLedger {
    sample_started: Option<u64>,
    sample_finished: Option<u64>,
    sprite_paused: Option<u64>,
    sprite_resumed: Option<u64>,
    interrupted: Option<InterruptedTransfer>,
}

/// `start` happened at or before `now` and no `end` followed it yet.
fn open_interval(start: Option<u64>, end: Option<u64>, now: u64) -> bool {
    match start {
        Some(start) if start <= now => !end.is_some_and(|end| end >= start && end <= now),
        _ => false,
    }
}

impl DmaInteractionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_sample_start(&mut self, now: u64) {
        self.sample_started = Some(now);
    }

    pub(crate) fn record_sample_finish(&mut self, now: u64) {
        self.sample_finished = Some(now);
    }

    pub(crate) fn record_pause(&mut self, now: u64, transfer: InterruptedTransfer) {
        self.sprite_paused = Some(now);
        self.interrupted = Some(transfer);
    }

    pub(crate) fn record_resume(&mut self, now: u64) {
        self.sprite_resumed = Some(now);
    }

    /// Whether a sample fetch was pending or in flight at `now`.
    pub fn sample_active(&self, now: u64) -> bool {
        open_interval(self.sample_started, self.sample_finished, now)
    }

    /// Whether a sprite transfer was held off by sample DMA at `now`.
    pub fn sprite_paused(&self, now: u64) -> bool {
        open_interval(self.sprite_paused, self.sprite_resumed, now)
    }

    pub fn sample_started(&self) -> Option<u64> {
        self.sample_started
    }

    pub fn sample_finished(&self) -> Option<u64> {
        self.sample_finished
    }

    pub fn sprite_paused_at(&self) -> Option<u64> {
        self.sprite_paused
    }

    pub fn sprite_resumed_at(&self) -> Option<u64> {
        self.sprite_resumed
    }

    /// The most recent interrupted sprite transfer.
    pub fn interrupted(&self) -> Option<InterruptedTransfer> {
        self.interrupted
    }
}
