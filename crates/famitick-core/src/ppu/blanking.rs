//! Vertical-blank flag as timestamps.
//!
//! The pipeline records when the flag is set and cleared by timing, the CPU
//! records when it read `$2002`; whether the flag is visible at any tick is
//! derived from those three numbers. Nothing stores the flag as a boolean, so
//! a read that lands on the same tick as the set has exactly one answer,
//! given by [`read_races_set`].

/// Whether a status read at tick `read` cancels a set at tick `set`.
///
/// A read on the set tick sees the flag clear and suppresses it for the
/// frame; reads after the set consume it. Earlier reads have no effect.
#[inline]
pub(crate) const fn read_races_set(read: u64, set: u64) -> bool {
    read >= set
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlankingLedger {
    last_set: Option<u64>,
    last_cleared: Option<u64>,
    last_read: Option<u64>,
}

impl BlankingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, now: u64) {
        self.last_set = Some(now);
    }

    pub(crate) fn clear(&mut self, now: u64) {
        self.last_cleared = Some(now);
    }

    /// Flag value as seen at `now` without reading it.
    pub fn visible(&self, now: u64) -> bool {
        let Some(set) = self.last_set else {
            return false;
        };
        if set > now {
            return false;
        }
        let cleared = self.last_cleared.is_some_and(|t| t >= set && t <= now);
        let consumed = self
            .last_read
            .is_some_and(|t| t <= now && read_races_set(t, set));
        !(cleared || consumed)
    }

    /// `$2002` bit 7. Always recorded, even when it returns clear.
    pub(crate) fn read(&mut self, now: u64) -> bool {
        let value = self.visible(now) && self.last_set != Some(now);
        self.last_read = Some(now);
        value
    }

    /// NMI output of the pixel pipeline.
    #[inline]
    pub fn nmi_line(&self, now: u64, nmi_enabled: bool) -> bool {
        nmi_enabled && self.visible(now)
    }

    pub fn last_set(&self) -> Option<u64> {
        self.last_set
    }

    pub fn last_cleared(&self) -> Option<u64> {
        self.last_cleared
    }

    pub fn last_read(&self) -> Option<u64> {
        self.last_read
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn consecutive_reads_see_set_then_clear() {
        let mut ledger = BlankingLedger::new();
        ledger.set(100);
        assert!(ledger.read(105));
        assert!(!ledger.read(106));
    }

    #[test]
    fn same_tick_read_returns_clear_and_suppresses() {
        let mut ledger = BlankingLedger::new();
        ledger.set(100);
        assert!(!ledger.read(100));
        assert_eq!(ledger.last_read(), Some(100));
        assert!(!ledger.nmi_line(101, true));
    }

    #[test]
    fn read_one_tick_early_leaves_the_set_visible() {
        let mut ledger = BlankingLedger::new();
        assert!(!ledger.read(99));
        ledger.set(100);
        assert!(ledger.visible(100));
        assert!(ledger.visible(105));
        assert!(ledger.nmi_line(105, true));
        assert!(ledger.read(105));
    }

    #[test]
    fn timing_clear_ends_visibility() {
        let mut ledger = BlankingLedger::new();
        ledger.set(100);
        ledger.clear(200);
        assert!(ledger.visible(199));
        assert!(!ledger.visible(200));
        // A new frame's set supersedes the old clear.
        ledger.set(300);
        assert!(ledger.visible(300));
    }

    #[test]
    fn nmi_line_needs_enable() {
        let mut ledger = BlankingLedger::new();
        ledger.set(10);
        assert!(ledger.nmi_line(11, true));
        assert!(!ledger.nmi_line(11, false));
    }

    proptest! {
        #[test]
        fn reads_before_the_set_never_matter(
            set in 1u64..1_000_000,
            early in 1u64..1_000,
            later in 0u64..1_000,
        ) {
            let mut ledger = BlankingLedger::new();
            let read_at = set.saturating_sub(early);
            prop_assume!(read_at < set);
            ledger.read(read_at);
            ledger.set(set);
            prop_assert!(ledger.visible(set + later));
        }

        #[test]
        fn any_read_at_or_after_the_set_consumes_it(
            set in 1u64..1_000_000,
            delay in 0u64..1_000,
            after in 0u64..1_000,
        ) {
            let mut ledger = BlankingLedger::new();
            ledger.set(set);
            let first = ledger.read(set + delay);
            prop_assert_eq!(first, delay != 0);
            prop_assert!(!ledger.read(set + delay + after));
            prop_assert!(!ledger.visible(set + delay + after));
        }

        #[test]
        fn visibility_is_monotonic_until_cleared(
            set in 0u64..1_000,
            probe in 0u64..1_000,
        ) {
            let mut ledger = BlankingLedger::new();
            ledger.set(set);
            prop_assert_eq!(ledger.visible(probe), probe >= set);
        }
    }
}
