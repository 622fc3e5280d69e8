//! The master tick counter.
//!
//! Every timing coordinate in the core is derived from [`MasterClock`]:
//! scanline and dot come from `counter - frame_origin`, CPU alignment from
//! `counter` alone. Nothing else keeps its own position, so the clock cannot
//! drift from the pipeline.

use crate::config::{DOTS_PER_SCANLINE, TimingProfile};

/// Scanline/dot coordinate of a tick.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// `0..=239` visible, `240` post-render, then vertical blank, and the
    /// last line of the frame is pre-render.
    pub scanline: u16,
    pub dot: u16,
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MasterClock {
    counter: u64,
    frame_origin: u64,
    frame: u64,
}

impl MasterClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks elapsed since power-on.
    #[inline]
    pub fn now(&self) -> u64 {
        self.counter
    }

    /// Tick at which the current frame started.
    #[inline]
    pub fn frame_origin(&self) -> u64 {
        self.frame_origin
    }

    /// Completed frames.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn odd_frame(&self) -> bool {
        self.frame & 1 == 1
    }

    /// Coordinate of the tick about to be processed.
    pub fn position(&self, profile: &TimingProfile) -> Position {
        let offset = self.counter - self.frame_origin;
        debug_assert!(
            offset < profile.frame_ticks(),
            "frame overran its length: {offset} ticks"
        );
        let dots = u64::from(DOTS_PER_SCANLINE);
        Position {
            scanline: (offset / dots) as u16,
            dot: (offset % dots) as u16,
        }
    }

    /// CPU cycles that began before the current tick.
    #[inline]
    pub fn cpu_cycles(&self, profile: &TimingProfile) -> u64 {
        profile.cpu_cycles_before(self.counter)
    }

    /// Whether the current tick hosts a CPU cycle.
    #[inline]
    pub fn is_cpu_tick(&self, profile: &TimingProfile) -> bool {
        profile.is_cpu_tick(self.counter)
    }

    /// Moves to the next tick. `end_of_frame` comes from the pixel pipeline,
    /// which owns the frame length (and the odd-frame skip); the clock only
    /// records where the next frame starts.
    #[inline]
    pub(crate) fn advance(&mut self, end_of_frame: bool) {
        self.counter += 1;
        if end_of_frame {
            self.frame_origin = self.counter;
            self.frame += 1;
        }
    }
}
