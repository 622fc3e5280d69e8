//! Per-region timing constants.
//!
//! Everything the clock, pipeline and DMA engines need to know about a region
//! lives here, so the rest of the core never branches on [`Region`] directly.

use super::Region;
use crate::error::Error;

/// Dots per scanline, identical for every supported region.
pub const DOTS_PER_SCANLINE: u16 = 341;
/// Scanline on which the blanking flag is raised.
pub const VBLANK_SET_LINE: u16 = 241;

/// DMC output period in CPU cycles, indexed by the `$4010` rate bits.
const NTSC_DMC_RATES: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];
const PAL_DMC_RATES: [u16; 16] = [
    398, 354, 316, 298, 276, 236, 210, 198, 176, 148, 132, 118, 98, 78, 66, 50,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimingProfile {
    pub region: Region,
    /// Master oscillator cycles per pixel-pipeline dot.
    pub master_per_dot: u64,
    /// Master oscillator cycles per CPU cycle.
    pub master_per_cpu: u64,
    /// Scanlines per frame, pre-render line included.
    pub scanlines: u16,
    /// Whether odd frames drop one dot while rendering is enabled.
    pub odd_frame_skip: bool,
    /// Whether audio DMA idle cycles re-read the CPU's previous bus address.
    pub sample_dma_reread: bool,
    pub dmc_rates: &'static [u16; 16],
}

impl TimingProfile {
    pub const NTSC: TimingProfile = TimingProfile {
        region: Region::Ntsc,
        master_per_dot: 4,
        master_per_cpu: 12,
        scanlines: 262,
        odd_frame_skip: true,
        sample_dma_reread: true,
        dmc_rates: &NTSC_DMC_RATES,
    };

    pub const PAL: TimingProfile = TimingProfile {
        region: Region::Pal,
        master_per_dot: 5,
        master_per_cpu: 16,
        scanlines: 312,
        odd_frame_skip: false,
        sample_dma_reread: false,
        dmc_rates: &PAL_DMC_RATES,
    };

    /// Resolves the profile for `region`, rejecting regions without one.
    pub fn for_region(region: Region) -> Result<Self, Error> {
        match region {
            Region::Ntsc => Ok(Self::NTSC),
            Region::Pal => Ok(Self::PAL),
            Region::Dendy => Err(Error::UnsupportedRegion(region)),
        }
    }

    /// Index of the pre-render line (always the last line of the frame).
    #[inline]
    pub const fn prerender_line(&self) -> u16 {
        self.scanlines - 1
    }

    /// Ticks in a frame without the odd-frame skip.
    #[inline]
    pub const fn frame_ticks(&self) -> u64 {
        self.scanlines as u64 * DOTS_PER_SCANLINE as u64
    }

    /// Number of CPU cycles that began strictly before tick `counter`.
    ///
    /// Tick `n` hosts a CPU cycle when a CPU cycle boundary falls inside
    /// `[(n + 1) * dot, (n + 2) * dot)` in master cycles, which puts the CPU
    /// after the second dot of every NTSC trio.
    #[inline]
    pub const fn cpu_cycles_before(&self, counter: u64) -> u64 {
        (counter + 1) * self.master_per_dot / self.master_per_cpu
    }

    /// Returns `true` when tick `counter` hosts a CPU cycle.
    #[inline]
    pub const fn is_cpu_tick(&self, counter: u64) -> bool {
        self.cpu_cycles_before(counter + 1) != self.cpu_cycles_before(counter)
    }
}
