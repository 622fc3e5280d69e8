//! Background shift registers and the tile fetch latches that feed them.

/// 16-bit shifter: the high byte is on screen, the low byte holds the next
/// tile.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct Shift16(u16);

impl Shift16 {
    #[inline]
    fn load(&mut self, byte: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(byte);
    }

    /// Bit `15 - fine_x`. Fine X offsets the tap instead of delaying shifts.
    #[inline]
    fn tap(self, fine_x: u8) -> u8 {
        ((self.0 >> (15 - (fine_x & 0x07))) & 1) as u8
    }

    #[inline]
    fn shift(&mut self) {
        self.0 <<= 1;
    }
}

/// Bytes fetched during one 8-dot group, waiting for the next reload.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct TileLatch {
    pub(crate) tile: u8,
    /// Two-bit palette already selected from the attribute byte.
    pub(crate) palette: u8,
    pub(crate) pattern_low: u8,
    pub(crate) pattern_high: u8,
}

/// Two pattern planes and two palette planes, shifted once per dot.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct BgPipeline {
    pattern: [Shift16; 2],
    palette: [Shift16; 2],
}

impl BgPipeline {
    /// Moves a completed fetch group into the low bytes. Palette bits are
    /// replicated across the byte so every pixel of the tile sees them.
    pub(crate) fn reload(&mut self, latch: &TileLatch) {
        self.pattern[0].load(latch.pattern_low);
        self.pattern[1].load(latch.pattern_high);
        for (plane, shifter) in self.palette.iter_mut().enumerate() {
            let bit = (latch.palette >> plane) & 1;
            shifter.load(if bit != 0 { 0xFF } else { 0x00 });
        }
    }

    /// `(palette, pattern)` of the pixel under the fine-X tap.
    pub(crate) fn sample(&self, fine_x: u8) -> (u8, u8) {
        let pattern = (self.pattern[1].tap(fine_x) << 1) | self.pattern[0].tap(fine_x);
        let palette = (self.palette[1].tap(fine_x) << 1) | self.palette[0].tap(fine_x);
        (palette, pattern)
    }

    pub(crate) fn shift(&mut self) {
        for shifter in self.pattern.iter_mut().chain(self.palette.iter_mut()) {
            shifter.shift();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_with_tile(latch: TileLatch) -> BgPipeline {
        let mut bg = BgPipeline::default();
        bg.reload(&latch);
        for _ in 0..8 {
            bg.shift();
        }
        bg
    }

    #[test]
    fn tile_reaches_the_tap_after_eight_shifts() {
        let bg = pipeline_with_tile(TileLatch {
            tile: 0,
            palette: 0b10,
            pattern_low: 0b1000_0000,
            pattern_high: 0b1100_0000,
        });
        assert_eq!(bg.sample(0), (0b10, 0b11));
        assert_eq!(bg.sample(1), (0b10, 0b10));
        assert_eq!(bg.sample(2), (0b10, 0b00));
    }

    #[test]
    fn reload_keeps_the_pixels_in_flight() {
        let mut bg = pipeline_with_tile(TileLatch {
            pattern_low: 0xFF,
            ..TileLatch::default()
        });
        bg.reload(&TileLatch::default());
        assert_eq!(bg.sample(7), (0, 0b01));
    }
}
