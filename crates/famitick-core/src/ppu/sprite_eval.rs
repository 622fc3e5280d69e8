//! Per-dot sprite evaluation for the next scanline.
//!
//! Dots 1..=64 fill secondary OAM with `$FF`. Dots 65..=256 alternate an OAM
//! read (odd) with a secondary write or comparison (even). Once eight sprites
//! are found the scan keeps comparing, but advances `m` together with `n`,
//! so later comparisons look at tile, attribute or X bytes as if they were Y.
//! That is the hardware overflow bug, and it is what decides the overflow
//! flag.

use crate::mem_block::ppu::{OamRam, SecondaryOamRam};

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum EvalPhase {
    /// Comparing byte 0 of sprite `n`.
    #[default]
    ScanY,
    /// Copying bytes 1..=3 of an in-range sprite.
    CopyRest,
    /// Secondary OAM full; buggy comparison for overflow.
    OverflowScan,
    /// All 64 sprites visited, or overflow found.
    Done,
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteEval {
    phase: EvalPhase,
    /// Sprite index in primary OAM, `0..64`.
    n: u8,
    /// Byte within the sprite, `0..4`.
    m: u8,
    /// Next write position in secondary OAM.
    written: u8,
    /// Byte read on the preceding odd dot.
    latch: u8,
    sprite0_next: bool,
}

impl SpriteEval {
    /// Dots 1..=64.
    pub(crate) fn clear_step(&mut self, dot: u16, secondary: &mut SecondaryOamRam) {
        if dot % 2 == 0 {
            secondary[usize::from((dot - 1) / 2)] = 0xFF;
        }
        if dot == 64 {
            *self = Self::default();
        }
    }

    /// Dots 65..=256. `line` is the scanline being drawn; the sprites found
    /// are drawn on `line + 1`. Returns `true` on the dot the overflow
    /// condition is detected.
    pub(crate) fn step(
        &mut self,
        dot: u16,
        line: u16,
        height: u8,
        oam: &OamRam,
        secondary: &mut SecondaryOamRam,
    ) -> bool {
        if dot % 2 == 1 {
            self.latch = oam[usize::from(self.n) * 4 + usize::from(self.m)];
            return false;
        }

        let in_range = line.wrapping_sub(u16::from(self.latch)) < u16::from(height);
        match self.phase {
            EvalPhase::ScanY => {
                secondary[usize::from(self.written)] = self.latch;
                if in_range {
                    self.sprite0_next |= self.n == 0;
                    self.written += 1;
                    self.m = 1;
                    self.phase = EvalPhase::CopyRest;
                } else {
                    self.next_sprite();
                }
                false
            }
            EvalPhase::CopyRest => {
                secondary[usize::from(self.written)] = self.latch;
                self.written += 1;
                self.m += 1;
                if self.m == 4 {
                    self.m = 0;
                    self.next_sprite();
                    if self.phase != EvalPhase::Done {
                        self.phase = if usize::from(self.written) == secondary.len() {
                            EvalPhase::OverflowScan
                        } else {
                            EvalPhase::ScanY
                        };
                    }
                }
                false
            }
            EvalPhase::OverflowScan => {
                if in_range {
                    self.phase = EvalPhase::Done;
                    return true;
                }
                self.m = (self.m + 1) & 0x03;
                self.next_sprite();
                false
            }
            EvalPhase::Done => false,
        }
    }

    fn next_sprite(&mut self) {
        self.n += 1;
        if self.n == 64 {
            self.n = 0;
            self.phase = EvalPhase::Done;
        }
    }

    /// Sprites copied into secondary OAM.
    pub(crate) fn found(&self) -> u8 {
        self.written / 4
    }

    /// OAM sprite 0 is among the sprites found.
    pub(crate) fn sprite0_next(&self) -> bool {
        self.sprite0_next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(oam: &OamRam, line: u16) -> (SpriteEval, SecondaryOamRam, bool) {
        let mut eval = SpriteEval::default();
        let mut secondary = SecondaryOamRam::filled(0);
        let mut overflow = false;
        for dot in 1..=64 {
            eval.clear_step(dot, &mut secondary);
        }
        for dot in 65..=256 {
            overflow |= eval.step(dot, line, 8, oam, &mut secondary);
        }
        (eval, secondary, overflow)
    }

    fn oam_with(sprites: &[(usize, [u8; 4])]) -> OamRam {
        // Park every sprite below the screen.
        let mut oam = OamRam::filled(0xF0);
        for (index, bytes) in sprites {
            oam[index * 4..index * 4 + 4].copy_from_slice(bytes);
        }
        oam
    }

    #[test]
    fn copies_in_range_sprites_in_oam_order() {
        let oam = oam_with(&[(3, [10, 1, 2, 3]), (9, [12, 4, 5, 6]), (20, [40, 7, 8, 9])]);
        let (eval, secondary, overflow) = evaluate(&oam, 15);
        assert_eq!(eval.found(), 2);
        assert!(!eval.sprite0_next());
        assert!(!overflow);
        assert_eq!(&secondary[..8], &[10, 1, 2, 3, 12, 4, 5, 6]);
        assert!(secondary[8..].iter().all(|&b| b == 0xF0 || b == 0xFF));
    }

    #[test]
    fn sprite_zero_is_tracked() {
        let oam = oam_with(&[(0, [100, 0, 0, 0])]);
        let (eval, _, _) = evaluate(&oam, 100);
        assert!(eval.sprite0_next());
        assert_eq!(eval.found(), 1);
    }

    #[test]
    fn ninth_sprite_on_line_sets_overflow() {
        let sprites: Vec<_> = (0..9).map(|i| (i, [50, 0, 0, 0])).collect();
        let (eval, _, overflow) = evaluate(&oam_with(&sprites), 52);
        assert_eq!(eval.found(), 8);
        assert!(overflow);
    }

    #[test]
    fn overflow_bug_reads_diagonally() {
        // Eight sprites fill the line; sprite 8's Y is out of range so the
        // scan moves to sprite 9 byte 1, whose tile number happens to be in
        // range and is misread as a Y coordinate.
        let mut sprites: Vec<_> = (0..8).map(|i| (i, [50, 0, 0, 0])).collect();
        sprites.push((8, [200, 0, 0, 0]));
        sprites.push((9, [200, 50, 0, 0]));
        let (_, _, overflow) = evaluate(&oam_with(&sprites), 52);
        assert!(overflow);

        // The same in-range byte at a position the scan skips never counts.
        let mut sprites: Vec<_> = (0..8).map(|i| (i, [50, 0, 0, 0])).collect();
        sprites.push((8, [200, 50, 0, 0]));
        let (_, _, overflow) = evaluate(&oam_with(&sprites), 52);
        assert!(!overflow);
    }
}
