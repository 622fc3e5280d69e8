//! Bit layouts of the CPU-visible `$2000`, `$2001` and `$2002` registers.
//!
//! The vertical-blank bit of `$2002` is not stored here; it is answered by the
//! [`BlankingLedger`](super::blanking::BlankingLedger) at read time.

use bitflags::bitflags;

use crate::memory::ppu as ppu_mem;

bitflags! {
    /// PPUCTRL (`$2000`).
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N M H B S I n n
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Control: u8 {
        const NAMETABLE = 0b0000_0011;
        /// `$2007` steps by 32 instead of 1.
        const INCREMENT_32 = 0b0000_0100;
        /// 8x8 sprites fetch from `$1000`.
        const SPRITE_TABLE = 0b0000_1000;
        /// Background fetches from `$1000`.
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        /// NMI output while the blanking flag is visible.
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    #[inline]
    pub(crate) fn nametable_index(self) -> u8 {
        self.bits() & Self::NAMETABLE.bits()
    }

    #[inline]
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Self::INCREMENT_32) { 32 } else { 1 }
    }

    #[inline]
    pub(crate) fn sprite_pattern_table(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }

    #[inline]
    pub(crate) fn background_pattern_table(self) -> u16 {
        if self.contains(Self::BACKGROUND_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }

    /// Sprite height in rows.
    #[inline]
    pub(crate) fn sprite_height(self) -> u8 {
        if self.contains(Self::SPRITE_SIZE_16) { 16 } else { 8 }
    }

    #[inline]
    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Self::GENERATE_NMI)
    }
}

bitflags! {
    /// PPUMASK (`$2001`).
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// B G R s b S B g
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Mask: u8 {
        const GRAYSCALE = 0b0000_0001;
        /// Background in the leftmost 8 pixels.
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        /// Sprites in the leftmost 8 pixels.
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        const SHOW_BACKGROUND = 0b0000_1000;
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

impl Mask {
    /// Either layer enabled; this is what gates the fetch schedule and the
    /// odd-frame skip.
    #[inline]
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BACKGROUND | Self::SHOW_SPRITES)
    }

    #[inline]
    pub(crate) fn background_at(self, x: u16) -> bool {
        self.contains(Self::SHOW_BACKGROUND) && (x >= 8 || self.contains(Self::SHOW_BACKGROUND_LEFT))
    }

    #[inline]
    pub(crate) fn sprites_at(self, x: u16) -> bool {
        self.contains(Self::SHOW_SPRITES) && (x >= 8 || self.contains(Self::SHOW_SPRITES_LEFT))
    }

    #[inline]
    pub(crate) fn color_mask(self) -> u8 {
        if self.contains(Self::GRAYSCALE) { 0x30 } else { 0x3F }
    }
}

bitflags! {
    /// Latched bits of PPUSTATUS (`$2002`) other than vertical blank.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
    }
}

/// Bit 7 of `$2002`.
pub(crate) const VBLANK_BIT: u8 = 0b1000_0000;
