use bitflags::bitflags;

bitflags! {
    /// Sprite byte 2.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct SpriteAttributes: u8 {
        const PALETTE = 0b0000_0011;
        /// Drawn behind opaque background pixels.
        const BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl SpriteAttributes {
    #[inline]
    pub(crate) fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }
}

/// Bits 2-4 of the attribute byte do not exist in OAM and read back as 0.
pub(crate) const ATTRIBUTE_READ_MASK: u8 = 0xE3;

/// Pattern address of `row` within a sprite, honouring vertical flip and the
/// 8x16 table/tile split.
pub(crate) fn pattern_addr(
    tile: u8,
    attributes: SpriteAttributes,
    row: u8,
    height: u8,
    table_8x8: u16,
) -> u16 {
    let row = if attributes.contains(SpriteAttributes::FLIP_VERTICAL) {
        height - 1 - row
    } else {
        row
    };
    let (table, tile) = if height == 16 {
        let table = if tile & 1 != 0 { 0x1000 } else { 0x0000 };
        (table, (tile & 0xFE) + u8::from(row >= 8))
    } else {
        (table_8x8, tile)
    };
    table + u16::from(tile) * 16 + u16::from(row & 0x07)
}
