use super::sprite::SpriteAttributes;

/// One sprite row fetched on dots 257..=320 for the next scanline.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteRow {
    pub(crate) y: u8,
    pub(crate) tile: u8,
    pub(crate) attributes: u8,
    pub(crate) x: u8,
    pub(crate) pattern_low: u8,
    pub(crate) pattern_high: u8,
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct SpriteSlot {
    pattern_low: u8,
    pattern_high: u8,
    attributes: u8,
    /// Dots left before the sprite starts shifting out.
    x_counter: u8,
    sprite0: bool,
}

/// Output of the sprite layer for one dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePixel {
    pub(crate) palette: u8,
    /// `0` is transparent.
    pub(crate) color: u8,
    pub(crate) behind_background: bool,
    pub(crate) sprite0: bool,
}

/// The eight sprite output units of the current scanline.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePipeline {
    slots: [SpriteSlot; 8],
    active: u8,
}

impl SpritePipeline {
    /// Latches the fetched rows. Horizontally flipped patterns are reversed
    /// here so output always walks from the high bit.
    pub(crate) fn load(&mut self, rows: &[SpriteRow], sprite0_first: bool) {
        *self = Self::default();
        for (index, (slot, row)) in self.slots.iter_mut().zip(rows).enumerate() {
            let attributes = SpriteAttributes::from_bits_retain(row.attributes);
            let flip = attributes.contains(SpriteAttributes::FLIP_HORIZONTAL);
            let orient = |byte: u8| if flip { byte.reverse_bits() } else { byte };
            *slot = SpriteSlot {
                pattern_low: orient(row.pattern_low),
                pattern_high: orient(row.pattern_high),
                attributes: row.attributes,
                x_counter: row.x,
                sprite0: sprite0_first && index == 0,
            };
        }
        self.active = rows.len().min(8) as u8;
    }

    /// The frontmost opaque sprite pixel at this dot; every active unit
    /// advances by one.
    pub(crate) fn sample_and_shift(&mut self) -> SpritePixel {
        let mut chosen: Option<SpritePixel> = None;
        for slot in self.slots.iter_mut().take(usize::from(self.active)) {
            if slot.x_counter > 0 {
                slot.x_counter -= 1;
                continue;
            }
            let color = ((slot.pattern_high >> 6) & 0b10) | (slot.pattern_low >> 7);
            if chosen.is_none() && color != 0 {
                let attributes = SpriteAttributes::from_bits_retain(slot.attributes);
                chosen = Some(SpritePixel {
                    palette: attributes.palette(),
                    color,
                    behind_background: attributes.contains(SpriteAttributes::BEHIND_BACKGROUND),
                    sprite0: slot.sprite0,
                });
            }
            slot.pattern_low <<= 1;
            slot.pattern_high <<= 1;
        }
        chosen.unwrap_or_default()
    }
}
