//! The internal `v`/`t`/`x`/`w` scroll latches and the address increments the
//! fetch schedule applies to them.

// Layout of `v` and `t` (15 bits):
//  14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
//  [fine_y][nt][coarse_y ][coarse_x ]
const COARSE_X: u16 = 0x001F;
const COARSE_Y: u16 = 0x03E0;
const NAMETABLE_X: u16 = 0x0400;
const NAMETABLE_Y: u16 = 0x0800;
const NAMETABLE: u16 = NAMETABLE_X | NAMETABLE_Y;
const FINE_Y: u16 = 0x7000;
const ADDR_MASK: u16 = 0x7FFF;

const HORIZONTAL: u16 = COARSE_X | NAMETABLE_X;
const VERTICAL: u16 = COARSE_Y | NAMETABLE_Y | FINE_Y;

/// 15-bit VRAM address as held in `v` and `t`.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct VramAddr(u16);

impl VramAddr {
    #[inline]
    pub fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn coarse_x(self) -> u16 {
        self.0 & COARSE_X
    }

    #[inline]
    pub fn coarse_y(self) -> u16 {
        (self.0 & COARSE_Y) >> 5
    }

    #[inline]
    pub fn fine_y(self) -> u16 {
        (self.0 & FINE_Y) >> 12
    }

    /// Nametable byte address for the tile under `v`.
    #[inline]
    pub(crate) fn tile_addr(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Attribute byte address for the tile under `v`.
    #[inline]
    pub(crate) fn attribute_addr(self) -> u16 {
        0x23C0 | (self.0 & NAMETABLE) | ((self.0 >> 4) & 0x38) | ((self.0 >> 2) & 0x07)
    }

    /// Shift that selects this tile's quadrant inside an attribute byte.
    #[inline]
    pub(crate) fn attribute_shift(self) -> u8 {
        (((self.coarse_y() & 0x02) << 1) | (self.coarse_x() & 0x02)) as u8
    }

    fn replace(&mut self, mask: u16, bits: u16) {
        self.0 = (self.0 & !mask) | (bits & mask);
    }

    /// Coarse X step with the horizontal nametable wrap.
    pub(crate) fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.0 &= !COARSE_X;
            self.0 ^= NAMETABLE_X;
        } else {
            self.0 += 1;
        }
    }

    /// Fine Y step, carrying into coarse Y. Row 29 wraps to the next
    /// vertical nametable; rows 30 and 31 (attribute space) wrap without
    /// switching.
    pub(crate) fn increment_y(&mut self) {
        if self.fine_y() < 7 {
            self.0 += 0x1000;
            return;
        }
        self.0 &= !FINE_Y;
        match self.coarse_y() {
            29 => {
                self.0 &= !COARSE_Y;
                self.0 ^= NAMETABLE_Y;
            }
            31 => self.0 &= !COARSE_Y,
            y => self.replace(COARSE_Y, (y + 1) << 5),
        }
    }

    /// `$2007` step outside of rendering.
    #[inline]
    pub(crate) fn increment(&mut self, step: u16) {
        self.0 = self.0.wrapping_add(step) & ADDR_MASK;
    }
}

impl core::fmt::Debug for VramAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "VramAddr({:#06X} fy={} nt={} cy={} cx={})",
            self.0,
            self.fine_y(),
            (self.0 & NAMETABLE) >> 10,
            self.coarse_y(),
            self.coarse_x(),
        )
    }
}

impl From<u16> for VramAddr {
    #[inline]
    fn from(v: u16) -> Self {
        Self(v & ADDR_MASK)
    }
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scroll {
    pub(crate) v: VramAddr,
    pub(crate) t: VramAddr,
    /// Fine X, `0..=7`.
    pub(crate) x: u8,
    /// Second-write toggle shared by `$2005` and `$2006`.
    pub(crate) w: bool,
}

impl Scroll {
    pub(crate) fn write_control(&mut self, nametable: u8) {
        self.t.replace(NAMETABLE, u16::from(nametable) << 10);
    }

    pub(crate) fn write_scroll(&mut self, value: u8) {
        let value = u16::from(value);
        if self.w {
            self.t.replace(COARSE_Y, (value >> 3) << 5);
            self.t.replace(FINE_Y, (value & 0x07) << 12);
        } else {
            self.t.replace(COARSE_X, value >> 3);
            self.x = (value & 0x07) as u8;
        }
        self.w = !self.w;
    }

    /// `$2006`: high byte first (bit 14 cleared), then low byte and `v = t`.
    pub(crate) fn write_addr(&mut self, value: u8) {
        let value = u16::from(value);
        if self.w {
            self.t.replace(0x00FF, value);
            self.v = self.t;
        } else {
            self.t.replace(0x7F00, (value & 0x3F) << 8);
        }
        self.w = !self.w;
    }

    #[inline]
    pub(crate) fn copy_horizontal(&mut self) {
        self.v.replace(HORIZONTAL, self.t.0);
    }

    #[inline]
    pub(crate) fn copy_vertical(&mut self) {
        self.v.replace(VERTICAL, self.t.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_writes_split_coarse_and_fine() {
        let mut scroll = Scroll::default();
        scroll.write_control(0b11);
        scroll.write_scroll(0x7D); // x: coarse 15, fine 5
        scroll.write_scroll(0x5E); // y: coarse 11, fine 6
        assert_eq!(scroll.x, 5);
        assert_eq!(scroll.t.coarse_x(), 15);
        assert_eq!(scroll.t.coarse_y(), 11);
        assert_eq!(scroll.t.fine_y(), 6);
        assert_eq!(scroll.t.raw() & NAMETABLE, NAMETABLE);
        assert!(!scroll.w);
    }

    #[test]
    fn second_addr_write_loads_v() {
        let mut scroll = Scroll::default();
        scroll.write_addr(0xFF);
        assert_eq!(scroll.v.raw(), 0);
        scroll.write_addr(0x12);
        assert_eq!(scroll.v.raw(), 0x3F12);
    }

    #[test]
    fn coarse_x_wraps_into_next_nametable() {
        let mut v = VramAddr::from(0x001F);
        v.increment_x();
        assert_eq!(v.raw(), 0x0400);
    }

    #[test]
    fn y_increment_wraps_at_row_29_and_31() {
        let mut v = VramAddr::from(0x7000 | (29 << 5));
        v.increment_y();
        assert_eq!(v.raw(), NAMETABLE_Y);

        let mut v = VramAddr::from(0x7000 | (31 << 5));
        v.increment_y();
        assert_eq!(v.raw(), 0);
    }

    #[test]
    fn attribute_address_tracks_quadrant() {
        // coarse x 6, coarse y 5 in nametable 1.
        let v = VramAddr::from(0x0400 | (5 << 5) | 6);
        assert_eq!(v.attribute_addr(), 0x27C9);
        assert_eq!(v.attribute_shift(), 2);
    }
}
