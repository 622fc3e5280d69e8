//! Palette RAM addressing and the 2C02 master palette.

use crate::{mem_block::ppu::PaletteRam, memory::ppu as ppu_mem};

/// 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

const fn c(r: u8, g: u8, b: u8) -> Color {
    Color::new(r, g, b)
}

/// Standard 2C02 output colors, indexed by the 6-bit palette RAM value.
#[rustfmt::skip]
pub const NES_PALETTE: [Color; 64] = [
    c(84, 84, 84),    c(0, 30, 116),    c(8, 16, 144),    c(48, 0, 136),
    c(68, 0, 100),    c(92, 0, 48),     c(84, 4, 0),      c(60, 24, 0),
    c(32, 42, 0),     c(8, 58, 0),      c(0, 64, 0),      c(0, 60, 0),
    c(0, 50, 60),     c(0, 0, 0),       c(0, 0, 0),       c(0, 0, 0),

    c(152, 150, 152), c(8, 76, 196),    c(48, 50, 236),   c(92, 30, 228),
    c(136, 20, 176),  c(160, 20, 100),  c(152, 34, 32),   c(120, 60, 0),
    c(84, 90, 0),     c(40, 114, 0),    c(8, 124, 0),     c(0, 118, 40),
    c(0, 102, 120),   c(0, 0, 0),       c(0, 0, 0),       c(0, 0, 0),

    c(236, 238, 236), c(76, 154, 236),  c(120, 124, 236), c(176, 98, 236),
    c(228, 84, 236),  c(236, 88, 180),  c(236, 106, 100), c(212, 136, 32),
    c(160, 170, 0),   c(116, 196, 0),   c(76, 208, 32),   c(56, 204, 108),
    c(56, 180, 204),  c(60, 60, 60),    c(0, 0, 0),       c(0, 0, 0),

    c(236, 238, 236), c(168, 204, 236), c(188, 188, 236), c(212, 178, 236),
    c(236, 174, 236), c(236, 174, 212), c(236, 180, 176), c(228, 196, 144),
    c(204, 210, 120), c(180, 222, 120), c(168, 226, 144), c(152, 226, 180),
    c(160, 214, 228), c(160, 162, 160), c(0, 0, 0),       c(0, 0, 0),
];

/// Index into the 32-byte palette RAM for a `$3F00-$3FFF` address.
///
/// `$3F10/$3F14/$3F18/$3F1C` alias the backdrop entries at `$3F00/$3F04/
/// $3F08/$3F0C`.
#[inline]
pub(crate) fn palette_index(addr: u16) -> usize {
    let mut index = (addr - ppu_mem::PALETTE_BASE) as usize % ppu_mem::PALETTE_RAM_SIZE;
    if index & 0x13 == 0x10 {
        index &= 0x0F;
    }
    index
}

pub(crate) fn read(ram: &PaletteRam, addr: u16) -> u8 {
    ram[palette_index(addr)] & 0x3F
}

pub(crate) fn write(ram: &mut PaletteRam, addr: u16, value: u8) {
    ram[palette_index(addr)] = value & 0x3F;
}
