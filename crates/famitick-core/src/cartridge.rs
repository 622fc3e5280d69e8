//! Cartridge capability consumed by the bus and the pixel pipeline.
//!
//! The core never inspects a board concretely: it routes CPU accesses at
//! `$4020-$FFFF` and PPU pattern accesses at `$0000-$1FFF` through the
//! [`Cartridge`] trait and asks it how nametables are mirrored.

use core::fmt::Debug;

use dyn_clone::DynClone;

use crate::{error::Error, memory::ppu as ppu_mem};

mod nrom;

pub use nrom::Nrom;

/// Layout mirroring type for the PPU nametables.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirroring {
    /// Two horizontal nametables that mirror vertically.
    Horizontal,
    /// Two vertical nametables that mirror horizontally.
    Vertical,
    /// Single-screen mirroring using the first nametable (`$2000` region).
    SingleScreenLower,
    /// Single-screen mirroring using the second nametable (`$2400` region).
    SingleScreenUpper,
}

impl Mirroring {
    /// Maps a nametable address (`$2000-$3EFF`) to an offset in the 2 KiB CIRAM.
    pub fn ciram_offset(self, addr: u16) -> usize {
        let addr = (addr - ppu_mem::NAMETABLE_BASE) & 0x0FFF;
        let table = addr / ppu_mem::NAMETABLE_SIZE;
        let offset = (addr % ppu_mem::NAMETABLE_SIZE) as usize;
        let bank = match self {
            Mirroring::Horizontal => table >> 1,
            Mirroring::Vertical => table & 1,
            Mirroring::SingleScreenLower => 0,
            Mirroring::SingleScreenUpper => 1,
        } as usize;
        bank * ppu_mem::NAMETABLE_SIZE as usize + offset
    }
}

/// A cartridge board as seen from the console side of the connector.
pub trait Cartridge: DynClone + Debug + Send {
    /// CPU read in `$4020-$FFFF`. `None` leaves the data bus floating.
    fn cpu_read(&mut self, addr: u16) -> Option<u8>;

    fn cpu_write(&mut self, addr: u16, value: u8);

    /// Side-effect-free CPU read used by inspection tooling.
    fn cpu_peek(&self, addr: u16) -> Option<u8>;

    /// PPU pattern-table read (`$0000-$1FFF`).
    fn chr_read(&mut self, addr: u16) -> u8;

    fn chr_write(&mut self, addr: u16, value: u8);

    fn mirroring(&self) -> Mirroring;

    /// Whether the board asserts the shared IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Returns the board to its power-on state.
    fn power_on(&mut self) {}

    /// Applies a warm reset.
    fn reset(&mut self) {}

    /// Checks the board's own configuration. Called once before the first tick.
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

dyn_clone::clone_trait_object!(Cartridge);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_mirroring_pairs_top_and_bottom() {
        let m = Mirroring::Horizontal;
        assert_eq!(m.ciram_offset(0x2000), m.ciram_offset(0x2400));
        assert_eq!(m.ciram_offset(0x2800), m.ciram_offset(0x2C00));
        assert_ne!(m.ciram_offset(0x2000), m.ciram_offset(0x2800));
    }

    #[test]
    fn vertical_mirroring_pairs_left_and_right() {
        let m = Mirroring::Vertical;
        assert_eq!(m.ciram_offset(0x2005), m.ciram_offset(0x2805));
        assert_eq!(m.ciram_offset(0x2405), 0x405);
        assert_eq!(m.ciram_offset(0x3005), m.ciram_offset(0x2005));
    }
}
