//! Standard controller (joypad) model.
//!
//! Implements the 8-button pad readable through `$4016/$4017`: a parallel
//! latch loaded while strobe is high and an 8-bit shift register clocked by
//! every read once strobe drops.

use bitflags::bitflags;

bitflags! {
    /// Button bits in shift-register order (A is shifted out first).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u8 {
        const A      = 0b0000_0001;
        const B      = 0b0000_0010;
        const SELECT = 0b0000_0100;
        const START  = 0b0000_1000;
        const UP     = 0b0001_0000;
        const DOWN   = 0b0010_0000;
        const LEFT   = 0b0100_0000;
        const RIGHT  = 0b1000_0000;
    }
}

/// Serially-readable controller state with latch/strobe behavior.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Controller {
    strobe: bool,
    shift: u8,
    /// Held buttons as raw [`Buttons`] bits.
    held: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the set of held buttons.
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.held = buttons.bits();
        if self.strobe {
            self.shift = self.held;
        }
    }

    pub fn buttons(&self) -> Buttons {
        Buttons::from_bits_retain(self.held)
    }

    /// Writes to the `$4016` strobe bit (shared by both ports).
    pub fn write_strobe(&mut self, data: u8) {
        self.strobe = data & 0x01 != 0;
        if self.strobe {
            self.shift = self.held;
        }
    }

    /// Reads the next bit from the shift register.
    ///
    /// While strobe is held the A button is returned on every read. Otherwise
    /// each read shifts, and after eight reads the register returns 1s.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            return self.held & 0x01;
        }
        let bit = self.shift & 0x01;
        self.shift = (self.shift >> 1) | 0x80;
        bit
    }

    /// Side-effect-free view of the bit the next read would return.
    pub fn peek(&self) -> u8 {
        if self.strobe {
            self.held & 0x01
        } else {
            self.shift & 0x01
        }
    }
}
