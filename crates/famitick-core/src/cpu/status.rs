use bitflags::bitflags;

bitflags! {
    /// The 8-bit processor status register (P).
    ///
    /// Bit layout:
    /// 7 6 5 4 3 2 1 0
    /// N V _ B D I Z C
    ///
    /// `B` and `_` only exist on the stack copy; the live register ignores
    /// them except for reads through PHP/BRK.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Carry flag (C)
        const CARRY     = 0b0000_0001;

        /// Zero flag (Z)
        const ZERO      = 0b0000_0010;

        /// Interrupt Disable flag (I)
        /// When set, the IRQ line is ignored.
        const INTERRUPT = 0b0000_0100;

        /// Decimal Mode flag (D)
        /// Stored and restored, but the 2A03 has no decimal adder.
        const DECIMAL   = 0b0000_1000;

        /// Break Command flag (B), only present in pushed copies.
        const BREAK     = 0b0001_0000;

        /// Unused bit, always 1 in pushed copies.
        const UNUSED    = 0b0010_0000;

        /// Overflow flag (V)
        const OVERFLOW  = 0b0100_0000;

        /// Negative flag (N)
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::INTERRUPT | Status::UNUSED
    }
}

impl Status {
    /// Set or clear the Zero flag based on a value.
    #[inline]
    pub fn update_zero(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
    }

    /// Set or clear the Negative flag based on bit 7 of a value.
    #[inline]
    pub fn update_negative(&mut self, value: u8) {
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    /// Updates both Z and N from `value`.
    #[inline]
    pub fn update_zn(&mut self, value: u8) {
        self.update_zero(value);
        self.update_negative(value);
    }

    /// Returns a copy with Z and N derived from `value`.
    #[inline]
    pub fn with_zn(mut self, value: u8) -> Self {
        self.update_zn(value);
        self
    }

    /// Value pushed by PHP/BRK (`B` set) or by IRQ/NMI (`B` clear).
    #[inline]
    pub fn to_stack(self, brk: bool) -> u8 {
        let mut pushed = self | Status::UNUSED;
        pushed.set(Status::BREAK, brk);
        pushed.bits()
    }

    /// Value restored by PLP/RTI: `B` dropped, `_` forced on.
    #[inline]
    pub fn from_stack(byte: u8) -> Self {
        (Status::from_bits_retain(byte) - Status::BREAK) | Status::UNUSED
    }

    #[inline]
    pub fn carry(self) -> u8 {
        (self.bits() & Status::CARRY.bits()) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_round_trip_drops_break() {
        let p = Status::CARRY | Status::NEGATIVE;
        assert_eq!(p.to_stack(true), 0b1011_0001);
        assert_eq!(p.to_stack(false), 0b1010_0001);
        assert_eq!(
            Status::from_stack(0xFF),
            Status::all() - Status::BREAK
        );
    }

    #[test]
    fn zn_flags() {
        let p = Status::empty().with_zn(0);
        assert!(p.contains(Status::ZERO));
        let p = p.with_zn(0x80);
        assert!(p.contains(Status::NEGATIVE) && !p.contains(Status::ZERO));
    }
}
