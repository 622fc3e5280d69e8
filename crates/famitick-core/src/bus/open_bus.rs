//! CPU data bus open-bus latch.
//!
//! The data bus floats when no device drives it, so reads from write-only or
//! unmapped addresses return the last value seen on the bus. Charge decay is
//! not modelled: the latch holds its value until the next driven access.

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OpenBus {
    value: u8,
    /// Address of the most recent CPU read.
    last_addr: u16,
}

impl OpenBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the floating bus value.
    #[inline]
    pub(crate) fn sample(&self) -> u8 {
        self.value
    }

    /// Latches a freshly driven value onto the bus.
    #[inline]
    pub(crate) fn latch(&mut self, value: u8) {
        self.value = value;
    }

    /// Combines a partially driven value with floating bits.
    ///
    /// Bits set in `mask` float and come from the latch; the rest come from
    /// `value`. The combined result becomes the new latch value.
    #[inline]
    pub(crate) fn apply_masked(&mut self, mask: u8, value: u8) -> u8 {
        let combined = (value & !mask) | (self.value & mask);
        self.value = combined;
        combined
    }

    #[inline]
    pub(crate) fn record_addr(&mut self, addr: u16) {
        self.last_addr = addr;
    }

    /// Address of the CPU's previous read (replayed by audio DMA).
    #[inline]
    pub(crate) fn last_addr(&self) -> u16 {
        self.last_addr
    }
}
