//! Audio register surface.
//!
//! Waveform synthesis lives outside the core behind [`AudioUnit`]. The core
//! keeps the delta-modulation sample channel itself, because its sample
//! fetches are what trigger audio DMA and steal CPU cycles.

mod dmc;

use core::fmt::Debug;

use dyn_clone::DynClone;

use crate::memory::apu as apu_mem;

pub use dmc::Dmc;

/// External audio synthesizer.
///
/// The core forwards every write to `$4000-$4013`, `$4015` and `$4017`, clocks
/// the unit once per CPU cycle, and asks it for its `$4015` status bits and
/// its IRQ output. DMC output level changes are pushed to the unit so it can
/// mix the sample channel.
pub trait AudioUnit: DynClone + Debug + Send {
    fn write_register(&mut self, addr: u16, value: u8);

    /// Status bits 0-3 (length counters) and 6 (frame IRQ). Reading may
    /// acknowledge the frame IRQ. Bits 4, 5 and 7 are supplied by the core.
    fn read_status(&mut self) -> u8;

    /// Side-effect-free view of [`read_status`](Self::read_status).
    fn peek_status(&self) -> u8 {
        0
    }

    fn clock(&mut self);

    fn irq_pending(&self) -> bool {
        false
    }

    /// The 7-bit DMC DAC level changed.
    fn set_dmc_level(&mut self, _level: u8) {}
}

dyn_clone::clone_trait_object!(AudioUnit);

/// Audio unit that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioUnit for SilentAudio {
    fn write_register(&mut self, _addr: u16, _value: u8) {}

    fn read_status(&mut self) -> u8 {
        0
    }

    fn clock(&mut self) {}
}

/// Bits of `$4015` owned by the core.
pub(crate) const STATUS_DMC_ACTIVE: u8 = 0b0001_0000;
pub(crate) const STATUS_DMC_IRQ: u8 = 0b1000_0000;
/// Bits the external unit may drive.
pub(crate) const STATUS_UNIT_MASK: u8 = 0b0100_1111;

/// Whether `addr` is forwarded to the audio unit on write.
pub(crate) fn is_audio_register(addr: u16) -> bool {
    (apu_mem::REGISTER_BASE..=apu_mem::CHANNEL_REGISTER_END).contains(&addr)
        || addr == apu_mem::STATUS
        || addr == apu_mem::FRAME_COUNTER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Recorder {
        writes: Vec<(u16, u8)>,
    }

    impl AudioUnit for Recorder {
        fn write_register(&mut self, addr: u16, value: u8) {
            self.writes.push((addr, value));
        }

        fn read_status(&mut self) -> u8 {
            0x0F
        }

        fn clock(&mut self) {}
    }

    #[test]
    fn boxed_units_clone() {
        let mut unit: Box<dyn AudioUnit> = Box::new(Recorder::default());
        unit.write_register(0x4000, 0x3F);
        let copy = unit.clone();
        assert_eq!(format!("{copy:?}"), format!("{unit:?}"));
    }

    #[test]
    fn register_window() {
        assert!(is_audio_register(0x4000));
        assert!(is_audio_register(0x4013));
        assert!(is_audio_register(0x4015));
        assert!(is_audio_register(0x4017));
        assert!(!is_audio_register(0x4014));
        assert!(!is_audio_register(0x4016));
    }
}
