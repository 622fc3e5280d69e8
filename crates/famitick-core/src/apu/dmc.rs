//! Delta-modulation sample channel.
//!
//! Clocked once per CPU cycle. When its sample buffer is empty and bytes
//! remain, [`Dmc::clock`] returns the address to fetch; the console runs the
//! audio DMA for it and hands the byte back through [`Dmc::finish_fetch`].

use crate::memory::apu as apu_mem;

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dmc {
    irq_enable: bool,
    irq: bool,
    loop_flag: bool,
    /// CPU cycles until a `$4015` disable takes effect (2 or 3).
    disable_delay: u8,
    /// CPU cycles until the first fetch after a `$4015` enable (2 or 3).
    start_delay: u8,
    /// Output period in CPU cycles, minus one.
    timer_period: u16,
    timer: u16,
    output_level: u8,
    level_changed: bool,
    sample_address: u16,
    sample_length: u16,
    current_address: u16,
    bytes_remaining: u16,
    sample_buffer: Option<u8>,
    shift_register: u8,
    bits_remaining: u8,
    silence: bool,
    fetch_pending: bool,
}

impl Dmc {
    pub(crate) fn new(rates: &[u16; 16]) -> Self {
        Self {
            irq_enable: false,
            irq: false,
            loop_flag: false,
            disable_delay: 0,
            start_delay: 0,
            timer_period: rates[0] - 1,
            timer: rates[0] - 1,
            output_level: 0,
            level_changed: false,
            sample_address: apu_mem::DMC_SAMPLE_BASE,
            sample_length: 1,
            current_address: apu_mem::DMC_SAMPLE_BASE,
            bytes_remaining: 0,
            sample_buffer: None,
            shift_register: 0,
            bits_remaining: 8,
            silence: true,
            fetch_pending: false,
        }
    }

    /// `$4010`: IRQ enable, loop, rate index.
    pub(crate) fn write_control(&mut self, value: u8, rates: &[u16; 16]) {
        self.irq_enable = value & 0x80 != 0;
        if !self.irq_enable {
            self.irq = false;
        }
        self.loop_flag = value & 0x40 != 0;
        self.timer_period = rates[usize::from(value & 0x0F)] - 1;
    }

    /// `$4011`: direct 7-bit DAC load.
    pub(crate) fn write_direct_load(&mut self, value: u8) {
        self.set_level(value & 0x7F);
    }

    pub(crate) fn write_sample_address(&mut self, value: u8) {
        self.sample_address =
            apu_mem::DMC_SAMPLE_BASE + u16::from(value) * apu_mem::DMC_SAMPLE_ADDR_STRIDE;
    }

    pub(crate) fn write_sample_length(&mut self, value: u8) {
        self.sample_length = u16::from(value) * apu_mem::DMC_SAMPLE_LEN_STRIDE + 1;
    }

    /// `$4015` bit 4. Both directions take effect 2 or 3 CPU cycles later,
    /// depending on the parity of the writing cycle. The write always
    /// acknowledges the DMC IRQ.
    pub(crate) fn set_enabled(&mut self, enabled: bool, cpu_cycle: u64) {
        self.irq = false;
        let delay = if cpu_cycle & 1 == 0 { 2 } else { 3 };
        if !enabled {
            if self.disable_delay == 0 {
                self.disable_delay = delay;
            }
        } else if self.bytes_remaining == 0 {
            self.restart();
            self.start_delay = delay;
        }
    }

    /// `$4015` bit 4.
    #[inline]
    pub(crate) fn active(&self) -> bool {
        self.bytes_remaining > 0
    }

    #[inline]
    pub(crate) fn irq_pending(&self) -> bool {
        self.irq
    }

    /// Level reported once per change.
    pub(crate) fn take_level_change(&mut self) -> Option<u8> {
        std::mem::take(&mut self.level_changed).then_some(self.output_level)
    }

    /// One CPU cycle. Returns the address of a sample byte to fetch.
    pub(crate) fn clock(&mut self) -> Option<u16> {
        if self.disable_delay > 0 {
            self.disable_delay -= 1;
            if self.disable_delay == 0 {
                self.bytes_remaining = 0;
                self.start_delay = 0;
            }
        }
        if self.start_delay > 0 {
            self.start_delay -= 1;
        }

        if self.timer == 0 {
            self.timer = self.timer_period;
            self.shift_output();
        } else {
            self.timer -= 1;
        }

        if self.start_delay == 0
            && !self.fetch_pending
            && self.sample_buffer.is_none()
            && self.bytes_remaining > 0
        {
            self.fetch_pending = true;
            return Some(self.current_address);
        }
        None
    }

    /// Delivers the byte fetched by audio DMA.
    pub(crate) fn finish_fetch(&mut self, byte: u8) {
        if !std::mem::take(&mut self.fetch_pending) {
            return;
        }
        self.sample_buffer = Some(byte);
        // The address wraps from $FFFF to $8000.
        self.current_address = self.current_address.checked_add(1).unwrap_or(0x8000);
        self.bytes_remaining = self.bytes_remaining.saturating_sub(1);
        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart();
            } else if self.irq_enable {
                self.irq = true;
            }
        }
    }

    fn restart(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    fn set_level(&mut self, level: u8) {
        if level != self.output_level {
            self.output_level = level;
            self.level_changed = true;
        }
    }

    fn shift_output(&mut self) {
        if !self.silence {
            let level = if self.shift_register & 1 != 0 {
                if self.output_level <= 125 {
                    self.output_level + 2
                } else {
                    self.output_level
                }
            } else {
                self.output_level.saturating_sub(2)
            };
            self.set_level(level);
            self.shift_register >>= 1;
        }

        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            match self.sample_buffer.take() {
                Some(sample) => {
                    self.shift_register = sample;
                    self.silence = false;
                }
                None => self.silence = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingProfile;

    fn dmc() -> Dmc {
        Dmc::new(TimingProfile::NTSC.dmc_rates)
    }

    #[test]
    fn enable_requests_first_fetch_after_delay() {
        let mut dmc = dmc();
        dmc.write_sample_address(0x10);
        dmc.set_enabled(true, 0);
        assert!(dmc.active());
        assert_eq!(dmc.clock(), None);
        assert_eq!(dmc.clock(), Some(0xC400));
        assert_eq!(dmc.clock(), None, "one fetch in flight at a time");

        let mut odd = self::dmc();
        odd.set_enabled(true, 1);
        assert_eq!(odd.clock(), None);
        assert_eq!(odd.clock(), None);
        assert_eq!(odd.clock(), Some(0xC000));
    }

    #[test]
    fn last_byte_raises_irq_unless_looping() {
        let rates = TimingProfile::NTSC.dmc_rates;
        let mut dmc = dmc();
        dmc.write_control(0x80, rates);
        dmc.set_enabled(true, 0);
        while dmc.clock().is_none() {}
        dmc.finish_fetch(0xAA);
        assert!(!dmc.active());
        assert!(dmc.irq_pending());

        dmc.set_enabled(false, 0);
        assert!(!dmc.irq_pending());

        let mut looping = self::dmc();
        looping.write_control(0xC0, rates);
        looping.set_enabled(true, 0);
        while looping.clock().is_none() {}
        looping.finish_fetch(0xAA);
        assert!(looping.active());
        assert!(!looping.irq_pending());
    }

    #[test]
    fn direct_load_reports_level_once() {
        let mut dmc = dmc();
        dmc.write_direct_load(0xC5);
        assert_eq!(dmc.take_level_change(), Some(0x45));
        assert_eq!(dmc.take_level_change(), None);
    }

    #[test]
    fn disable_lands_after_delay() {
        let mut dmc = dmc();
        dmc.write_sample_length(0x01);
        dmc.set_enabled(true, 0);
        dmc.set_enabled(false, 1);
        dmc.clock();
        dmc.clock();
        assert!(dmc.active());
        dmc.clock();
        assert!(!dmc.active());
    }

    #[test]
    fn address_wraps_to_8000() {
        let mut dmc = dmc();
        dmc.write_sample_address(0xFF);
        dmc.write_sample_length(0x04);
        dmc.set_enabled(true, 0);
        let mut fetched = Vec::new();
        while dmc.active() {
            if let Some(addr) = dmc.clock() {
                fetched.push(addr);
                dmc.finish_fetch(0);
                dmc.sample_buffer = None;
            }
        }
        assert_eq!(fetched.len(), 65);
        assert_eq!(fetched[0], 0xFFC0);
        assert_eq!(fetched[63], 0xFFFF);
        assert_eq!(fetched[64], 0x8000);
    }
}
