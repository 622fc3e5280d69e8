//! Init-time configuration.
//!
//! A [`NesBuilder`] collects the region, output format and external
//! collaborators, validates them, and only then produces a [`Nes`]. Nothing in
//! here can be changed once the console is built.

mod region;
mod timing;

pub use region::Region;
pub use timing::{DOTS_PER_SCANLINE, TimingProfile, VBLANK_SET_LINE};

use tracing::debug;

use crate::{
    Nes,
    apu::{AudioUnit, SilentAudio},
    cartridge::Cartridge,
    error::Error,
    ppu::buffer::ColorFormat,
};

#[derive(Debug)]
pub struct NesBuilder {
    region: Region,
    format: ColorFormat,
    cartridge: Option<Box<dyn Cartridge>>,
    audio: Option<Box<dyn AudioUnit>>,
}

impl Default for NesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NesBuilder {
    pub fn new() -> Self {
        Self {
            region: Region::default(),
            format: ColorFormat::Rgba8888,
            cartridge: None,
            audio: None,
        }
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn color_format(mut self, format: ColorFormat) -> Self {
        self.format = format;
        self
    }

    pub fn cartridge(mut self, cartridge: impl Cartridge + 'static) -> Self {
        self.cartridge = Some(Box::new(cartridge));
        self
    }

    pub fn boxed_cartridge(mut self, cartridge: Box<dyn Cartridge>) -> Self {
        self.cartridge = Some(cartridge);
        self
    }

    /// Attaches the external channel synthesizer. Defaults to [`SilentAudio`].
    pub fn audio(mut self, audio: impl AudioUnit + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    /// Validates the configuration and powers the console on.
    ///
    /// Every configuration error surfaces here; a console that builds never
    /// fails inside [`Nes::tick`].
    pub fn build(self) -> Result<Nes, Error> {
        let profile = TimingProfile::for_region(self.region)?;
        let cartridge = self.cartridge.ok_or(Error::MissingCartridge)?;
        cartridge.validate()?;
        let audio = self.audio.unwrap_or_else(|| Box::new(SilentAudio));
        debug!(region = %self.region, format = ?self.format, "building console");
        Ok(Nes::from_parts(profile, self.format, cartridge, audio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{Mirroring, Nrom};

    fn nrom() -> Nrom {
        Nrom::new(vec![0xEA; 0x4000], vec![0; 0x2000], Mirroring::Horizontal)
            .expect("valid nrom")
    }

    #[test]
    fn missing_cartridge_is_reported_before_any_tick() {
        let err = NesBuilder::new().build().expect_err("no cartridge");
        assert!(matches!(err, Error::MissingCartridge));
    }

    #[test]
    fn unsupported_region_is_reported() {
        let err = NesBuilder::new()
            .region(Region::Dendy)
            .cartridge(nrom())
            .build()
            .expect_err("dendy unsupported");
        assert!(matches!(err, Error::UnsupportedRegion(Region::Dendy)));
    }

    #[test]
    fn pal_console_builds() {
        let nes = NesBuilder::new()
            .region(Region::Pal)
            .cartridge(nrom())
            .build()
            .expect("pal build");
        assert_eq!(nes.profile().region, Region::Pal);
        assert_eq!(nes.master_ticks(), 0);
    }
}
