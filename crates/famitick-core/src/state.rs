//! Whole-console snapshots.
//!
//! A [`NesSnapshot`] is plain data: CPU, pixel pipeline, work RAM, the timing
//! aggregate and the bus latches. Cartridge state, the attached audio unit
//! and the back buffer are not part of it. The cartridge and audio unit are
//! owned by the caller; the back buffer is redrawn every frame.

use tracing::debug;

use crate::{
    Nes, Timing,
    apu::Dmc,
    bus::OpenBus,
    config::Region,
    controller::Controller,
    cpu::CpuSnapshot,
    error::Error,
    mem_block::cpu::Ram,
    ppu::PpuSnapshot,
};

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NesSnapshot {
    region: Region,
    cpu: CpuSnapshot,
    ppu: PpuSnapshot,
    ram: Ram,
    timing: Timing,
    dmc: Dmc,
    open_bus: OpenBus,
    controllers: [Controller; 2],
    sprite_dma_request: Option<u8>,
}

impl NesSnapshot {
    pub fn region(&self) -> Region {
        self.region
    }

    /// Master tick at which the snapshot was taken.
    pub fn master_ticks(&self) -> u64 {
        self.timing.clock.now()
    }

    pub fn cpu(&self) -> &CpuSnapshot {
        &self.cpu
    }

    #[cfg(feature = "savestate-postcard")]
    pub fn to_postcard_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(postcard::to_stdvec(self)?)
    }

    #[cfg(feature = "savestate-postcard")]
    pub fn from_postcard_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(postcard::from_bytes(bytes)?)
    }
}

impl Nes {
    pub fn snapshot(&self) -> NesSnapshot {
        NesSnapshot {
            region: self.profile.region,
            cpu: self.cpu.snapshot(),
            ppu: self.devices.ppu.snapshot(),
            ram: self.devices.ram.clone(),
            timing: self.timing,
            dmc: self.devices.dmc,
            open_bus: self.devices.open_bus,
            controllers: self.devices.controllers,
            sprite_dma_request: self.devices.sprite_dma_request,
        }
    }

    /// Rewinds the console to `snapshot`. The snapshot must come from a
    /// console of the same region.
    pub fn restore(&mut self, snapshot: &NesSnapshot) -> Result<(), Error> {
        if snapshot.region != self.profile.region {
            return Err(Error::RegionMismatch {
                snapshot: snapshot.region,
                console: self.profile.region,
            });
        }
        self.cpu.restore(&snapshot.cpu);
        self.devices.ppu.restore(&snapshot.ppu);
        self.devices.ram = snapshot.ram.clone();
        self.timing = snapshot.timing;
        self.devices.dmc = snapshot.dmc;
        self.devices.open_bus = snapshot.open_bus;
        self.devices.controllers = snapshot.controllers;
        self.devices.sprite_dma_request = snapshot.sprite_dma_request;
        debug!(tick = snapshot.master_ticks(), "snapshot restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        NesBuilder,
        cartridge::{Mirroring, Nrom},
    };

    /// Counts frames into `$00` from the NMI handler.
    fn counter_rom() -> Nrom {
        let mut prg = vec![0xEA; 0x4000];
        // $8000: LDA #$80; STA $2000; JMP $8005
        prg[..8].copy_from_slice(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
        // $8100: INC $00; RTI
        prg[0x100..0x103].copy_from_slice(&[0xE6, 0x00, 0x40]);
        prg[0x3FFA..0x3FFE].copy_from_slice(&[0x00, 0x81, 0x00, 0x80]);
        Nrom::new(prg, Vec::new(), Mirroring::Horizontal).expect("nrom")
    }

    fn console(region: Region) -> Nes {
        NesBuilder::new()
            .region(region)
            .cartridge(counter_rom())
            .build()
            .expect("console")
    }

    #[test]
    fn restore_replays_identically() {
        let mut nes = console(Region::Ntsc);
        nes.run_frame().expect("frame");
        for _ in 0..1234 {
            nes.tick();
        }
        let snap = nes.snapshot();

        nes.run_frame().expect("frame");
        nes.run_frame().expect("frame");
        let ahead = nes.snapshot();
        let frames = nes.ram()[0];

        nes.restore(&snap).expect("same region");
        assert_eq!(nes.master_ticks(), snap.master_ticks());
        assert_eq!(nes.snapshot(), snap);

        nes.run_frame().expect("frame");
        nes.run_frame().expect("frame");
        assert_eq!(nes.ram()[0], frames);
        assert_eq!(nes.snapshot(), ahead);
    }

    #[test]
    fn restore_rejects_other_region() {
        let ntsc = console(Region::Ntsc);
        let mut pal = console(Region::Pal);
        let err = pal.restore(&ntsc.snapshot()).expect_err("region mismatch");
        assert!(matches!(
            err,
            Error::RegionMismatch {
                snapshot: Region::Ntsc,
                console: Region::Pal,
            }
        ));
    }

    #[cfg(feature = "savestate-postcard")]
    #[test]
    fn postcard_bytes_decode_to_the_same_snapshot() {
        let mut nes = console(Region::Ntsc);
        nes.run_frame().expect("frame");
        let snap = nes.snapshot();
        let bytes = snap.to_postcard_bytes().expect("encode");
        assert_eq!(NesSnapshot::from_postcard_bytes(&bytes).expect("decode"), snap);
        assert!(NesSnapshot::from_postcard_bytes(&bytes[..8]).is_err());
    }
}
