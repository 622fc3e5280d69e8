#![allow(dead_code)]

use anyhow::{Context, Result};
use famitick_core::{Mirroring, Nes, NesBuilder, Nrom, Region, SlotOwner};

pub const PRG_ORIGIN: u16 = 0x8000;
pub const NMI_HANDLER: u16 = 0x8100;
pub const DATA_ORIGIN: u16 = 0x9000;

/// A 16 KiB NROM image under construction.
///
/// `program` lands at `$8000`, which is also the reset vector. The NMI vector
/// points at `$8100`, which holds `RTI` unless a handler is supplied.
pub struct Rom {
    prg: Vec<u8>,
}

impl Rom {
    pub fn new(program: &[u8]) -> Self {
        let mut prg = vec![0xEA; 0x4000];
        prg[..program.len()].copy_from_slice(program);
        prg[offset(NMI_HANDLER)] = 0x40;
        let [nmi_lo, nmi_hi] = NMI_HANDLER.to_le_bytes();
        let [reset_lo, reset_hi] = PRG_ORIGIN.to_le_bytes();
        prg[0x3FFA..0x3FFE].copy_from_slice(&[nmi_lo, nmi_hi, reset_lo, reset_hi]);
        Self { prg }
    }

    pub fn nmi_handler(mut self, handler: &[u8]) -> Self {
        let start = offset(NMI_HANDLER);
        self.prg[start..start + handler.len()].copy_from_slice(handler);
        self
    }

    /// Places `bytes` at `$9000`.
    pub fn data(mut self, bytes: &[u8]) -> Self {
        let start = offset(DATA_ORIGIN);
        self.prg[start..start + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn cartridge(self) -> Result<Nrom> {
        Ok(Nrom::new(self.prg, Vec::new(), Mirroring::Vertical)?)
    }

    pub fn boot(self, region: Region) -> Result<Nes> {
        let nes = NesBuilder::new()
            .region(region)
            .cartridge(self.cartridge()?)
            .build()
            .context("building console")?;
        Ok(nes)
    }
}

fn offset(addr: u16) -> usize {
    usize::from(addr - PRG_ORIGIN) & 0x3FFF
}

/// Ticks until `count` CPU slots have been given to the instruction engine.
pub fn run_cpu_slots(nes: &mut Nes, count: usize) {
    let mut seen = 0;
    while seen < count {
        if nes.tick().owner == SlotOwner::Cpu {
            seen += 1;
        }
    }
}

/// Ticks until `done` returns `true`, failing after `limit` ticks.
pub fn run_until<F>(nes: &mut Nes, limit: u64, mut done: F) -> Result<u64>
where
    F: FnMut(&Nes) -> bool,
{
    for ticks in 0..limit {
        if done(nes) {
            return Ok(ticks);
        }
        nes.tick();
    }
    anyhow::bail!("condition not reached within {limit} ticks")
}
