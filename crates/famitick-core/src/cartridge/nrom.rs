//! NROM board: no banking, 16 or 32 KiB PRG ROM, 8 KiB CHR ROM or RAM.
//!
//! - 16 KiB PRG is mirrored at `$8000-$BFFF` and `$C000-$FFFF`.
//! - 8 KiB of PRG RAM is always present at `$6000-$7FFF`.
//! - An empty CHR image selects 8 KiB of CHR RAM.

use tracing::debug;

use crate::{
    cartridge::{Cartridge, Mirroring},
    error::Error,
    mem_block::cpu::PrgRam,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

const PRG_BANK: usize = 0x4000;

#[derive(Debug, Clone)]
pub struct Nrom {
    prg_rom: Box<[u8]>,
    prg_ram: PrgRam,
    chr: Box<[u8]>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Nrom {
    /// Builds a board from raw PRG and CHR images.
    ///
    /// PRG must be exactly 16 or 32 KiB and CHR must be empty (CHR RAM) or
    /// exactly 8 KiB.
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, mirroring: Mirroring) -> Result<Self, Error> {
        let board = Self::new_unchecked(prg_rom, chr, mirroring);
        board.validate()?;
        Ok(board)
    }

    /// Builds a board without size checks. [`Cartridge::validate`] still
    /// rejects it when the console is built.
    pub fn new_unchecked(prg_rom: Vec<u8>, chr: Vec<u8>, mirroring: Mirroring) -> Self {
        let chr_is_ram = chr.is_empty();
        let chr = if chr_is_ram {
            vec![0; ppu_mem::CHR_SIZE]
        } else {
            chr
        };
        Self {
            prg_rom: prg_rom.into_boxed_slice(),
            prg_ram: PrgRam::new(),
            chr: chr.into_boxed_slice(),
            chr_is_ram,
            mirroring,
        }
    }

    fn prg_rom_index(&self, addr: u16) -> usize {
        (addr - cpu_mem::PRG_ROM_START) as usize % self.prg_rom.len()
    }

    fn prg_ram_index(addr: u16) -> usize {
        (addr - cpu_mem::PRG_RAM_START) as usize
    }
}

impl Cartridge for Nrom {
    fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        self.cpu_peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if (cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END).contains(&addr) {
            self.prg_ram[Self::prg_ram_index(addr)] = value;
        }
    }

    fn cpu_peek(&self, addr: u16) -> Option<u8> {
        match addr {
            cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END => {
                Some(self.prg_ram[Self::prg_ram_index(addr)])
            }
            cpu_mem::PRG_ROM_START..=0xFFFF if !self.prg_rom.is_empty() => {
                Some(self.prg_rom[self.prg_rom_index(addr)])
            }
            _ => None,
        }
    }

    fn chr_read(&mut self, addr: u16) -> u8 {
        self.chr[addr as usize % self.chr.len()]
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let idx = addr as usize % self.chr.len();
            self.chr[idx] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn power_on(&mut self) {
        self.prg_ram.fill(0);
        if self.chr_is_ram {
            self.chr.fill(0);
        }
    }

    fn validate(&self) -> Result<(), Error> {
        let prg = self.prg_rom.len();
        if prg != PRG_BANK && prg != 2 * PRG_BANK {
            return Err(Error::MalformedCartridge(format!(
                "NROM PRG ROM must be 16 or 32 KiB, got {prg} bytes"
            )));
        }
        if self.chr.len() != ppu_mem::CHR_SIZE {
            return Err(Error::MalformedCartridge(format!(
                "NROM CHR must be 8 KiB, got {} bytes",
                self.chr.len()
            )));
        }
        debug!(prg, chr_ram = self.chr_is_ram, "nrom board validated");
        Ok(())
    }
}
