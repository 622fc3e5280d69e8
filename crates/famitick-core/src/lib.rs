//! Cycle-exact core of an 8-bit console: CPU, pixel pipeline and the two
//! cycle-stealing DMA engines, driven one master tick at a time.
//!
//! Build a console with [`NesBuilder`], then call [`Nes::tick`] (or
//! [`Nes::run_frame`]). Finished frames are published to a
//! [`FrameReceiver`] that another thread may hold.

use tracing::debug;

use crate::{
    apu::Dmc,
    bus::{
        OpenBus,
        cpu::{CpuBus, Devices},
    },
    clock::MasterClock,
    controller::Controller,
    cpu::Cpu,
    dma::{DmaInteractionLedger, InterruptedTransfer, SampleDma, SpriteDma},
    ppu::{Ppu, blanking::BlankingLedger, buffer::FrameHandoff},
};

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod clock;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod dma;
pub mod error;
pub mod mem_block;
pub mod memory;
pub mod ppu;
pub mod reset_kind;
pub mod state;

pub use apu::{AudioUnit, SilentAudio};
pub use cartridge::{Cartridge, Mirroring, Nrom};
pub use clock::Position;
pub use config::{NesBuilder, Region, TimingProfile};
pub use controller::Buttons;
pub use cpu::CpuState;
pub use error::Error;
pub use ppu::buffer::{ColorFormat, Frame, FrameReceiver};
pub use reset_kind::ResetKind;
pub use state::NesSnapshot;

/// Who used the CPU slot of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotOwner {
    /// The tick hosts no CPU cycle.
    None,
    Cpu,
    SpriteDma,
    SampleDma,
    /// The CPU slot went unused because a JAM opcode stopped the engine.
    Halted,
}

/// Result of a single [`Nes::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickReport {
    pub owner: SlotOwner,
    /// The tick was the last of its frame; the frame has been published.
    pub frame_complete: bool,
}

/// Everything that measures time. Reset replaces it in one assignment.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Timing {
    pub(crate) clock: MasterClock,
    pub(crate) blanking: BlankingLedger,
    pub(crate) sprite_dma: SpriteDma,
    pub(crate) sample_dma: SampleDma,
    pub(crate) dma_ledger: DmaInteractionLedger,
}

#[derive(Debug)]
pub struct Nes {
    cpu: Cpu,
    devices: Devices,
    timing: Timing,
    profile: TimingProfile,
    handoff: FrameHandoff,
}

impl Nes {
    /// Assembles a powered-on console. Configuration is validated by
    /// [`NesBuilder::build`], the only caller.
    pub(crate) fn from_parts(
        profile: TimingProfile,
        format: ColorFormat,
        cartridge: Box<dyn Cartridge>,
        audio: Box<dyn AudioUnit>,
    ) -> Self {
        let mut nes = Self {
            cpu: Cpu::new(),
            devices: Devices::new(&profile, format, cartridge, audio),
            timing: Timing::default(),
            profile,
            handoff: FrameHandoff::new(format),
        };
        nes.reset(ResetKind::PowerOn);
        nes
    }

    /// Resets the console. Both kinds restart the master clock, the blanking
    /// ledger and the DMA engines; only a power-on clears memory.
    pub fn reset(&mut self, kind: ResetKind) {
        self.cpu.reset(kind);
        self.devices.ppu.reset(kind);
        self.devices.dmc = Dmc::new(self.profile.dmc_rates);
        self.devices.sprite_dma_request = None;
        match kind {
            ResetKind::PowerOn => {
                self.devices.ram.fill(0);
                self.devices.open_bus = OpenBus::new();
                self.devices.controllers = [Controller::new(); 2];
                self.devices.cartridge.power_on();
            }
            ResetKind::Soft => self.devices.cartridge.reset(),
        }
        self.timing = Timing::default();
        debug!(?kind, region = %self.profile.region, "console reset");
    }

    /// Advances the console by exactly one master tick.
    ///
    /// The pixel pipeline always advances first. If the tick hosts a CPU
    /// cycle, an active DMA engine takes the slot, otherwise the instruction
    /// engine runs. The DMC and the audio unit are clocked after the slot.
    pub fn tick(&mut self) -> TickReport {
        let now = self.timing.clock.now();
        let pos = self.timing.clock.position(&self.profile);
        let end_of_frame = self.devices.ppu.tick(
            now,
            pos,
            self.timing.clock.odd_frame(),
            &mut self.timing.blanking,
            &mut *self.devices.cartridge,
        );

        let owner = if self.timing.clock.is_cpu_tick(&self.profile) {
            self.cpu_slot(now, pos.scanline)
        } else {
            SlotOwner::None
        };

        if end_of_frame {
            self.handoff.publish(self.devices.ppu.frame_buffer_mut());
        }
        self.timing.clock.advance(end_of_frame);

        TickReport {
            owner,
            frame_complete: end_of_frame,
        }
    }

    fn cpu_slot(&mut self, now: u64, line: u16) -> SlotOwner {
        let cpu_cycle = self.timing.clock.cpu_cycles(&self.profile);
        let timing = &mut self.timing;

        if timing.sample_dma.active()
            && let Some(kind) = timing.sprite_dma.pause()
        {
            let transfer = InterruptedTransfer {
                byte: timing.sprite_dma.scratch(),
                dest: self.devices.ppu.oam_addr(),
                kind,
            };
            timing.dma_ledger.record_pause(now, transfer);
        }

        let mut bus = CpuBus::new(
            &mut self.devices,
            &mut timing.blanking,
            &self.profile,
            now,
            line,
            cpu_cycle,
        );
        let mut fetched = None;
        let owner = if timing.sample_dma.active() {
            fetched = timing
                .sample_dma
                .step(&mut bus, self.profile.sample_dma_reread);
            SlotOwner::SampleDma
        } else if timing.sprite_dma.active() {
            timing.sprite_dma.step(&mut bus);
            SlotOwner::SpriteDma
        } else if self.cpu.halted() {
            SlotOwner::Halted
        } else {
            self.cpu.clock(&mut bus);
            SlotOwner::Cpu
        };

        if let Some(byte) = fetched {
            self.devices.dmc.finish_fetch(byte);
            timing.dma_ledger.record_sample_finish(now);
            if timing.sprite_dma.resume() {
                timing.dma_ledger.record_resume(now);
            }
        }
        if let Some(page) = self.devices.sprite_dma_request.take() {
            timing.sprite_dma.start(page, cpu_cycle);
        }
        if let Some(addr) = self.devices.dmc.clock() {
            timing.sample_dma.start(addr);
            timing.dma_ledger.record_sample_start(now);
        }

        self.devices.audio.clock();
        if let Some(level) = self.devices.dmc.take_level_change() {
            self.devices.audio.set_dmc_level(level);
        }
        owner
    }

    /// Runs until the pipeline completes a frame and returns the ticks it
    /// took (a partial frame when called mid-frame).
    pub fn run_frame(&mut self) -> Result<u64, Error> {
        let mut ticks = 0;
        loop {
            let report = self.tick();
            ticks += 1;
            if report.owner == SlotOwner::Halted
                && let CpuState::Halted { opcode, pc } = self.cpu.state()
            {
                return Err(Error::Halted { opcode, pc });
            }
            if report.frame_complete {
                return Ok(ticks);
            }
        }
    }

    pub fn profile(&self) -> &TimingProfile {
        &self.profile
    }

    /// Ticks since the last reset.
    pub fn master_ticks(&self) -> u64 {
        self.timing.clock.now()
    }

    /// CPU slots since the last reset, whoever owned them.
    pub fn cpu_cycles(&self) -> u64 {
        self.timing.clock.cpu_cycles(&self.profile)
    }

    /// Frames completed since the last reset.
    pub fn frame_count(&self) -> u64 {
        self.timing.clock.frame()
    }

    /// Coordinate of the next tick.
    pub fn position(&self) -> Position {
        self.timing.clock.position(&self.profile)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.devices.ppu
    }

    pub fn halted(&self) -> bool {
        self.cpu.halted()
    }

    pub fn blanking(&self) -> &BlankingLedger {
        &self.timing.blanking
    }

    pub fn sprite_dma(&self) -> &SpriteDma {
        &self.timing.sprite_dma
    }

    pub fn sample_dma(&self) -> &SampleDma {
        &self.timing.sample_dma
    }

    pub fn dma_ledger(&self) -> &DmaInteractionLedger {
        &self.timing.dma_ledger
    }

    /// Internal 2 KiB work RAM.
    pub fn ram(&self) -> &[u8] {
        &self.devices.ram
    }

    pub fn cartridge(&self) -> &dyn Cartridge {
        &*self.devices.cartridge
    }

    /// Replaces the held buttons of pad `port` (0 or 1). Other ports are
    /// ignored.
    pub fn set_buttons(&mut self, port: usize, buttons: Buttons) {
        if let Some(pad) = self.devices.controllers.get_mut(port) {
            pad.set_buttons(buttons);
        }
    }

    /// A new consumer handle for published frames.
    pub fn frame_receiver(&self) -> FrameReceiver {
        self.handoff.receiver()
    }

    /// Side-effect-free read of the CPU address space.
    pub fn peek(&self, addr: u16) -> u8 {
        self.devices
            .peek(addr, &self.timing.blanking, self.timing.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    use super::*;
    use crate::dma::{PauseKind, SpritePhase};

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::DEBUG)
            .pretty()
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
    }

    /// `program` at `$8000`, reset vector pointing at it.
    fn console(program: &[u8]) -> Nes {
        let mut prg = vec![0xEA; 0x4000];
        prg[..program.len()].copy_from_slice(program);
        prg[0x3FFC] = 0x00;
        prg[0x3FFD] = 0x80;
        let cart = Nrom::new(prg, Vec::new(), Mirroring::Vertical).expect("nrom");
        NesBuilder::new().cartridge(cart).build().expect("console")
    }

    const SPIN: [u8; 3] = [0x4C, 0x00, 0x80];

    #[test]
    fn cpu_reaches_reset_vector_after_seven_slots() {
        let mut nes = console(&SPIN);
        let mut cpu_slots = 0;
        while cpu_slots < 7 {
            if nes.tick().owner == SlotOwner::Cpu {
                cpu_slots += 1;
            }
        }
        assert_eq!(nes.cpu().registers().pc, 0x8000);
        assert_eq!(nes.cpu().registers().s, 0xFD);
        assert!(nes.cpu().at_boundary());
    }

    #[test]
    fn sample_dma_during_sprite_read_duplicates_held_byte() {
        let mut nes = console(&SPIN);
        for i in 0..=255u8 {
            nes.devices.ram[0x200 + usize::from(i)] = i;
        }
        nes.timing.sprite_dma.start(0x02, 0);
        while !(nes.sprite_dma().offset() == 10 && nes.sprite_dma().phase() == SpritePhase::Writing)
        {
            nes.tick();
        }
        nes.timing.sample_dma.start(0xC000);
        while nes.sprite_dma().active() || nes.sample_dma().active() {
            nes.tick();
        }

        assert_eq!(
            nes.dma_ledger().interrupted(),
            Some(InterruptedTransfer {
                byte: 9,
                dest: 9,
                kind: PauseKind::DuringRead,
            })
        );
        let oam = nes.ppu().oam();
        assert_eq!(oam[9], 9);
        assert_eq!(oam[10], 9);
        assert_eq!(oam[11], 10);
        assert_eq!(oam[0], 0xFF);
        assert_eq!(nes.sprite_dma().ticks(), 514);

        let ledger = nes.dma_ledger();
        let paused = ledger.sprite_paused_at().expect("paused");
        let resumed = ledger.sprite_resumed_at().expect("resumed");
        // Four CPU slots of sample DMA, three ticks apart.
        assert_eq!(resumed - paused, 9);
    }

    #[test]
    fn halted_cpu_fails_run_frame() {
        let mut nes = console(&[0x02]);
        let err = nes.run_frame().expect_err("jam halts");
        assert!(matches!(err, Error::Halted { opcode: 0x02, .. }));
        nes.reset(ResetKind::Soft);
        assert!(!nes.halted());
    }

    #[test]
    fn soft_reset_restarts_timing_but_keeps_ram() {
        // LDA #$42; STA $10; JMP $8004
        let mut nes = console(&[0xA9, 0x42, 0x85, 0x10, 0x4C, 0x04, 0x80]);
        nes.run_frame().expect("frame");
        assert_eq!(nes.ram()[0x10], 0x42);
        assert_eq!(nes.frame_count(), 1);

        nes.reset(ResetKind::Soft);
        assert_eq!(nes.master_ticks(), 0);
        assert_eq!(nes.frame_count(), 0);
        assert_eq!(nes.blanking().last_set(), None);
        assert_eq!(nes.ram()[0x10], 0x42);

        nes.reset(ResetKind::PowerOn);
        assert_eq!(nes.ram()[0x10], 0);
    }

    #[test]
    fn peek_reads_without_side_effects() {
        let mut nes = console(&SPIN);
        nes.run_frame().expect("frame");
        assert_eq!(nes.peek(0xFFFD), 0x80);
        assert_eq!(nes.peek(0x8000), 0x4C);
        let before = nes.blanking().last_read();
        nes.peek(0x2002);
        assert_eq!(nes.blanking().last_read(), before);
    }
}
