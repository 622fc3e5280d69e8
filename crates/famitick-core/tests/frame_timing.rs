mod common;

use anyhow::Result;
use common::Rom;
use ctor::ctor;
use famitick_core::{Region, SlotOwner, TimingProfile};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

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

/// LDA #$18; STA $2001; JMP $8005
const ENABLE_RENDERING: [u8; 8] = [0xA9, 0x18, 0x8D, 0x01, 0x20, 0x4C, 0x05, 0x80];
/// JMP $8000
const SPIN: [u8; 3] = [0x4C, 0x00, 0x80];

#[test]
fn ntsc_frames_without_rendering_never_skip() -> Result<()> {
    let mut nes = Rom::new(&SPIN).boot(Region::Ntsc)?;
    for _ in 0..4 {
        assert_eq!(nes.run_frame()?, 89_342);
    }
    assert_eq!(nes.master_ticks(), 4 * 89_342);
    Ok(())
}

#[test]
fn ntsc_odd_frames_drop_one_dot_while_rendering() -> Result<()> {
    let mut nes = Rom::new(&ENABLE_RENDERING).boot(Region::Ntsc)?;
    let lengths = (0..4)
        .map(|_| nes.run_frame())
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(lengths, vec![89_342, 89_341, 89_342, 89_341]);
    assert_eq!(nes.frame_count(), 4);
    // Every frame starts at the top-left dot.
    assert_eq!(nes.position().scanline, 0);
    assert_eq!(nes.position().dot, 0);
    Ok(())
}

#[test]
fn pal_frames_have_fixed_length() -> Result<()> {
    let mut nes = Rom::new(&ENABLE_RENDERING).boot(Region::Pal)?;
    let frame = TimingProfile::PAL.frame_ticks();
    assert_eq!(frame, 106_392);
    for _ in 0..3 {
        assert_eq!(nes.run_frame()?, frame);
    }
    Ok(())
}

#[test]
fn ntsc_cpu_runs_once_per_three_ticks() -> Result<()> {
    let mut nes = Rom::new(&SPIN).boot(Region::Ntsc)?;
    let mut cpu_slots = 0u64;
    for n in 0..3000u64 {
        let report = nes.tick();
        if report.owner == SlotOwner::Cpu {
            cpu_slots += 1;
            assert_eq!(n % 3, 1, "cpu slot on tick {n}");
        } else {
            assert_eq!(report.owner, SlotOwner::None);
        }
    }
    assert_eq!(cpu_slots, 1000);
    assert_eq!(nes.cpu_cycles(), 1000);
    assert_eq!(nes.cpu().cycles(), 1000);
    Ok(())
}

#[test]
fn pal_cpu_runs_five_times_per_sixteen_ticks() -> Result<()> {
    let mut nes = Rom::new(&SPIN).boot(Region::Pal)?;
    let cpu_slots = (0..16_000)
        .filter(|_| nes.tick().owner == SlotOwner::Cpu)
        .count();
    assert_eq!(cpu_slots, 5000);
    assert_eq!(nes.cpu().cycles(), 5000);
    Ok(())
}
