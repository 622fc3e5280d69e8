mod common;

use anyhow::Result;
use common::{Rom, run_until};
use famitick_core::{Nes, Region, SlotOwner};
use rand::{Rng, SeedableRng, rngs::StdRng};

const OAM_START: u8 = 0x20;

/// Copies 256 bytes from `$9000` to `$0200`, sets OAMADDR, optionally burns
/// three CPU cycles, then writes `$4014`.
fn dma_program(shift_parity: bool) -> Vec<u8> {
    let mut program = vec![
        0xA2, 0x00, // LDX #$00
        0xBD, 0x00, 0x90, // LDA $9000,X
        0x9D, 0x00, 0x02, // STA $0200,X
        0xE8, // INX
        0xD0, 0xF7, // BNE $8002
        0xA9, OAM_START, // LDA #$20
        0x8D, 0x03, 0x20, // STA $2003
    ];
    if shift_parity {
        program.extend_from_slice(&[0xA5, 0x00]); // LDA $00
    }
    program.extend_from_slice(&[
        0xA9, 0x02, // LDA #$02
        0x8D, 0x14, 0x40, // STA $4014
    ]);
    let [lo, hi] = (0x8000 + program.len() as u16).to_le_bytes();
    program.extend_from_slice(&[0x4C, lo, hi]);
    program
}

struct Transfer {
    slots: u64,
    trigger_cycle: u64,
}

fn run_transfer(nes: &mut Nes) -> Result<Transfer> {
    run_until(nes, 100_000, |nes| nes.sprite_dma().active())?;
    // The slot that wrote $4014 has already been counted.
    let trigger_cycle = nes.cpu_cycles() - 1;
    let cpu_before = nes.cpu().cycles();

    let mut slots = 0;
    while nes.sprite_dma().active() {
        match nes.tick().owner {
            SlotOwner::SpriteDma => slots += 1,
            SlotOwner::None => {}
            other => panic!("unexpected slot owner {other:?} during sprite dma"),
        }
    }
    assert_eq!(nes.cpu().cycles(), cpu_before, "cpu stalled for the transfer");
    Ok(Transfer {
        slots,
        trigger_cycle,
    })
}

#[test]
fn transfer_length_depends_on_trigger_parity() -> Result<()> {
    let mut lengths = Vec::new();
    for shift in [false, true] {
        let mut nes = Rom::new(&dma_program(shift)).boot(Region::Ntsc)?;
        let transfer = run_transfer(&mut nes)?;
        let expected = 513 + (transfer.trigger_cycle & 1);
        assert_eq!(transfer.slots, expected);
        assert_eq!(u64::from(nes.sprite_dma().ticks()), expected);
        lengths.push(transfer.slots);
    }
    lengths.sort_unstable();
    assert_eq!(lengths, vec![513, 514]);
    Ok(())
}

#[test]
fn transfer_copies_page_from_pre_trigger_oam_address() -> Result<()> {
    let mut data = [0u8; 256];
    StdRng::seed_from_u64(0x4014).fill(&mut data[..]);

    let mut nes = Rom::new(&dma_program(false))
        .data(&data)
        .boot(Region::Ntsc)?;
    run_transfer(&mut nes)?;

    assert_eq!(nes.sprite_dma().page(), 0x02);
    assert_eq!(&nes.ram()[0x200..0x300], &data[..]);
    let oam = nes.ppu().oam();
    for (i, &byte) in data.iter().enumerate() {
        let dest = usize::from(OAM_START.wrapping_add(i as u8));
        assert_eq!(oam[dest], byte, "oam[{dest:#04X}]");
    }
    assert_eq!(nes.ppu().oam_addr(), OAM_START);
    Ok(())
}

#[test]
fn cpu_slots_are_shared_between_engine_and_dma() -> Result<()> {
    let mut nes = Rom::new(&dma_program(true)).boot(Region::Pal)?;
    let transfer = run_transfer(&mut nes)?;
    nes.run_frame()?;
    assert_eq!(nes.cpu().cycles() + transfer.slots, nes.cpu_cycles());
    Ok(())
}
