mod common;

use std::{sync::mpsc, thread};

use anyhow::Result;
use common::Rom;
use famitick_core::{ColorFormat, NesBuilder, Region};

/// JMP $8000
const SPIN: [u8; 3] = [0x4C, 0x00, 0x80];

#[test]
fn one_frame_is_published_per_run_frame() -> Result<()> {
    let mut nes = Rom::new(&SPIN).boot(Region::Ntsc)?;
    let frames = nes.frame_receiver();
    assert_eq!(frames.latest_seq(), 0);
    for expected in 1..=3 {
        nes.run_frame()?;
        assert_eq!(frames.latest_seq(), expected);
    }
    assert_eq!(frames.dropped(), 0);

    let frame = frames.lock();
    assert_eq!(frame.seq, 3);
    assert_eq!(frame.pixels.len(), frame.pitch() * frame.height());
    assert_eq!(frame.width(), 256);
    Ok(())
}

#[test]
fn held_frame_is_dropped_without_stalling_the_core() -> Result<()> {
    let mut nes = Rom::new(&SPIN).boot(Region::Ntsc)?;
    let frames = nes.frame_receiver();
    nes.run_frame()?;

    let guard = frames.lock();
    let ticks = nes.run_frame()?;
    drop(guard);

    assert_eq!(ticks, 89_342);
    assert_eq!(frames.latest_seq(), 1);
    assert_eq!(frames.dropped(), 1);

    nes.run_frame()?;
    assert_eq!(frames.latest_seq(), 2);
    Ok(())
}

#[test]
fn receiver_works_from_another_thread() -> Result<()> {
    let cart = Rom::new(&SPIN).cartridge()?;
    let mut nes = NesBuilder::new()
        .region(Region::Pal)
        .color_format(ColorFormat::Rgb565)
        .cartridge(cart)
        .build()?;
    let frames = nes.frame_receiver();
    let (tx, rx) = mpsc::channel::<()>();
    let (ack_tx, ack_rx) = mpsc::channel::<u64>();

    let consumer = thread::spawn(move || {
        let mut out = Vec::new();
        while rx.recv().is_ok() {
            let seq = frames.copy_latest(&mut out);
            if ack_tx.send(seq).is_err() {
                break;
            }
        }
        out.len()
    });

    let mut seqs = Vec::new();
    for _ in 0..4 {
        nes.run_frame()?;
        tx.send(())?;
        seqs.push(ack_rx.recv()?);
    }
    drop(tx);

    let len = consumer.join().expect("consumer thread");
    assert_eq!(seqs, vec![1, 2, 3, 4]);
    assert_eq!(len, ColorFormat::Rgb565.frame_len());
    Ok(())
}
