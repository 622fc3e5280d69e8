//! Framebuffer packing and the single-slot frame handoff.
//!
//! The pipeline draws into a private back buffer. At the end of each frame the
//! back buffer is swapped into the shared slot if the consumer is not holding
//! it; otherwise the frame is counted as dropped and the core moves on.
//! Publishing never blocks.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH, palette::Color};

/// How a color is packed into the byte buffer.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    /// `0RRRRRGGGGGBBBBB`, little endian.
    Rgb555,
    /// `RRRRRGGGGGGBBBBB`, little endian.
    Rgb565,
    Rgb888,
    #[default]
    Rgba8888,
    Bgra8888,
    Argb8888,
}

impl ColorFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorFormat::Rgb555 | ColorFormat::Rgb565 => 2,
            ColorFormat::Rgb888 => 3,
            ColorFormat::Rgba8888 | ColorFormat::Bgra8888 | ColorFormat::Argb8888 => 4,
        }
    }

    /// Bytes in one full frame.
    #[inline]
    pub const fn frame_len(self) -> usize {
        SCREEN_WIDTH * SCREEN_HEIGHT * self.bytes_per_pixel()
    }

    fn pack(self, color: Color, out: &mut [u8]) {
        let Color { r, g, b } = color;
        match self {
            ColorFormat::Rgb555 => {
                let packed = (u16::from(r >> 3) << 10) | (u16::from(g >> 3) << 5) | u16::from(b >> 3);
                out.copy_from_slice(&packed.to_le_bytes());
            }
            ColorFormat::Rgb565 => {
                let packed = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
                out.copy_from_slice(&packed.to_le_bytes());
            }
            ColorFormat::Rgb888 => out.copy_from_slice(&[r, g, b]),
            ColorFormat::Rgba8888 => out.copy_from_slice(&[r, g, b, 0xFF]),
            ColorFormat::Bgra8888 => out.copy_from_slice(&[b, g, r, 0xFF]),
            ColorFormat::Argb8888 => out.copy_from_slice(&[0xFF, r, g, b]),
        }
    }
}

/// The back buffer the pipeline draws into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    format: ColorFormat,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(format: ColorFormat) -> Self {
        Self {
            format,
            pixels: vec![0; format.frame_len()],
        }
    }

    #[inline]
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn write_color(&mut self, x: usize, y: usize, color: Color) {
        let bpp = self.format.bytes_per_pixel();
        let start = (y * SCREEN_WIDTH + x) * bpp;
        debug_assert!(start + bpp <= self.pixels.len());
        self.format.pack(color, &mut self.pixels[start..start + bpp]);
    }
}

/// A published frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// `0` until the first publish; increments by one per published frame.
    pub seq: u64,
    pub format: ColorFormat,
    pub pixels: Vec<u8>,
}

impl Frame {
    #[inline]
    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    #[inline]
    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        SCREEN_WIDTH * self.format.bytes_per_pixel()
    }
}

#[derive(Debug)]
struct Shared {
    slot: Mutex<Frame>,
    published: AtomicU64,
    dropped: AtomicU64,
}

/// Producer half, owned by the console.
#[derive(Debug, Clone)]
pub(crate) struct FrameHandoff {
    shared: Arc<Shared>,
}

impl FrameHandoff {
    pub(crate) fn new(format: ColorFormat) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Frame {
                    seq: 0,
                    format,
                    pixels: vec![0; format.frame_len()],
                }),
                published: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Swaps `back` into the slot. After a successful publish `back` holds
    /// the previously published pixels, which the next frame overwrites.
    pub(crate) fn publish(&self, back: &mut FrameBuffer) -> bool {
        let Some(mut frame) = self.shared.slot.try_lock() else {
            let dropped = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            trace!(dropped, "frame dropped, consumer holds the slot");
            return false;
        };
        std::mem::swap(&mut frame.pixels, &mut back.pixels);
        let seq = self.shared.published.fetch_add(1, Ordering::Release) + 1;
        frame.seq = seq;
        trace!(seq, "frame published");
        true
    }

    pub(crate) fn receiver(&self) -> FrameReceiver {
        FrameReceiver {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Consumer half. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    shared: Arc<Shared>,
}

impl FrameReceiver {
    /// Sequence number of the newest published frame.
    pub fn latest_seq(&self) -> u64 {
        self.shared.published.load(Ordering::Acquire)
    }

    /// Frames the producer could not publish because the slot was held.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Holds the slot. The producer drops frames while the guard lives.
    pub fn lock(&self) -> MutexGuard<'_, Frame> {
        self.shared.slot.lock()
    }

    /// Copies the newest frame into `out` and returns its sequence number.
    pub fn copy_latest(&self, out: &mut Vec<u8>) -> u64 {
        let frame = self.shared.slot.lock();
        out.clear();
        out.extend_from_slice(&frame.pixels);
        frame.seq
    }
}
