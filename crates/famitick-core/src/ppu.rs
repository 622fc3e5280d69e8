//! Pixel pipeline.
//!
//! [`Ppu::tick`] advances exactly one dot at the coordinate handed in by the
//! master clock; the pipeline keeps no scanline or dot counter of its own.
//! Each dot runs, in order: blanking transitions, the background shift and
//! fetch schedule, sprite evaluation and sprite fetches, then pixel output.
//! The return value tells the clock whether the frame ended on this dot,
//! which is the only place the odd-frame skip is decided.

pub mod blanking;
pub mod buffer;
pub mod palette;

mod background_pipeline;
mod registers;
mod scroll;
mod sprite;
mod sprite_eval;
mod sprite_pipeline;

pub use scroll::{Scroll, VramAddr};

use tracing::debug;

use crate::{
    cartridge::Cartridge,
    clock::Position,
    config::{DOTS_PER_SCANLINE, TimingProfile, VBLANK_SET_LINE},
    mem_block::ppu::{Ciram, OamRam, PaletteRam, SecondaryOamRam},
    memory::ppu::{self as ppu_mem, Register},
    reset_kind::ResetKind,
};
use background_pipeline::{BgPipeline, TileLatch};
use blanking::BlankingLedger;
use buffer::{ColorFormat, FrameBuffer};
use palette::NES_PALETTE;
use registers::{Control, Mask, Status, VBLANK_BIT};
use sprite::SpriteAttributes;
use sprite_eval::SpriteEval;
use sprite_pipeline::{SpritePipeline, SpritePixel, SpriteRow};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

const VISIBLE_LINES: u16 = SCREEN_HEIGHT as u16;
const LAST_DOT: u16 = DOTS_PER_SCANLINE - 1;

#[derive(Debug, Clone)]
pub struct Ppu {
    control: Control,
    mask: Mask,
    status: Status,
    oam_addr: u8,
    scroll: Scroll,
    /// Delayed `$2007` read value.
    read_buffer: u8,
    /// Last value driven on the PPU data bus; write-only registers read it.
    io_latch: u8,

    ciram: Ciram,
    palette_ram: PaletteRam,
    oam: OamRam,
    secondary: SecondaryOamRam,

    tile: TileLatch,
    bg: BgPipeline,
    eval: SpriteEval,
    rows: [SpriteRow; 8],
    sprites: SpritePipeline,

    profile: TimingProfile,
    frame: FrameBuffer,
}

impl Ppu {
    pub fn new(profile: &TimingProfile, format: ColorFormat) -> Self {
        Self {
            control: Control::empty(),
            mask: Mask::empty(),
            status: Status::empty(),
            oam_addr: 0,
            scroll: Scroll::default(),
            read_buffer: 0,
            io_latch: 0,
            ciram: Ciram::new(),
            palette_ram: PaletteRam::new(),
            oam: OamRam::new(),
            secondary: SecondaryOamRam::filled(0xFF),
            tile: TileLatch::default(),
            bg: BgPipeline::default(),
            eval: SpriteEval::default(),
            rows: [SpriteRow::default(); 8],
            sprites: SpritePipeline::default(),
            profile: *profile,
            frame: FrameBuffer::new(format),
        }
    }

    /// Power-on clears every memory; the reset button only clears the
    /// registers it is wired to.
    pub fn reset(&mut self, kind: ResetKind) {
        match kind {
            ResetKind::PowerOn => *self = Self::new(&self.profile, self.frame.format()),
            ResetKind::Soft => {
                self.control = Control::empty();
                self.mask = Mask::empty();
                self.scroll.w = false;
                self.scroll.x = 0;
                self.read_buffer = 0;
            }
        }
        debug!(?kind, "ppu reset");
    }

    /// Advances one dot. Returns `true` on the last dot of the frame.
    pub(crate) fn tick(
        &mut self,
        now: u64,
        pos: Position,
        odd_frame: bool,
        ledger: &mut BlankingLedger,
        cart: &mut dyn Cartridge,
    ) -> bool {
        let Position { scanline: line, dot } = pos;
        let prerender = line == self.profile.prerender_line();
        let visible = line < VISIBLE_LINES;
        let rendering = self.mask.rendering_enabled();

        if line == VBLANK_SET_LINE && dot == 1 {
            ledger.set(now);
        } else if prerender && dot == 1 {
            ledger.clear(now);
            self.status = Status::empty();
        }

        if rendering && (visible || prerender) {
            self.render_dot(line, dot, prerender, cart);
        } else if visible && (1..=256).contains(&dot) {
            self.put_backdrop(line, dot);
        }

        prerender
            && (dot == LAST_DOT
                || (dot == LAST_DOT - 1 && odd_frame && rendering && self.profile.odd_frame_skip))
    }

    fn render_dot(&mut self, line: u16, dot: u16, prerender: bool, cart: &mut dyn Cartridge) {
        if (2..=257).contains(&dot) || (322..=337).contains(&dot) {
            self.bg.shift();
        }
        if ((9..=257).contains(&dot) || (329..=337).contains(&dot)) && (dot - 1) % 8 == 0 {
            self.bg.reload(&self.tile);
        }
        if (1..=256).contains(&dot) || (321..=336).contains(&dot) {
            self.fetch_background(dot, cart);
        } else if dot == 337 || dot == 339 {
            let _ = self.vram_read(self.scroll.v.tile_addr(), cart);
        }
        match dot {
            256 => self.scroll.v.increment_y(),
            257 => self.scroll.copy_horizontal(),
            280..=304 if prerender => self.scroll.copy_vertical(),
            _ => {}
        }

        if !prerender {
            match dot {
                1..=64 => self.eval.clear_step(dot, &mut self.secondary),
                65..=256 => {
                    let height = self.control.sprite_height();
                    if self.eval.step(dot, line, height, &self.oam, &mut self.secondary) {
                        self.status.insert(Status::SPRITE_OVERFLOW);
                    }
                }
                _ => {}
            }
        }
        if (257..=320).contains(&dot) {
            self.oam_addr = 0;
            self.fetch_sprite(line, dot, prerender, cart);
        }

        if !prerender && (1..=256).contains(&dot) {
            self.compose_pixel(line, dot);
        }
    }

    /// Nametable, attribute, pattern low, pattern high; coarse X steps after
    /// the last fetch of each group.
    fn fetch_background(&mut self, dot: u16, cart: &mut dyn Cartridge) {
        let v = self.scroll.v;
        match (dot - 1) % 8 {
            0 => self.tile.tile = self.vram_read(v.tile_addr(), cart),
            2 => {
                let attribute = self.vram_read(v.attribute_addr(), cart);
                self.tile.palette = (attribute >> v.attribute_shift()) & 0x03;
            }
            4 => self.tile.pattern_low = cart.chr_read(self.background_pattern_addr()),
            6 => self.tile.pattern_high = cart.chr_read(self.background_pattern_addr() + 8),
            7 => self.scroll.v.increment_x(),
            _ => {}
        }
    }

    fn background_pattern_addr(&self) -> u16 {
        self.control.background_pattern_table()
            + u16::from(self.tile.tile) * 16
            + self.scroll.v.fine_y()
    }

    /// Eight 8-dot slots. Slots beyond the sprites found fetch tile `$FF`
    /// and are loaded transparent.
    fn fetch_sprite(&mut self, line: u16, dot: u16, prerender: bool, cart: &mut dyn Cartridge) {
        let offset = dot - 257;
        let slot = usize::from(offset / 8);
        let found = if prerender {
            0
        } else {
            usize::from(self.eval.found())
        };
        let height = self.control.sprite_height();
        let table = self.control.sprite_pattern_table();

        match offset % 8 {
            0 => {
                let bytes = &self.secondary[slot * 4..slot * 4 + 4];
                self.rows[slot] = SpriteRow {
                    y: bytes[0],
                    tile: bytes[1],
                    attributes: bytes[2],
                    x: bytes[3],
                    ..SpriteRow::default()
                };
            }
            plane @ (4 | 6) => {
                let row = &mut self.rows[slot];
                let data = if slot < found {
                    let attributes = SpriteAttributes::from_bits_retain(row.attributes);
                    let sprite_row = line.wrapping_sub(u16::from(row.y)) as u8;
                    let addr = sprite::pattern_addr(row.tile, attributes, sprite_row, height, table);
                    cart.chr_read(addr + if plane == 6 { 8 } else { 0 })
                } else {
                    let addr = sprite::pattern_addr(0xFF, SpriteAttributes::empty(), 0, height, table);
                    let _ = cart.chr_read(addr + if plane == 6 { 8 } else { 0 });
                    0
                };
                if plane == 4 {
                    row.pattern_low = data;
                } else {
                    row.pattern_high = data;
                }
            }
            _ => {}
        }

        if dot == 320 {
            let sprite0 = !prerender && self.eval.sprite0_next();
            self.sprites.load(&self.rows[..found], sprite0);
        }
    }

    fn compose_pixel(&mut self, line: u16, dot: u16) {
        let x = dot - 1;
        let (bg_palette, bg_pattern) = if self.mask.background_at(x) {
            self.bg.sample(self.scroll.x)
        } else {
            (0, 0)
        };
        let sprite = self.sprites.sample_and_shift();
        let sprite = if self.mask.sprites_at(x) {
            sprite
        } else {
            SpritePixel::default()
        };

        if sprite.sprite0 && sprite.color != 0 && bg_pattern != 0 && x != 255 {
            self.status.insert(Status::SPRITE_ZERO_HIT);
        }

        let bg_addr = ppu_mem::PALETTE_BASE + u16::from(bg_palette * 4 + bg_pattern);
        let sprite_addr = ppu_mem::PALETTE_BASE + 0x10 + u16::from(sprite.palette * 4 + sprite.color);
        let addr = match (bg_pattern, sprite.color) {
            (0, 0) => ppu_mem::PALETTE_BASE,
            (0, _) => sprite_addr,
            (_, 0) => bg_addr,
            _ if sprite.behind_background => bg_addr,
            _ => sprite_addr,
        };
        self.put_palette_entry(line, x, addr);
    }

    /// Rendering disabled: the backdrop, or the palette entry `v` points at.
    fn put_backdrop(&mut self, line: u16, dot: u16) {
        let v = self.scroll.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
        let addr = if v >= ppu_mem::PALETTE_BASE {
            v
        } else {
            ppu_mem::PALETTE_BASE
        };
        self.put_palette_entry(line, dot - 1, addr);
    }

    fn put_palette_entry(&mut self, line: u16, x: u16, addr: u16) {
        let index = palette::read(&self.palette_ram, addr) & self.mask.color_mask();
        self.frame
            .write_color(usize::from(x), usize::from(line), NES_PALETTE[usize::from(index)]);
    }

    fn vram_read(&mut self, addr: u16, cart: &mut dyn Cartridge) -> u8 {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0x0000..=0x1FFF => cart.chr_read(addr),
            0x2000..=0x3EFF => self.ciram[cart.mirroring().ciram_offset(addr)],
            _ => palette::read(&self.palette_ram, addr),
        }
    }

    fn vram_write(&mut self, addr: u16, value: u8, cart: &mut dyn Cartridge) {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0x0000..=0x1FFF => cart.chr_write(addr, value),
            0x2000..=0x3EFF => self.ciram[cart.mirroring().ciram_offset(addr)] = value,
            _ => palette::write(&mut self.palette_ram, addr, value),
        }
    }

    /// `$2007` step. While rendering, the access instead bumps coarse X and
    /// fine Y together.
    fn step_data_addr(&mut self, rendering_line: bool) {
        if rendering_line && self.mask.rendering_enabled() {
            self.scroll.v.increment_x();
            self.scroll.v.increment_y();
        } else {
            self.scroll.v.increment(self.control.vram_increment());
        }
    }

    fn on_rendering_line(&self, line: u16) -> bool {
        line < VISIBLE_LINES || line == self.profile.prerender_line()
    }

    /// CPU read of `$2000-$3FFF`.
    pub(crate) fn cpu_read(
        &mut self,
        addr: u16,
        now: u64,
        line: u16,
        ledger: &mut BlankingLedger,
        cart: &mut dyn Cartridge,
    ) -> u8 {
        let value = match Register::from_cpu_addr(addr) {
            Register::Status => {
                let vblank = if ledger.read(now) { VBLANK_BIT } else { 0 };
                self.scroll.w = false;
                vblank | self.status.bits() | (self.io_latch & 0x1F)
            }
            Register::OamData => self.read_oam(),
            Register::Data => {
                let v = self.scroll.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
                let value = if v >= ppu_mem::PALETTE_BASE {
                    self.read_buffer = self.vram_read(v - 0x1000, cart);
                    palette::read(&self.palette_ram, v) | (self.io_latch & 0xC0)
                } else {
                    let next = self.vram_read(v, cart);
                    std::mem::replace(&mut self.read_buffer, next)
                };
                self.step_data_addr(self.on_rendering_line(line));
                value
            }
            _ => return self.io_latch,
        };
        self.io_latch = value;
        value
    }

    /// Side-effect-free view of a register read.
    pub(crate) fn cpu_peek(&self, addr: u16, now: u64, ledger: &BlankingLedger) -> u8 {
        match Register::from_cpu_addr(addr) {
            Register::Status => {
                let vblank = if ledger.visible(now) { VBLANK_BIT } else { 0 };
                vblank | self.status.bits() | (self.io_latch & 0x1F)
            }
            Register::OamData => self.read_oam(),
            Register::Data => self.read_buffer,
            _ => self.io_latch,
        }
    }

    fn read_oam(&self) -> u8 {
        let value = self.oam[usize::from(self.oam_addr)];
        if self.oam_addr & 0x03 == 2 {
            value & sprite::ATTRIBUTE_READ_MASK
        } else {
            value
        }
    }

    /// CPU write of `$2000-$3FFF`.
    pub(crate) fn cpu_write(&mut self, addr: u16, value: u8, line: u16, cart: &mut dyn Cartridge) {
        self.io_latch = value;
        match Register::from_cpu_addr(addr) {
            Register::Control => {
                self.control = Control::from_bits_retain(value);
                self.scroll.write_control(self.control.nametable_index());
            }
            Register::Mask => self.mask = Mask::from_bits_retain(value),
            Register::Status => {}
            Register::OamAddr => self.oam_addr = value,
            Register::OamData => self.write_oam(value),
            Register::Scroll => self.scroll.write_scroll(value),
            Register::Addr => self.scroll.write_addr(value),
            Register::Data => {
                self.vram_write(self.scroll.v.raw(), value, cart);
                self.step_data_addr(self.on_rendering_line(line));
            }
        }
    }

    /// OAMDATA write; sprite DMA goes through here too.
    pub(crate) fn write_oam(&mut self, value: u8) {
        self.oam[usize::from(self.oam_addr)] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn nmi_enabled(&self) -> bool {
        self.control.nmi_enabled()
    }

    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    pub fn oam_addr(&self) -> u8 {
        self.oam_addr
    }

    pub fn palette_ram(&self) -> &[u8] {
        &self.palette_ram
    }

    pub fn scroll(&self) -> Scroll {
        self.scroll
    }

    /// Back buffer currently being drawn.
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    pub(crate) fn frame_buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    pub fn snapshot(&self) -> PpuSnapshot {
        PpuSnapshot {
            control: self.control.bits(),
            mask: self.mask.bits(),
            status: self.status.bits(),
            oam_addr: self.oam_addr,
            scroll: self.scroll,
            read_buffer: self.read_buffer,
            io_latch: self.io_latch,
            ciram: self.ciram.clone(),
            palette_ram: self.palette_ram.clone(),
            oam: self.oam.clone(),
            secondary: self.secondary.clone(),
            tile: self.tile,
            bg: self.bg,
            eval: self.eval,
            rows: self.rows,
            sprites: self.sprites,
        }
    }

    pub fn restore(&mut self, snapshot: &PpuSnapshot) {
        self.control = Control::from_bits_retain(snapshot.control);
        self.mask = Mask::from_bits_retain(snapshot.mask);
        self.status = Status::from_bits_retain(snapshot.status);
        self.oam_addr = snapshot.oam_addr;
        self.scroll = snapshot.scroll;
        self.read_buffer = snapshot.read_buffer;
        self.io_latch = snapshot.io_latch;
        self.ciram = snapshot.ciram.clone();
        self.palette_ram = snapshot.palette_ram.clone();
        self.oam = snapshot.oam.clone();
        self.secondary = snapshot.secondary.clone();
        self.tile = snapshot.tile;
        self.bg = snapshot.bg;
        self.eval = snapshot.eval;
        self.rows = snapshot.rows;
        self.sprites = snapshot.sprites;
    }
}

/// Plain-data copy of the pipeline state. The back buffer is not included;
/// it is fully redrawn every frame.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpuSnapshot {
    control: u8,
    mask: u8,
    status: u8,
    oam_addr: u8,
    scroll: Scroll,
    read_buffer: u8,
    io_latch: u8,
    ciram: Ciram,
    palette_ram: PaletteRam,
    oam: OamRam,
    secondary: SecondaryOamRam,
    tile: TileLatch,
    bg: BgPipeline,
    eval: SpriteEval,
    rows: [SpriteRow; 8],
    sprites: SpritePipeline,
}
