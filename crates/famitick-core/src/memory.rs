//! The console memory map.
//!
//! The bus router, the pixel pipeline and the DMA engines all decode
//! addresses against these constants.

pub mod cpu {
    pub const STACK_PAGE_START: u16 = 0x0100;

    pub const NMI_VECTOR_LO: u16 = 0xFFFA;
    pub const RESET_VECTOR_LO: u16 = 0xFFFC;
    pub const IRQ_VECTOR_LO: u16 = 0xFFFE;

    /// 2 KiB of work RAM, mirrored four times up to `$1FFF`.
    pub const INTERNAL_RAM_START: u16 = 0x0000;
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    pub const INTERNAL_RAM_MASK: u16 = (INTERNAL_RAM_SIZE as u16) - 1;

    /// Eight pixel-pipeline registers, mirrored every 8 bytes.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    pub const OAM_DMA: u16 = 0x4014;
    /// Strobe on write, pad 1 on read.
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Pad 2 on read; the audio frame counter on write.
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// Everything from here up is routed to the cartridge.
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    pub const PRG_RAM_START: u16 = 0x6000;
    pub const PRG_RAM_END: u16 = 0x7FFF;
    pub const PRG_ROM_START: u16 = 0x8000;
    pub const CPU_ADDR_END: u16 = 0xFFFF;
}

pub mod ppu {
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    pub const CIRAM_SIZE: usize = 0x0800;
    /// The pixel pipeline sees a 14-bit address space.
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// 32 bytes, mirrored through `$3FFF`.
    pub const PALETTE_BASE: u16 = 0x3F00;
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    pub const NAMETABLE_BASE: u16 = 0x2000;
    pub const NAMETABLE_SIZE: u16 = 0x0400;

    pub const PATTERN_TABLE_0: u16 = 0x0000;
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    pub const CHR_SIZE: usize = 0x2000;

    pub const OAM_RAM_SIZE: usize = 0x100;
    /// Eight sprites of four bytes, refilled every visible line.
    pub const SECONDARY_OAM_RAM_SIZE: usize = 0x20;

    /// CPU-visible registers, by their `$2000-$2007` slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        Control,
        Mask,
        Status,
        OamAddr,
        OamData,
        Scroll,
        Addr,
        Data,
    }

    impl Register {
        /// Decodes any mirror in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}

pub mod apu {
    /// Channel registers `$4000-$4013`; the DMC owns the last four.
    pub const REGISTER_BASE: u16 = 0x4000;
    pub const CHANNEL_REGISTER_END: u16 = 0x4013;

    pub const DMC_CONTROL: u16 = 0x4010;
    pub const DMC_DIRECT_LOAD: u16 = 0x4011;
    pub const DMC_SAMPLE_ADDRESS: u16 = 0x4012;
    pub const DMC_SAMPLE_LENGTH: u16 = 0x4013;
    pub const STATUS: u16 = 0x4015;
    pub const FRAME_COUNTER: u16 = 0x4017;

    /// Sample address is `$C000 + A * 64`, length `L * 16 + 1`.
    pub const DMC_SAMPLE_BASE: u16 = 0xC000;
    pub const DMC_SAMPLE_ADDR_STRIDE: u16 = 64;
    pub const DMC_SAMPLE_LEN_STRIDE: u16 = 16;
}
