use thiserror::Error;

use crate::config::Region;

#[derive(Error, Debug)]
pub enum Error {
    /// The requested region has no timing profile in this core.
    #[error("unsupported region: {0}")]
    UnsupportedRegion(Region),

    /// `NesBuilder::build` was called without a cartridge.
    #[error("no cartridge attached")]
    MissingCartridge,

    /// A cartridge rejected its own configuration during validation.
    #[error("malformed cartridge: {0}")]
    MalformedCartridge(String),

    /// The CPU executed a JAM opcode and stopped fetching instructions.
    #[error("cpu halted by opcode {opcode:#04X} at {pc:#06X}")]
    Halted { opcode: u8, pc: u16 },

    /// A snapshot taken on one region was restored into another.
    #[error("snapshot region {snapshot} does not match console region {console}")]
    RegionMismatch { snapshot: Region, console: Region },

    /// Snapshot encoding or decoding failed.
    #[cfg(feature = "savestate-postcard")]
    #[error("snapshot codec error: {0}")]
    Snapshot(#[from] postcard::Error),
}
