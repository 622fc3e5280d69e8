use core::fmt;

/// Console region selected at build time.
///
/// Only regions with a [`TimingProfile`](super::TimingProfile) can be built;
/// the rest are rejected by [`NesBuilder::build`](crate::NesBuilder::build)
/// before the first tick.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// North American / Japanese NTSC timing.
    #[default]
    Ntsc,
    /// European PAL timing.
    Pal,
    /// Dendy-style hybrid timing used by some Famiclones.
    Dendy,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::Ntsc => "ntsc",
            Region::Pal => "pal",
            Region::Dendy => "dendy",
        };
        f.write_str(s)
    }
}
