#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetKind {
    PowerOn, // cold boot: RAM, VRAM and OAM cleared
    Soft,    // reset button: memories survive
}
