use crate::cpu::status::Status;

/// Programmer-visible CPU registers.
///
/// This is also the snapshot handed to every operation: ops read it and
/// describe their effect as a [`Delta`](crate::cpu::Delta) instead of
/// mutating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    /// Accumulator
    pub a: u8,
    /// Index register X
    pub x: u8,
    /// Index register Y
    pub y: u8,
    /// Stack pointer, offset into page `$01`.
    pub s: u8,
    /// Processor status
    pub p: Status,
    /// Program counter
    pub pc: u16,
}

impl Registers {
    /// Stack address currently pointed to by S.
    #[inline]
    pub fn stack_addr(&self) -> u16 {
        crate::bus::STACK_ADDR | u16::from(self.s)
    }
}
