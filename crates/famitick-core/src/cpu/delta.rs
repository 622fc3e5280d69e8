//! Pure instruction results.
//!
//! Every operation is a `fn(&Registers, Operand) -> Delta`. The engine owns
//! the only code path that turns a delta into register and bus changes
//! ([`Cpu::commit`](crate::cpu::Cpu)), so an operation can never partially
//! apply itself or touch the bus out of step.

use crate::cpu::{registers::Registers, status::Status};

/// Signature shared by every opcode implementation.
pub(crate) type OpFn = fn(&Registers, Operand) -> Delta;

/// Value and addresses resolved by the addressing micro-steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Operand {
    /// Byte read from the effective address (or the immediate/offset byte).
    pub(crate) value: u8,
    /// Effective address after indexing.
    pub(crate) addr: u16,
    /// Address before indexing. Equal to `addr` for unindexed modes.
    pub(crate) base: u16,
}

impl Operand {
    #[inline]
    pub(crate) const fn new(value: u8, addr: u16) -> Self {
        Self {
            value,
            addr,
            base: addr,
        }
    }

    #[inline]
    pub(crate) const fn page_crossed(&self) -> bool {
        (self.base ^ self.addr) & 0xFF00 != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Delta {
    pub(crate) a: Option<u8>,
    pub(crate) x: Option<u8>,
    pub(crate) y: Option<u8>,
    pub(crate) s: Option<u8>,
    pub(crate) p: Option<Status>,
    pub(crate) pc: Option<u16>,
    pub(crate) write: Option<(u16, u8)>,
    pub(crate) halt: bool,
}

impl Delta {
    pub(crate) const NONE: Delta = Delta {
        a: None,
        x: None,
        y: None,
        s: None,
        p: None,
        pc: None,
        write: None,
        halt: false,
    };

    #[inline]
    pub(crate) const fn a(mut self, value: u8) -> Self {
        self.a = Some(value);
        self
    }

    #[inline]
    pub(crate) const fn x(mut self, value: u8) -> Self {
        self.x = Some(value);
        self
    }

    #[inline]
    pub(crate) const fn y(mut self, value: u8) -> Self {
        self.y = Some(value);
        self
    }

    #[inline]
    pub(crate) const fn s(mut self, value: u8) -> Self {
        self.s = Some(value);
        self
    }

    #[inline]
    pub(crate) const fn p(mut self, value: Status) -> Self {
        self.p = Some(value);
        self
    }

    #[inline]
    pub(crate) const fn pc(mut self, value: u16) -> Self {
        self.pc = Some(value);
        self
    }

    #[inline]
    pub(crate) const fn write(mut self, addr: u16, value: u8) -> Self {
        self.write = Some((addr, value));
        self
    }

    #[inline]
    pub(crate) const fn halt(mut self) -> Self {
        self.halt = true;
        self
    }

    /// Copies every present register field into `regs`. The bus write and
    /// the halt request are left to the engine.
    pub(crate) fn apply(&self, regs: &mut Registers) {
        if let Some(a) = self.a {
            regs.a = a;
        }
        if let Some(x) = self.x {
            regs.x = x;
        }
        if let Some(y) = self.y {
            regs.y = y;
        }
        if let Some(s) = self.s {
            regs.s = s;
        }
        if let Some(p) = self.p {
            regs.p = p;
        }
        if let Some(pc) = self.pc {
            regs.pc = pc;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_touches_only_present_fields() {
        let mut regs = Registers {
            a: 1,
            x: 2,
            y: 3,
            s: 4,
            p: Status::empty(),
            pc: 0x8000,
        };
        Delta::NONE.x(9).pc(0x1234).write(0x10, 0x20).apply(&mut regs);
        assert_eq!((regs.a, regs.x, regs.y, regs.s), (1, 9, 3, 4));
        assert_eq!(regs.pc, 0x1234);
    }

    #[test]
    fn page_cross_compares_high_bytes() {
        let op = Operand {
            value: 0,
            addr: 0x1100,
            base: 0x10FF,
        };
        assert!(op.page_crossed());
        assert!(!Operand::new(0, 0x10FF).page_crossed());
    }
}
