//! Opcode implementations as pure delta functions.
//!
//! Every function here has the [`OpFn`](crate::cpu::delta::OpFn) shape.
//! Read-modify-write ops return the modified byte as `write`; the
//! accumulator forms of the shifts reuse the same functions and the engine
//! redirects that write into A.

mod arith;
mod combo;
mod flow;
mod load;
mod logic;
mod shift;

pub(crate) use arith::*;
pub(crate) use combo::*;
pub(crate) use flow::*;
pub(crate) use load::*;
pub(crate) use logic::*;
pub(crate) use shift::*;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::cpu::{
        delta::{Delta, OpFn, Operand},
        registers::Registers,
        status::Status,
    };

    pub(crate) fn regs(a: u8, x: u8, y: u8, p: Status) -> Registers {
        Registers {
            a,
            x,
            y,
            s: 0xFD,
            p,
            pc: 0x8000,
        }
    }

    /// Runs `op` on `regs` with `value` read from `addr` and returns the
    /// registers after the delta plus the delta itself.
    pub(crate) fn run(op: OpFn, regs: Registers, value: u8, addr: u16) -> (Registers, Delta) {
        let delta = op(&regs, Operand::new(value, addr));
        let mut after = regs;
        delta.apply(&mut after);
        (after, delta)
    }
}
