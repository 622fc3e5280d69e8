//! Undocumented opcodes.
//!
//! The read-modify-write combos are a documented RMW op whose result is fed
//! into a documented accumulator op; they are built from those two deltas
//! rather than re-deriving the flags.

use crate::cpu::{
    delta::{Delta, OpFn, Operand},
    ops::{
        and,
        arith::{add, compare},
        asl, dec, eor, inc, lsr, ora, rol, ror,
    },
    registers::Registers,
    status::Status,
};

/// Runs `modify`, then `then` on the modified byte with the registers as
/// `modify` left them. The memory write comes from `modify`.
fn chain(r: &Registers, op: Operand, modify: OpFn, then: OpFn) -> Delta {
    let first = modify(r, op);
    let mut staged = *r;
    first.apply(&mut staged);
    let (addr, value) = first.write.unwrap_or((op.addr, op.value));
    let second = then(&staged, Operand { value, ..op });
    Delta {
        write: Some((addr, value)),
        p: second.p.or(first.p),
        ..second
    }
}

fn compare_a(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.p(compare(r.p, r.a, op.value))
}

fn subtract(r: &Registers, op: Operand) -> Delta {
    add(r, !op.value)
}

fn add_with_carry(r: &Registers, op: Operand) -> Delta {
    add(r, op.value)
}

pub(crate) fn slo(r: &Registers, op: Operand) -> Delta {
    chain(r, op, asl, ora)
}

pub(crate) fn rla(r: &Registers, op: Operand) -> Delta {
    chain(r, op, rol, and)
}

pub(crate) fn sre(r: &Registers, op: Operand) -> Delta {
    chain(r, op, lsr, eor)
}

pub(crate) fn rra(r: &Registers, op: Operand) -> Delta {
    chain(r, op, ror, add_with_carry)
}

pub(crate) fn dcp(r: &Registers, op: Operand) -> Delta {
    chain(r, op, dec, compare_a)
}

pub(crate) fn isc(r: &Registers, op: Operand) -> Delta {
    chain(r, op, inc, subtract)
}

// ================================================================
// Immediate-only combos
// ================================================================

/// ANC: AND, then C mirrors N.
pub(crate) fn anc(r: &Registers, op: Operand) -> Delta {
    let a = r.a & op.value;
    let mut p = r.p.with_zn(a);
    p.set(Status::CARRY, a & 0x80 != 0);
    Delta::NONE.a(a).p(p)
}

/// ALR: AND, then LSR A.
pub(crate) fn alr(r: &Registers, op: Operand) -> Delta {
    let masked = r.a & op.value;
    let a = masked >> 1;
    let mut p = r.p.with_zn(a);
    p.set(Status::CARRY, masked & 0x01 != 0);
    Delta::NONE.a(a).p(p)
}

/// ARR: AND, then ROR A, with C from bit 6 and V from bit 6 xor bit 5.
pub(crate) fn arr(r: &Registers, op: Operand) -> Delta {
    let a = ((r.a & op.value) >> 1) | (r.p.carry() << 7);
    let mut p = r.p.with_zn(a);
    p.set(Status::CARRY, a & 0x40 != 0);
    p.set(Status::OVERFLOW, ((a >> 6) ^ (a >> 5)) & 0x01 != 0);
    Delta::NONE.a(a).p(p)
}

/// AXS: `X = (A & X) - M` without borrow, C set like CMP.
pub(crate) fn axs(r: &Registers, op: Operand) -> Delta {
    let masked = r.a & r.x;
    let x = masked.wrapping_sub(op.value);
    Delta::NONE.x(x).p(compare(r.p, masked, op.value))
}

/// XAA: unstable on hardware; uses the common `0xEE` magic constant.
pub(crate) fn xaa(r: &Registers, op: Operand) -> Delta {
    let a = (r.a | 0xEE) & r.x & op.value;
    Delta::NONE.a(a).p(r.p.with_zn(a))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::cpu::ops::{adc, cmp, sbc, test_support::*};

    #[test]
    fn slo_shifts_memory_then_ors() {
        let (after, delta) = run(slo, regs(0x01, 0, 0, Status::empty()), 0x81, 0x0040);
        assert_eq!(delta.write, Some((0x0040, 0x02)));
        assert_eq!(after.a, 0x03);
        assert!(after.p.contains(Status::CARRY));
    }

    #[test]
    fn rra_adds_with_carry_from_rotate() {
        let (after, delta) = run(rra, regs(0x10, 0, 0, Status::empty()), 0x03, 0x0040);
        assert_eq!(delta.write, Some((0x0040, 0x01)));
        assert_eq!(after.a, 0x12);
    }

    #[test]
    fn arr_flag_derivation() {
        let (after, _) = run(arr, regs(0xFF, 0, 0, Status::CARRY), 0xFF, 0);
        assert_eq!(after.a, 0xFF);
        assert!(after.p.contains(Status::CARRY));
        assert!(!after.p.contains(Status::OVERFLOW));
    }

    #[test]
    fn axs_subtracts_without_borrow() {
        let (after, _) = run(axs, regs(0xF0, 0x3C, 0, Status::empty()), 0x31, 0);
        assert_eq!(after.x, 0xFF);
        assert!(!after.p.contains(Status::CARRY));
    }

    proptest! {
        #[test]
        fn dcp_equals_dec_then_cmp(a: u8, m: u8) {
            let r = regs(a, 0, 0, Status::empty());
            let delta = dcp(&r, Operand::new(m, 0x10));
            let dec = m.wrapping_sub(1);
            prop_assert_eq!(delta.write, Some((0x10, dec)));
            prop_assert_eq!(delta.p, cmp(&r, Operand::new(dec, 0x10)).p);
        }

        #[test]
        fn isc_equals_inc_then_sbc(a: u8, m: u8, carry: bool) {
            let p = if carry { Status::CARRY } else { Status::empty() };
            let r = regs(a, 0, 0, p);
            let delta = isc(&r, Operand::new(m, 0x10));
            let inc = m.wrapping_add(1);
            let expected = sbc(&r, Operand::new(inc, 0x10));
            prop_assert_eq!(delta.a, expected.a);
            prop_assert_eq!(delta.p, expected.p);
        }

        #[test]
        fn rra_carry_comes_from_rotate(a: u8, m: u8) {
            let r = regs(a, 0, 0, Status::empty());
            let delta = rra(&r, Operand::new(m, 0));
            let rotated = m >> 1;
            let mut staged = r;
            staged.p.set(Status::CARRY, m & 1 != 0);
            prop_assert_eq!(delta.a, adc(&staged, Operand::new(rotated, 0)).a);
        }
    }
}
