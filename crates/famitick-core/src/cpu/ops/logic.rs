use crate::cpu::{
    delta::{Delta, Operand},
    registers::Registers,
    status::Status,
};

pub(crate) fn and(r: &Registers, op: Operand) -> Delta {
    let a = r.a & op.value;
    Delta::NONE.a(a).p(r.p.with_zn(a))
}

pub(crate) fn ora(r: &Registers, op: Operand) -> Delta {
    let a = r.a | op.value;
    Delta::NONE.a(a).p(r.p.with_zn(a))
}

pub(crate) fn eor(r: &Registers, op: Operand) -> Delta {
    let a = r.a ^ op.value;
    Delta::NONE.a(a).p(r.p.with_zn(a))
}

/// BIT: Z from `A & M`, N and V copied from bits 7 and 6 of M.
pub(crate) fn bit(r: &Registers, op: Operand) -> Delta {
    let mut p = r.p;
    p.update_zero(r.a & op.value);
    p.update_negative(op.value);
    p.set(Status::OVERFLOW, op.value & 0x40 != 0);
    Delta::NONE.p(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::ops::test_support::*;

    #[test]
    fn bit_leaves_accumulator_alone() {
        let (after, delta) = run(bit, regs(0x0F, 0, 0, Status::empty()), 0xC0, 0);
        assert_eq!(delta.a, None);
        assert!(after.p.contains(Status::ZERO | Status::NEGATIVE | Status::OVERFLOW));
    }

    #[test]
    fn eor_self_is_zero() {
        let (after, _) = run(eor, regs(0xA5, 0, 0, Status::empty()), 0xA5, 0);
        assert_eq!(after.a, 0);
        assert!(after.p.contains(Status::ZERO));
    }
}
