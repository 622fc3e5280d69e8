use crate::cpu::{
    delta::{Delta, Operand},
    registers::Registers,
    status::Status,
};

fn shifted(r: &Registers, op: Operand, result: u8, carry: bool) -> Delta {
    let mut p = r.p.with_zn(result);
    p.set(Status::CARRY, carry);
    Delta::NONE.write(op.addr, result).p(p)
}

pub(crate) fn asl(r: &Registers, op: Operand) -> Delta {
    shifted(r, op, op.value << 1, op.value & 0x80 != 0)
}

pub(crate) fn lsr(r: &Registers, op: Operand) -> Delta {
    shifted(r, op, op.value >> 1, op.value & 0x01 != 0)
}

pub(crate) fn rol(r: &Registers, op: Operand) -> Delta {
    shifted(r, op, (op.value << 1) | r.p.carry(), op.value & 0x80 != 0)
}

pub(crate) fn ror(r: &Registers, op: Operand) -> Delta {
    shifted(
        r,
        op,
        (op.value >> 1) | (r.p.carry() << 7),
        op.value & 0x01 != 0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::ops::test_support::*;

    #[test]
    fn rol_rotates_carry_in() {
        let (after, delta) = run(rol, regs(0, 0, 0, Status::CARRY), 0x80, 0x10);
        assert_eq!(delta.write, Some((0x10, 0x01)));
        assert!(after.p.contains(Status::CARRY));
    }

    #[test]
    fn ror_rotates_carry_into_bit_seven() {
        let (after, delta) = run(ror, regs(0, 0, 0, Status::CARRY), 0x02, 0x10);
        assert_eq!(delta.write, Some((0x10, 0x81)));
        assert!(after.p.contains(Status::NEGATIVE));
        assert!(!after.p.contains(Status::CARRY));
    }

    #[test]
    fn lsr_clears_negative() {
        let (after, _) = run(lsr, regs(0, 0, 0, Status::NEGATIVE), 0xFF, 0);
        assert!(!after.p.contains(Status::NEGATIVE));
        assert!(after.p.contains(Status::CARRY));
    }
}
