use crate::cpu::{
    delta::{Delta, Operand},
    registers::Registers,
    status::Status,
};

// ================================================================
// Branches
//
// The operand value is the signed offset and the operand address is the PC
// after the offset byte. A taken branch reports its target through `pc`;
// the engine spends the extra cycles moving PC there.
// ================================================================

fn branch(op: Operand, taken: bool) -> Delta {
    if taken {
        Delta::NONE.pc(op.addr.wrapping_add(op.value as i8 as u16))
    } else {
        Delta::NONE
    }
}

pub(crate) fn bpl(r: &Registers, op: Operand) -> Delta {
    branch(op, !r.p.contains(Status::NEGATIVE))
}

pub(crate) fn bmi(r: &Registers, op: Operand) -> Delta {
    branch(op, r.p.contains(Status::NEGATIVE))
}

pub(crate) fn bvc(r: &Registers, op: Operand) -> Delta {
    branch(op, !r.p.contains(Status::OVERFLOW))
}

pub(crate) fn bvs(r: &Registers, op: Operand) -> Delta {
    branch(op, r.p.contains(Status::OVERFLOW))
}

pub(crate) fn bcc(r: &Registers, op: Operand) -> Delta {
    branch(op, !r.p.contains(Status::CARRY))
}

pub(crate) fn bcs(r: &Registers, op: Operand) -> Delta {
    branch(op, r.p.contains(Status::CARRY))
}

pub(crate) fn bne(r: &Registers, op: Operand) -> Delta {
    branch(op, !r.p.contains(Status::ZERO))
}

pub(crate) fn beq(r: &Registers, op: Operand) -> Delta {
    branch(op, r.p.contains(Status::ZERO))
}

pub(crate) fn jmp(_: &Registers, op: Operand) -> Delta {
    Delta::NONE.pc(op.addr)
}

// ================================================================
// Flags
// ================================================================

pub(crate) fn clc(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.p(r.p - Status::CARRY)
}

pub(crate) fn sec(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.p(r.p | Status::CARRY)
}

pub(crate) fn cli(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.p(r.p - Status::INTERRUPT)
}

pub(crate) fn sei(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.p(r.p | Status::INTERRUPT)
}

pub(crate) fn cld(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.p(r.p - Status::DECIMAL)
}

pub(crate) fn sed(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.p(r.p | Status::DECIMAL)
}

pub(crate) fn clv(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.p(r.p - Status::OVERFLOW)
}

// ================================================================
// Transfers
// ================================================================

pub(crate) fn tax(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.x(r.a).p(r.p.with_zn(r.a))
}

pub(crate) fn tay(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.y(r.a).p(r.p.with_zn(r.a))
}

pub(crate) fn txa(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.a(r.x).p(r.p.with_zn(r.x))
}

pub(crate) fn tya(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.a(r.y).p(r.p.with_zn(r.y))
}

pub(crate) fn tsx(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.x(r.s).p(r.p.with_zn(r.s))
}

/// TXS is the only transfer that leaves the flags alone.
pub(crate) fn txs(r: &Registers, _: Operand) -> Delta {
    Delta::NONE.s(r.x)
}

// ================================================================
// Stack
//
// Pushes write at the current S and post-decrement. Pulls receive the byte
// the engine read at S after its increment cycle.
// ================================================================

pub(crate) fn pha(r: &Registers, _: Operand) -> Delta {
    Delta::NONE
        .write(r.stack_addr(), r.a)
        .s(r.s.wrapping_sub(1))
}

pub(crate) fn php(r: &Registers, _: Operand) -> Delta {
    Delta::NONE
        .write(r.stack_addr(), r.p.to_stack(true))
        .s(r.s.wrapping_sub(1))
}

pub(crate) fn pla(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.a(op.value).p(r.p.with_zn(op.value))
}

pub(crate) fn plp(_: &Registers, op: Operand) -> Delta {
    Delta::NONE.p(Status::from_stack(op.value))
}

// ================================================================
// Misc
// ================================================================

pub(crate) fn nop(_: &Registers, _: Operand) -> Delta {
    Delta::NONE
}

/// JAM/KIL: the CPU stops fetching until reset.
pub(crate) fn jam(_: &Registers, _: Operand) -> Delta {
    Delta::NONE.halt()
}
