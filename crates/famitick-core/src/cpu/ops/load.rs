use crate::cpu::{
    delta::{Delta, Operand},
    registers::Registers,
};

// ================================================================
// Loads
// ================================================================

pub(crate) fn lda(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.a(op.value).p(r.p.with_zn(op.value))
}

pub(crate) fn ldx(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.x(op.value).p(r.p.with_zn(op.value))
}

pub(crate) fn ldy(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.y(op.value).p(r.p.with_zn(op.value))
}

/// LAX: A and X both receive the operand.
pub(crate) fn lax(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.a(op.value).x(op.value).p(r.p.with_zn(op.value))
}

/// LAS: `operand & S` into A, X and S.
pub(crate) fn las(r: &Registers, op: Operand) -> Delta {
    let value = op.value & r.s;
    Delta::NONE
        .a(value)
        .x(value)
        .s(value)
        .p(r.p.with_zn(value))
}

// ================================================================
// Stores
// ================================================================

pub(crate) fn sta(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.write(op.addr, r.a)
}

pub(crate) fn stx(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.write(op.addr, r.x)
}

pub(crate) fn sty(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.write(op.addr, r.y)
}

pub(crate) fn sax(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.write(op.addr, r.a & r.x)
}

/// Shared body of SHA/SHX/SHY/TAS.
///
/// The stored value is ANDed with the high byte of the unindexed address
/// plus one; on a page cross that value also replaces the high byte of the
/// target address.
fn unstable_store(op: Operand, value: u8) -> Delta {
    let masked = value & ((op.base >> 8) as u8).wrapping_add(1);
    let addr = if op.page_crossed() {
        (u16::from(masked) << 8) | (op.addr & 0x00FF)
    } else {
        op.addr
    };
    Delta::NONE.write(addr, masked)
}

pub(crate) fn sha(r: &Registers, op: Operand) -> Delta {
    unstable_store(op, r.a & r.x)
}

pub(crate) fn shx(r: &Registers, op: Operand) -> Delta {
    unstable_store(op, r.x)
}

pub(crate) fn shy(r: &Registers, op: Operand) -> Delta {
    unstable_store(op, r.y)
}

/// TAS: `S = A & X`, then stores like SHA using the new S.
pub(crate) fn tas(r: &Registers, op: Operand) -> Delta {
    let s = r.a & r.x;
    unstable_store(op, s).s(s)
}
