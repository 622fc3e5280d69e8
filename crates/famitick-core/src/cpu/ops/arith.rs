use crate::cpu::{
    delta::{Delta, Operand},
    registers::Registers,
    status::Status,
};

/// Binary add with carry. The 2A03 ignores the decimal flag.
pub(super) fn add(r: &Registers, value: u8) -> Delta {
    let sum = u16::from(r.a) + u16::from(value) + u16::from(r.p.carry());
    let result = sum as u8;
    let mut p = r.p.with_zn(result);
    p.set(Status::CARRY, sum > 0xFF);
    p.set(Status::OVERFLOW, (!(r.a ^ value) & (r.a ^ result) & 0x80) != 0);
    Delta::NONE.a(result).p(p)
}

pub(super) fn compare(p: Status, reg: u8, value: u8) -> Status {
    let mut p = p.with_zn(reg.wrapping_sub(value));
    p.set(Status::CARRY, reg >= value);
    p
}

pub(crate) fn adc(r: &Registers, op: Operand) -> Delta {
    add(r, op.value)
}

pub(crate) fn sbc(r: &Registers, op: Operand) -> Delta {
    add(r, !op.value)
}

pub(crate) fn cmp(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.p(compare(r.p, r.a, op.value))
}

pub(crate) fn cpx(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.p(compare(r.p, r.x, op.value))
}

pub(crate) fn cpy(r: &Registers, op: Operand) -> Delta {
    Delta::NONE.p(compare(r.p, r.y, op.value))
}

// ================================================================
// Increments and decrements
// ================================================================

pub(crate) fn inc(r: &Registers, op: Operand) -> Delta {
    let value = op.value.wrapping_add(1);
    Delta::NONE.write(op.addr, value).p(r.p.with_zn(value))
}

pub(crate) fn dec(r: &Registers, op: Operand) -> Delta {
    let value = op.value.wrapping_sub(1);
    Delta::NONE.write(op.addr, value).p(r.p.with_zn(value))
}

pub(crate) fn inx(r: &Registers, _: Operand) -> Delta {
    let x = r.x.wrapping_add(1);
    Delta::NONE.x(x).p(r.p.with_zn(x))
}

pub(crate) fn iny(r: &Registers, _: Operand) -> Delta {
    let y = r.y.wrapping_add(1);
    Delta::NONE.y(y).p(r.p.with_zn(y))
}

pub(crate) fn dex(r: &Registers, _: Operand) -> Delta {
    let x = r.x.wrapping_sub(1);
    Delta::NONE.x(x).p(r.p.with_zn(x))
}

pub(crate) fn dey(r: &Registers, _: Operand) -> Delta {
    let y = r.y.wrapping_sub(1);
    Delta::NONE.y(y).p(r.p.with_zn(y))
}
