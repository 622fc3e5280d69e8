//! Per-cycle micro-steps and the step list of every opcode shape.
//!
//! The opcode fetch is the first cycle of every instruction and is not part
//! of these lists; a list of `n` steps is therefore an `n + 1` cycle
//! instruction. Steps that can end an instruction early (page-cross reads,
//! untaken or same-page branches) say so from the engine.

use crate::cpu::{
    addressing::{AccessKind, Addressing},
    mnemonic::Mnemonic,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Index {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Step {
    /// Dummy read at PC, then the delta with no operand.
    Implied,
    /// Dummy read at PC, then the delta on A; its write lands in A.
    Accumulator,
    /// Operand read at PC++, then the delta.
    Immediate,

    // Address resolution
    /// `addr = ptr = read(PC++)`.
    FetchZeroPage,
    /// `latch = read(PC++)`.
    FetchLow,
    /// `addr = read(PC++) << 8 | latch`.
    FetchHigh,
    /// Like `FetchHigh`, then adds the index and latches the page cross.
    FetchHighIndexed(Index),
    /// Dummy read at the zero-page address, then adds the index in page 0.
    ZeroPageIndexed(Index),
    /// `($zp,X)`: dummy read at the pointer, then adds X in page 0.
    PointerIndexX,
    /// `latch = read(ptr)`.
    PointerLow,
    /// `addr = read(ptr + 1) << 8 | latch`, wrapping in page 0.
    PointerHigh,
    /// `($zp),Y`: like `PointerHigh`, then adds Y and latches the page cross.
    PointerHighIndexY,

    // Data cycles
    /// Read forms: dummy read of the unfixed address on a page cross,
    /// otherwise the final read and the delta.
    ReadPageCross,
    /// Write and RMW forms: unconditional dummy read of the unfixed address.
    DummyReadUnfixed,
    /// Final read and the delta.
    Read,
    /// The delta, whose write is this cycle's bus access.
    Write,
    /// `latch = read(addr)`.
    ModifyRead,
    /// Writes the unmodified byte back.
    ModifyDummyWrite,
    /// The delta on the latched byte; its write is the real write.
    ModifyWrite,

    // Jumps
    /// `JMP abs`: high byte, then PC moves.
    JumpAbsolute,
    /// `latch = read(addr)`.
    IndirectLow,
    /// High byte from `addr + 1` without carrying into the page, then PC moves.
    IndirectHigh,
    /// Offset read; ends the instruction when the branch is not taken.
    BranchOffset,
    /// Dummy read at PC, low byte of PC fixed; ends on a same-page target.
    BranchTaken,
    /// Dummy read at the half-fixed PC, high byte fixed.
    BranchFixup,

    // Stack and interrupts
    DummyReadPc,
    /// BRK skips its padding byte.
    DummyReadPcIncrement,
    /// Dummy read at the stack pointer.
    StackDummyRead,
    /// Dummy read at the stack pointer, then `S += 1`.
    IncrementStack,
    /// Delta of PHA/PHP: its write goes to the stack.
    Push,
    /// Read at the stack pointer, then the delta of PLA/PLP.
    Pull,
    PushPcHigh,
    PushPcLow,
    /// Pushes P and picks the vector; a pending NMI wins here.
    PushStatus,
    PullStatus,
    PullPcLow,
    PullPcHigh,
    /// RTS: dummy read at the pulled PC, then `PC += 1`.
    IncrementPc,
    /// JSR: high byte read at PC, then PC moves.
    JsrFetchHigh,
    VectorLow,
    VectorHigh,
}

use Index::{X, Y};
use Step::*;

const IMPLIED: &[Step] = &[Implied];
const ACCUMULATOR: &[Step] = &[Accumulator];
const IMMEDIATE: &[Step] = &[Immediate];

const ZP_READ: &[Step] = &[FetchZeroPage, Read];
const ZP_WRITE: &[Step] = &[FetchZeroPage, Write];
const ZP_MODIFY: &[Step] = &[FetchZeroPage, ModifyRead, ModifyDummyWrite, ModifyWrite];

const ZPX_READ: &[Step] = &[FetchZeroPage, ZeroPageIndexed(X), Read];
const ZPX_WRITE: &[Step] = &[FetchZeroPage, ZeroPageIndexed(X), Write];
const ZPX_MODIFY: &[Step] = &[
    FetchZeroPage,
    ZeroPageIndexed(X),
    ModifyRead,
    ModifyDummyWrite,
    ModifyWrite,
];
const ZPY_READ: &[Step] = &[FetchZeroPage, ZeroPageIndexed(Y), Read];
const ZPY_WRITE: &[Step] = &[FetchZeroPage, ZeroPageIndexed(Y), Write];

const ABS_READ: &[Step] = &[FetchLow, FetchHigh, Read];
const ABS_WRITE: &[Step] = &[FetchLow, FetchHigh, Write];
const ABS_MODIFY: &[Step] = &[
    FetchLow,
    FetchHigh,
    ModifyRead,
    ModifyDummyWrite,
    ModifyWrite,
];

const ABX_READ: &[Step] = &[FetchLow, FetchHighIndexed(X), ReadPageCross, Read];
const ABX_WRITE: &[Step] = &[FetchLow, FetchHighIndexed(X), DummyReadUnfixed, Write];
const ABX_MODIFY: &[Step] = &[
    FetchLow,
    FetchHighIndexed(X),
    DummyReadUnfixed,
    ModifyRead,
    ModifyDummyWrite,
    ModifyWrite,
];
const ABY_READ: &[Step] = &[FetchLow, FetchHighIndexed(Y), ReadPageCross, Read];
const ABY_WRITE: &[Step] = &[FetchLow, FetchHighIndexed(Y), DummyReadUnfixed, Write];
const ABY_MODIFY: &[Step] = &[
    FetchLow,
    FetchHighIndexed(Y),
    DummyReadUnfixed,
    ModifyRead,
    ModifyDummyWrite,
    ModifyWrite,
];

const INX_READ: &[Step] = &[FetchZeroPage, PointerIndexX, PointerLow, PointerHigh, Read];
const INX_WRITE: &[Step] = &[FetchZeroPage, PointerIndexX, PointerLow, PointerHigh, Write];
const INX_MODIFY: &[Step] = &[
    FetchZeroPage,
    PointerIndexX,
    PointerLow,
    PointerHigh,
    ModifyRead,
    ModifyDummyWrite,
    ModifyWrite,
];

const INY_READ: &[Step] = &[
    FetchZeroPage,
    PointerLow,
    PointerHighIndexY,
    ReadPageCross,
    Read,
];
const INY_WRITE: &[Step] = &[
    FetchZeroPage,
    PointerLow,
    PointerHighIndexY,
    DummyReadUnfixed,
    Write,
];
const INY_MODIFY: &[Step] = &[
    FetchZeroPage,
    PointerLow,
    PointerHighIndexY,
    DummyReadUnfixed,
    ModifyRead,
    ModifyDummyWrite,
    ModifyWrite,
];

const BRANCH: &[Step] = &[BranchOffset, BranchTaken, BranchFixup];
const JMP_ABSOLUTE: &[Step] = &[FetchLow, JumpAbsolute];
const JMP_INDIRECT: &[Step] = &[FetchLow, FetchHigh, IndirectLow, IndirectHigh];

const JSR: &[Step] = &[
    FetchLow,
    StackDummyRead,
    PushPcHigh,
    PushPcLow,
    JsrFetchHigh,
];
const RTS: &[Step] = &[
    DummyReadPc,
    IncrementStack,
    PullPcLow,
    PullPcHigh,
    IncrementPc,
];
const RTI: &[Step] = &[
    DummyReadPc,
    IncrementStack,
    PullStatus,
    PullPcLow,
    PullPcHigh,
];
const BRK: &[Step] = &[
    DummyReadPcIncrement,
    PushPcHigh,
    PushPcLow,
    PushStatus,
    VectorLow,
    VectorHigh,
];
const PUSH: &[Step] = &[DummyReadPc, Push];
const PULL: &[Step] = &[DummyReadPc, IncrementStack, Pull];

/// Hardware interrupt and reset sequence, after the discarded opcode fetch.
pub(crate) const INTERRUPT: &[Step] = &[
    DummyReadPc,
    PushPcHigh,
    PushPcLow,
    PushStatus,
    VectorLow,
    VectorHigh,
];

/// Step list for an opcode, chosen from its mnemonic and addressing mode.
pub(crate) const fn sequence(mnemonic: Mnemonic, mode: Addressing) -> &'static [Step] {
    use AccessKind as K;
    use Addressing as A;

    match mnemonic {
        Mnemonic::BRK => return BRK,
        Mnemonic::JSR => return JSR,
        Mnemonic::RTS => return RTS,
        Mnemonic::RTI => return RTI,
        Mnemonic::PHA | Mnemonic::PHP => return PUSH,
        Mnemonic::PLA | Mnemonic::PLP => return PULL,
        _ => {}
    }

    match (mode, mnemonic.access()) {
        (A::Implied, _) => IMPLIED,
        (A::Accumulator, _) => ACCUMULATOR,
        (A::Immediate, _) => IMMEDIATE,
        (A::Relative, _) => BRANCH,
        (A::Indirect, _) => JMP_INDIRECT,
        (A::Absolute, K::Internal) => JMP_ABSOLUTE,

        (A::ZeroPage, K::Write) => ZP_WRITE,
        (A::ZeroPage, K::ReadModifyWrite) => ZP_MODIFY,
        (A::ZeroPage, _) => ZP_READ,

        (A::ZeroPageX, K::Write) => ZPX_WRITE,
        (A::ZeroPageX, K::ReadModifyWrite) => ZPX_MODIFY,
        (A::ZeroPageX, _) => ZPX_READ,

        (A::ZeroPageY, K::Write) => ZPY_WRITE,
        (A::ZeroPageY, _) => ZPY_READ,

        (A::Absolute, K::Write) => ABS_WRITE,
        (A::Absolute, K::ReadModifyWrite) => ABS_MODIFY,
        (A::Absolute, _) => ABS_READ,

        (A::AbsoluteX, K::Write) => ABX_WRITE,
        (A::AbsoluteX, K::ReadModifyWrite) => ABX_MODIFY,
        (A::AbsoluteX, _) => ABX_READ,

        (A::AbsoluteY, K::Write) => ABY_WRITE,
        (A::AbsoluteY, K::ReadModifyWrite) => ABY_MODIFY,
        (A::AbsoluteY, _) => ABY_READ,

        (A::IndirectX, K::Write) => INX_WRITE,
        (A::IndirectX, K::ReadModifyWrite) => INX_MODIFY,
        (A::IndirectX, _) => INX_READ,

        (A::IndirectY, K::Write) => INY_WRITE,
        (A::IndirectY, K::ReadModifyWrite) => INY_MODIFY,
        (A::IndirectY, _) => INY_READ,
    }
}
