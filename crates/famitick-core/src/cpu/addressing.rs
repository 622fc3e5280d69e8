use std::fmt::Display;

/// Represents the addressing modes supported by the 6502 CPU.
///
/// The mode decides which addressing micro-steps run between the opcode
/// fetch and the final data access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addressing {
    /// No operand. `CLC`, `TAX`, `NOP`.
    Implied,
    /// Operates on A. `ASL A`.
    Accumulator,
    /// The byte after the opcode is the value. `LDA #$42`.
    Immediate,
    /// Full 16-bit address. `LDA $1234`.
    Absolute,
    /// `address + X`; read forms pay one cycle on a page cross.
    AbsoluteX,
    /// `address + Y`; read forms pay one cycle on a page cross.
    AbsoluteY,
    /// `JMP ($1234)`, with the page-wrap bug on the high byte fetch.
    Indirect,
    /// Single-byte address in `$0000-$00FF`.
    ZeroPage,
    /// `(zp + X) & 0xFF`.
    ZeroPageX,
    /// `(zp + Y) & 0xFF`.
    ZeroPageY,
    /// `($zp,X)`: pointer taken from zero page after adding X.
    IndirectX,
    /// `($zp),Y`: pointer from zero page, then Y is added.
    IndirectY,
    /// Signed 8-bit branch offset.
    Relative,
}

impl Addressing {
    /// Operand bytes that follow the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            Addressing::Implied | Addressing::Accumulator => 0,
            Addressing::Absolute
            | Addressing::AbsoluteX
            | Addressing::AbsoluteY
            | Addressing::Indirect => 2,
            _ => 1,
        }
    }
}

impl Display for Addressing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Addressing::Implied => "imp",
            Addressing::Accumulator => "acc",
            Addressing::Immediate => "imm",
            Addressing::Absolute => "abs",
            Addressing::AbsoluteX => "abs,x",
            Addressing::AbsoluteY => "abs,y",
            Addressing::Indirect => "(ind)",
            Addressing::ZeroPage => "zp",
            Addressing::ZeroPageX => "zp,x",
            Addressing::ZeroPageY => "zp,y",
            Addressing::IndirectX => "(zp,x)",
            Addressing::IndirectY => "(zp),y",
            Addressing::Relative => "rel",
        };
        f.write_str(name)
    }
}

/// How an instruction touches its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
    ReadModifyWrite,
    /// Branches, stack and control flow, register-only instructions.
    Internal,
}
