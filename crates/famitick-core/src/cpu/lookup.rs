use crate::cpu::{
    addressing::Addressing as A,
    delta::OpFn,
    mnemonic::Mnemonic,
    step::{self, Step},
};

/// One decoded opcode: what it is, how it addresses memory, and the
/// per-cycle steps that follow its fetch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Instruction {
    pub(crate) mnemonic: Mnemonic,
    pub(crate) mode: A,
    pub(crate) op: OpFn,
    pub(crate) steps: &'static [Step],
}

impl Instruction {
    const fn new(mnemonic: Mnemonic, mode: A) -> Self {
        Self {
            mnemonic,
            mode,
            op: mnemonic.op(),
            steps: step::sequence(mnemonic, mode),
        }
    }
}

// Short aliases for addressing modes (to keep the 16x16 table readable)
const IMP: A = A::Implied;
const ACC: A = A::Accumulator;
const IMM: A = A::Immediate;
const REL: A = A::Relative;
const ZP: A = A::ZeroPage;
const ZPX: A = A::ZeroPageX;
const ZPY: A = A::ZeroPageY;
const ABS: A = A::Absolute;
const ABX: A = A::AbsoluteX;
const ABY: A = A::AbsoluteY;
const IND: A = A::Indirect;
const INX: A = A::IndirectX;
const INY: A = A::IndirectY;

macro_rules! op {
    ($mnemonic:ident, $mode:ident) => {
        Instruction::new(Mnemonic::$mnemonic, $mode)
    };
}

#[rustfmt::skip]
pub(crate) static LOOKUP_TABLE: [Instruction; 256] = [
    // 0               1               2               3               4               5               6               7
    // 8               9               A               B               C               D               E               F

    // 0x00
    op!(BRK, IMP), op!(ORA, INX), op!(JAM, IMP), op!(SLO, INX), op!(NOP, ZP),  op!(ORA, ZP),  op!(ASL, ZP),  op!(SLO, ZP),
    op!(PHP, IMP), op!(ORA, IMM), op!(ASL, ACC), op!(ANC, IMM), op!(NOP, ABS), op!(ORA, ABS), op!(ASL, ABS), op!(SLO, ABS),

    // 0x10
    op!(BPL, REL), op!(ORA, INY), op!(JAM, IMP), op!(SLO, INY), op!(NOP, ZPX), op!(ORA, ZPX), op!(ASL, ZPX), op!(SLO, ZPX),
    op!(CLC, IMP), op!(ORA, ABY), op!(NOP, IMP), op!(SLO, ABY), op!(NOP, ABX), op!(ORA, ABX), op!(ASL, ABX), op!(SLO, ABX),

    // 0x20
    op!(JSR, ABS), op!(AND, INX), op!(JAM, IMP), op!(RLA, INX), op!(BIT, ZP),  op!(AND, ZP),  op!(ROL, ZP),  op!(RLA, ZP),
    op!(PLP, IMP), op!(AND, IMM), op!(ROL, ACC), op!(ANC, IMM), op!(BIT, ABS), op!(AND, ABS), op!(ROL, ABS), op!(RLA, ABS),

    // 0x30
    op!(BMI, REL), op!(AND, INY), op!(JAM, IMP), op!(RLA, INY), op!(NOP, ZPX), op!(AND, ZPX), op!(ROL, ZPX), op!(RLA, ZPX),
    op!(SEC, IMP), op!(AND, ABY), op!(NOP, IMP), op!(RLA, ABY), op!(NOP, ABX), op!(AND, ABX), op!(ROL, ABX), op!(RLA, ABX),

    // 0x40
    op!(RTI, IMP), op!(EOR, INX), op!(JAM, IMP), op!(SRE, INX), op!(NOP, ZP),  op!(EOR, ZP),  op!(LSR, ZP),  op!(SRE, ZP),
    op!(PHA, IMP), op!(EOR, IMM), op!(LSR, ACC), op!(ALR, IMM), op!(JMP, ABS), op!(EOR, ABS), op!(LSR, ABS), op!(SRE, ABS),

    // 0x50
    op!(BVC, REL), op!(EOR, INY), op!(JAM, IMP), op!(SRE, INY), op!(NOP, ZPX), op!(EOR, ZPX), op!(LSR, ZPX), op!(SRE, ZPX),
    op!(CLI, IMP), op!(EOR, ABY), op!(NOP, IMP), op!(SRE, ABY), op!(NOP, ABX), op!(EOR, ABX), op!(LSR, ABX), op!(SRE, ABX),

    // 0x60
    op!(RTS, IMP), op!(ADC, INX), op!(JAM, IMP), op!(RRA, INX), op!(NOP, ZP),  op!(ADC, ZP),  op!(ROR, ZP),  op!(RRA, ZP),
    op!(PLA, IMP), op!(ADC, IMM), op!(ROR, ACC), op!(ARR, IMM), op!(JMP, IND), op!(ADC, ABS), op!(ROR, ABS), op!(RRA, ABS),

    // 0x70
    op!(BVS, REL), op!(ADC, INY), op!(JAM, IMP), op!(RRA, INY), op!(NOP, ZPX), op!(ADC, ZPX), op!(ROR, ZPX), op!(RRA, ZPX),
    op!(SEI, IMP), op!(ADC, ABY), op!(NOP, IMP), op!(RRA, ABY), op!(NOP, ABX), op!(ADC, ABX), op!(ROR, ABX), op!(RRA, ABX),

    // 0x80
    op!(NOP, IMM), op!(STA, INX), op!(NOP, IMM), op!(SAX, INX), op!(STY, ZP),  op!(STA, ZP),  op!(STX, ZP),  op!(SAX, ZP),
    op!(DEY, IMP), op!(NOP, IMM), op!(TXA, IMP), op!(XAA, IMM), op!(STY, ABS), op!(STA, ABS), op!(STX, ABS), op!(SAX, ABS),

    // 0x90
    op!(BCC, REL), op!(STA, INY), op!(JAM, IMP), op!(SHA, INY), op!(STY, ZPX), op!(STA, ZPX), op!(STX, ZPY), op!(SAX, ZPY),
    op!(TYA, IMP), op!(STA, ABY), op!(TXS, IMP), op!(TAS, ABY), op!(SHY, ABX), op!(STA, ABX), op!(SHX, ABY), op!(SHA, ABY),

    // 0xA0
    op!(LDY, IMM), op!(LDA, INX), op!(LDX, IMM), op!(LAX, INX), op!(LDY, ZP),  op!(LDA, ZP),  op!(LDX, ZP),  op!(LAX, ZP),
    op!(TAY, IMP), op!(LDA, IMM), op!(TAX, IMP), op!(LAX, IMM), op!(LDY, ABS), op!(LDA, ABS), op!(LDX, ABS), op!(LAX, ABS),

    // 0xB0
    op!(BCS, REL), op!(LDA, INY), op!(JAM, IMP), op!(LAX, INY), op!(LDY, ZPX), op!(LDA, ZPX), op!(LDX, ZPY), op!(LAX, ZPY),
    op!(CLV, IMP), op!(LDA, ABY), op!(TSX, IMP), op!(LAS, ABY), op!(LDY, ABX), op!(LDA, ABX), op!(LDX, ABY), op!(LAX, ABY),

    // 0xC0
    op!(CPY, IMM), op!(CMP, INX), op!(NOP, IMM), op!(DCP, INX), op!(CPY, ZP),  op!(CMP, ZP),  op!(DEC, ZP),  op!(DCP, ZP),
    op!(INY, IMP), op!(CMP, IMM), op!(DEX, IMP), op!(AXS, IMM), op!(CPY, ABS), op!(CMP, ABS), op!(DEC, ABS), op!(DCP, ABS),

    // 0xD0
    op!(BNE, REL), op!(CMP, INY), op!(JAM, IMP), op!(DCP, INY), op!(NOP, ZPX), op!(CMP, ZPX), op!(DEC, ZPX), op!(DCP, ZPX),
    op!(CLD, IMP), op!(CMP, ABY), op!(NOP, IMP), op!(DCP, ABY), op!(NOP, ABX), op!(CMP, ABX), op!(DEC, ABX), op!(DCP, ABX),

    // 0xE0
    op!(CPX, IMM), op!(SBC, INX), op!(NOP, IMM), op!(ISC, INX), op!(CPX, ZP),  op!(SBC, ZP),  op!(INC, ZP),  op!(ISC, ZP),
    op!(INX, IMP), op!(SBC, IMM), op!(NOP, IMP), op!(SBC, IMM), op!(CPX, ABS), op!(SBC, ABS), op!(INC, ABS), op!(ISC, ABS),

    // 0xF0
    op!(BEQ, REL), op!(SBC, INY), op!(JAM, IMP), op!(ISC, INY), op!(NOP, ZPX), op!(SBC, ZPX), op!(INC, ZPX), op!(ISC, ZPX),
    op!(SED, IMP), op!(SBC, ABY), op!(NOP, IMP), op!(ISC, ABY), op!(NOP, ABX), op!(SBC, ABX), op!(INC, ABX), op!(ISC, ABX),
];
