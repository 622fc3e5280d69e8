use std::fmt::Display;

use crate::cpu::{addressing::AccessKind, delta::OpFn, ops};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    //Load/Store
    LAS,
    LAX,
    LDA,
    LDX,
    LDY,
    SAX,
    SHA,
    SHX,
    SHY,
    STA,
    STX,
    STY,
    //Transfer
    TAS,
    TAX,
    TAY,
    TSX,
    TXA,
    TXS,
    TYA,
    //Stack
    PHA,
    PHP,
    PLA,
    PLP,
    //Shift
    ASL,
    LSR,
    ROL,
    ROR,
    //Logic
    AND,
    BIT,
    EOR,
    ORA,
    //Arithmetic
    ADC,
    ANC,
    ARR,
    ALR,
    CMP,
    CPX,
    CPY,
    DCP,
    ISC,
    RLA,
    RRA,
    SBC,
    AXS,
    SLO,
    SRE,
    XAA,
    //Increment/Decrement
    DEC,
    DEX,
    DEY,
    INC,
    INX,
    INY,
    //Control Flow
    BRK,
    JMP,
    JSR,
    RTI,
    RTS,
    //Branch
    BCC,
    BCS,
    BEQ,
    BMI,
    BNE,
    BPL,
    BVC,
    BVS,
    //Flags
    CLC,
    CLD,
    CLI,
    CLV,
    SEC,
    SED,
    SEI,
    //Kil
    JAM,
    //Nop
    NOP,
}

impl Mnemonic {
    /// Operand access pattern, which selects the addressing micro-steps.
    pub const fn access(self) -> AccessKind {
        use Mnemonic::*;
        match self {
            LDA | LDX | LDY | LAX | LAS | ADC | SBC | AND | ORA | EOR | BIT | CMP | CPX
            | CPY | ANC | ALR | ARR | XAA | AXS | NOP => AccessKind::Read,
            STA | STX | STY | SAX | SHA | SHX | SHY | TAS => AccessKind::Write,
            ASL | LSR | ROL | ROR | INC | DEC | SLO | RLA | SRE | RRA | DCP | ISC => {
                AccessKind::ReadModifyWrite
            }
            _ => AccessKind::Internal,
        }
    }

    /// Delta function executed on the instruction's final data cycle.
    ///
    /// BRK, JSR, RTS and RTI are driven entirely by their step lists and
    /// never reach their delta.
    pub(crate) const fn op(self) -> OpFn {
        use Mnemonic::*;
        match self {
            LAS => ops::las,
            LAX => ops::lax,
            LDA => ops::lda,
            LDX => ops::ldx,
            LDY => ops::ldy,
            SAX => ops::sax,
            SHA => ops::sha,
            SHX => ops::shx,
            SHY => ops::shy,
            STA => ops::sta,
            STX => ops::stx,
            STY => ops::sty,
            TAS => ops::tas,
            TAX => ops::tax,
            TAY => ops::tay,
            TSX => ops::tsx,
            TXA => ops::txa,
            TXS => ops::txs,
            TYA => ops::tya,
            PHA => ops::pha,
            PHP => ops::php,
            PLA => ops::pla,
            PLP => ops::plp,
            ASL => ops::asl,
            LSR => ops::lsr,
            ROL => ops::rol,
            ROR => ops::ror,
            AND => ops::and,
            BIT => ops::bit,
            EOR => ops::eor,
            ORA => ops::ora,
            ADC => ops::adc,
            ANC => ops::anc,
            ARR => ops::arr,
            ALR => ops::alr,
            CMP => ops::cmp,
            CPX => ops::cpx,
            CPY => ops::cpy,
            DCP => ops::dcp,
            ISC => ops::isc,
            RLA => ops::rla,
            RRA => ops::rra,
            SBC => ops::sbc,
            AXS => ops::axs,
            SLO => ops::slo,
            SRE => ops::sre,
            XAA => ops::xaa,
            DEC => ops::dec,
            DEX => ops::dex,
            DEY => ops::dey,
            INC => ops::inc,
            INX => ops::inx,
            INY => ops::iny,
            JMP => ops::jmp,
            BCC => ops::bcc,
            BCS => ops::bcs,
            BEQ => ops::beq,
            BMI => ops::bmi,
            BNE => ops::bne,
            BPL => ops::bpl,
            BVC => ops::bvc,
            BVS => ops::bvs,
            CLC => ops::clc,
            CLD => ops::cld,
            CLI => ops::cli,
            CLV => ops::clv,
            SEC => ops::sec,
            SED => ops::sed,
            SEI => ops::sei,
            JAM => ops::jam,
            BRK | JSR | RTI | RTS | NOP => ops::nop,
        }
    }
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
