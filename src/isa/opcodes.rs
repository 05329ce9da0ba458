//! APEX opcode table.
//!
//! Maps every APEX mnemonic to its numeric opcode and to the operand layout
//! used by the assembler-style program text.

/// Numeric opcode values.
pub mod code {
    pub const ADD: u32 = 0x0;
    pub const SUB: u32 = 0x1;
    pub const MUL: u32 = 0x2;
    pub const DIV: u32 = 0x3;
    pub const AND: u32 = 0x4;
    pub const OR: u32 = 0x5;
    pub const XOR: u32 = 0x6;
    pub const MOVC: u32 = 0x7;
    pub const LOAD: u32 = 0x8;
    pub const STORE: u32 = 0x9;
    pub const BZ: u32 = 0xa;
    pub const BNZ: u32 = 0xb;
    pub const HALT: u32 = 0xc;
    pub const ADDL: u32 = 0x10;
    pub const SUBL: u32 = 0x11;
    pub const LOADP: u32 = 0x12;
    pub const STOREP: u32 = 0x13;
    pub const CMP: u32 = 0x14;
    pub const CML: u32 = 0x15;
    pub const NOP: u32 = 0x16;
    pub const BP: u32 = 0x17;
    pub const BNP: u32 = 0x18;
    pub const BN: u32 = 0x19;
    pub const BNN: u32 = 0x20;
    pub const JUMP: u32 = 0x21;
    pub const JALR: u32 = 0x22;
}

/// Operand layout of an instruction in program text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandLayout {
    /// `rd, rs1, rs2`
    RdRsRs,
    /// `rd, rs1, #imm`
    RdRsImm,
    /// `rd, #imm`
    RdImm,
    /// `rs1, rs2, #imm` (stores: data register, then base register)
    RsRsImm,
    /// `rs1, rs2`
    RsRs,
    /// `rs1, #imm`
    RsImm,
    /// `#imm`
    Imm,
    /// No operands.
    None,
}

/// Every opcode of the APEX ISA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Movc,
    Load,
    Store,
    Bz,
    Bnz,
    Halt,
    Addl,
    Subl,
    Loadp,
    Storep,
    Cmp,
    Cml,
    Nop,
    Bp,
    Bnp,
    Bn,
    Bnn,
    Jump,
    Jalr,
}

impl Opcode {
    /// All opcodes, in numeric order.
    pub const ALL: [Opcode; 26] = [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::And,
        Opcode::Or,
        Opcode::Xor,
        Opcode::Movc,
        Opcode::Load,
        Opcode::Store,
        Opcode::Bz,
        Opcode::Bnz,
        Opcode::Halt,
        Opcode::Addl,
        Opcode::Subl,
        Opcode::Loadp,
        Opcode::Storep,
        Opcode::Cmp,
        Opcode::Cml,
        Opcode::Nop,
        Opcode::Bp,
        Opcode::Bnp,
        Opcode::Bn,
        Opcode::Bnn,
        Opcode::Jump,
        Opcode::Jalr,
    ];

    /// Returns the numeric opcode value.
    pub fn code(self) -> u32 {
        match self {
            Opcode::Add => code::ADD,
            Opcode::Sub => code::SUB,
            Opcode::Mul => code::MUL,
            Opcode::Div => code::DIV,
            Opcode::And => code::AND,
            Opcode::Or => code::OR,
            Opcode::Xor => code::XOR,
            Opcode::Movc => code::MOVC,
            Opcode::Load => code::LOAD,
            Opcode::Store => code::STORE,
            Opcode::Bz => code::BZ,
            Opcode::Bnz => code::BNZ,
            Opcode::Halt => code::HALT,
            Opcode::Addl => code::ADDL,
            Opcode::Subl => code::SUBL,
            Opcode::Loadp => code::LOADP,
            Opcode::Storep => code::STOREP,
            Opcode::Cmp => code::CMP,
            Opcode::Cml => code::CML,
            Opcode::Nop => code::NOP,
            Opcode::Bp => code::BP,
            Opcode::Bnp => code::BNP,
            Opcode::Bn => code::BN,
            Opcode::Bnn => code::BNN,
            Opcode::Jump => code::JUMP,
            Opcode::Jalr => code::JALR,
        }
    }

    /// Looks up an opcode by its numeric value.
    ///
    /// # Returns
    ///
    /// `None` if the value is not part of the ISA.
    pub fn from_code(value: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.code() == value)
    }

    /// Returns the assembler mnemonic, upper case.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Movc => "MOVC",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Bz => "BZ",
            Opcode::Bnz => "BNZ",
            Opcode::Halt => "HALT",
            Opcode::Addl => "ADDL",
            Opcode::Subl => "SUBL",
            Opcode::Loadp => "LOADP",
            Opcode::Storep => "STOREP",
            Opcode::Cmp => "CMP",
            Opcode::Cml => "CML",
            Opcode::Nop => "NOP",
            Opcode::Bp => "BP",
            Opcode::Bnp => "BNP",
            Opcode::Bn => "BN",
            Opcode::Bnn => "BNN",
            Opcode::Jump => "JUMP",
            Opcode::Jalr => "JALR",
        }
    }

    /// Looks up an opcode by mnemonic, ignoring case.
    pub fn from_mnemonic(text: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(text))
    }

    /// Returns the operand layout used in program text.
    pub fn layout(self) -> OperandLayout {
        match self {
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor => OperandLayout::RdRsRs,
            Opcode::Addl | Opcode::Subl | Opcode::Load | Opcode::Loadp | Opcode::Jalr => {
                OperandLayout::RdRsImm
            }
            Opcode::Movc => OperandLayout::RdImm,
            Opcode::Store | Opcode::Storep => OperandLayout::RsRsImm,
            Opcode::Cmp => OperandLayout::RsRs,
            Opcode::Cml | Opcode::Jump => OperandLayout::RsImm,
            Opcode::Bz | Opcode::Bnz | Opcode::Bp | Opcode::Bnp | Opcode::Bn | Opcode::Bnn => {
                OperandLayout::Imm
            }
            Opcode::Nop | Opcode::Halt => OperandLayout::None,
        }
    }
}
