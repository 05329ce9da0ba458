//! Decoded APEX instructions.
//!
//! [`Instruction`] is a closed set of instruction kinds, each carrying only
//! the operands it uses. The pipeline dispatches on it with exhaustive
//! matches, so an opcode outside the ISA can only exist as a
//! [`RawInstruction`] and is rejected by [`Instruction::decode`].

use serde::Serialize;

use crate::common::SimError;
use crate::core::arch::flags::Flags;
use crate::core::pipeline::signals::AluOp;

use super::opcodes::Opcode;
use super::program::RawInstruction;

/// Number of architectural registers.
pub const NUM_REGS: usize = 32;

/// Branch conditions, evaluated against the condition flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Condition {
    /// BZ: zero flag set.
    Zero,
    /// BNZ: zero flag clear.
    NotZero,
    /// BP: positive flag set.
    Positive,
    /// BNP: positive flag clear.
    NotPositive,
    /// BN: negative flag set.
    Negative,
    /// BNN: negative flag clear.
    NotNegative,
}

impl Condition {
    /// Returns true if the branch is taken under `flags`.
    pub fn evaluate(self, flags: &Flags) -> bool {
        match self {
            Condition::Zero => flags.zero,
            Condition::NotZero => !flags.zero,
            Condition::Positive => flags.positive,
            Condition::NotPositive => !flags.positive,
            Condition::Negative => flags.negative,
            Condition::NotNegative => !flags.negative,
        }
    }

    /// Forms that are usually taken in compiled loops (BNZ, BP).
    pub fn is_taken_biased(self) -> bool {
        matches!(self, Condition::NotZero | Condition::Positive)
    }

    fn opcode(self) -> Opcode {
        match self {
            Condition::Zero => Opcode::Bz,
            Condition::NotZero => Opcode::Bnz,
            Condition::Positive => Opcode::Bp,
            Condition::NotPositive => Opcode::Bnp,
            Condition::Negative => Opcode::Bn,
            Condition::NotNegative => Opcode::Bnn,
        }
    }
}

/// A decoded instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Instruction {
    /// Register-register arithmetic and logic: ADD SUB MUL DIV AND OR XOR.
    Arith {
        op: AluOp,
        rd: usize,
        rs1: usize,
        rs2: usize,
    },
    /// Register-literal arithmetic: ADDL SUBL.
    ArithImm {
        op: AluOp,
        rd: usize,
        rs1: usize,
        imm: i32,
    },
    /// MOVC: load a literal.
    Movc { rd: usize, imm: i32 },
    /// LOAD, or LOADP when `post_increment` is set (rs1 += 4).
    Load {
        rd: usize,
        rs1: usize,
        imm: i32,
        post_increment: bool,
    },
    /// STORE, or STOREP when `post_increment` is set (rs2 += 4).
    /// `rs1` holds the data, `rs2` the base address.
    Store {
        rs1: usize,
        rs2: usize,
        imm: i32,
        post_increment: bool,
    },
    /// CMP: compare two registers.
    Cmp { rs1: usize, rs2: usize },
    /// CML: compare a register with a literal.
    Cml { rs1: usize, imm: i32 },
    /// PC-relative conditional branch.
    Branch { cond: Condition, offset: i32 },
    /// JUMP: absolute jump to `rs1 + imm`.
    Jump { rs1: usize, imm: i32 },
    /// JALR: jump to `rs1 + imm`, link `pc + 4` into `rd`.
    Jalr { rd: usize, rs1: usize, imm: i32 },
    /// No operation.
    #[default]
    Nop,
    /// Stops the machine when it retires.
    Halt,
}

impl Instruction {
    /// Decodes a raw instruction record.
    ///
    /// # Arguments
    ///
    /// * `raw` - The record from code memory
    /// * `pc` - Address of the record, used for error reporting
    ///
    /// # Returns
    ///
    /// The decoded instruction, or `InvalidOpcode` / `InvalidRegister`.
    pub fn decode(raw: &RawInstruction, pc: u32) -> Result<Self, SimError> {
        let opcode = Opcode::from_code(raw.opcode).ok_or(SimError::InvalidOpcode {
            pc,
            opcode: raw.opcode,
        })?;
        let reg = |register: usize| {
            if register < NUM_REGS {
                Ok(register)
            } else {
                Err(SimError::InvalidRegister { pc, register })
            }
        };
        let arith = |op| -> Result<Self, SimError> {
            Ok(Instruction::Arith {
                op,
                rd: reg(raw.rd)?,
                rs1: reg(raw.rs1)?,
                rs2: reg(raw.rs2)?,
            })
        };
        let branch = |cond| Instruction::Branch {
            cond,
            offset: raw.imm,
        };

        let insn = match opcode {
            Opcode::Add => arith(AluOp::Add)?,
            Opcode::Sub => arith(AluOp::Sub)?,
            Opcode::Mul => arith(AluOp::Mul)?,
            Opcode::Div => arith(AluOp::Div)?,
            Opcode::And => arith(AluOp::And)?,
            Opcode::Or => arith(AluOp::Or)?,
            Opcode::Xor => arith(AluOp::Xor)?,
            Opcode::Addl | Opcode::Subl => Instruction::ArithImm {
                op: if opcode == Opcode::Addl {
                    AluOp::Add
                } else {
                    AluOp::Sub
                },
                rd: reg(raw.rd)?,
                rs1: reg(raw.rs1)?,
                imm: raw.imm,
            },
            Opcode::Movc => Instruction::Movc {
                rd: reg(raw.rd)?,
                imm: raw.imm,
            },
            Opcode::Load | Opcode::Loadp => Instruction::Load {
                rd: reg(raw.rd)?,
                rs1: reg(raw.rs1)?,
                imm: raw.imm,
                post_increment: opcode == Opcode::Loadp,
            },
            Opcode::Store | Opcode::Storep => Instruction::Store {
                rs1: reg(raw.rs1)?,
                rs2: reg(raw.rs2)?,
                imm: raw.imm,
                post_increment: opcode == Opcode::Storep,
            },
            Opcode::Cmp => Instruction::Cmp {
                rs1: reg(raw.rs1)?,
                rs2: reg(raw.rs2)?,
            },
            Opcode::Cml => Instruction::Cml {
                rs1: reg(raw.rs1)?,
                imm: raw.imm,
            },
            Opcode::Bz => branch(Condition::Zero),
            Opcode::Bnz => branch(Condition::NotZero),
            Opcode::Bp => branch(Condition::Positive),
            Opcode::Bnp => branch(Condition::NotPositive),
            Opcode::Bn => branch(Condition::Negative),
            Opcode::Bnn => branch(Condition::NotNegative),
            Opcode::Jump => Instruction::Jump {
                rs1: reg(raw.rs1)?,
                imm: raw.imm,
            },
            Opcode::Jalr => Instruction::Jalr {
                rd: reg(raw.rd)?,
                rs1: reg(raw.rs1)?,
                imm: raw.imm,
            },
            Opcode::Nop => Instruction::Nop,
            Opcode::Halt => Instruction::Halt,
        };
        Ok(insn)
    }

    /// Returns the opcode this instruction was decoded from.
    pub fn opcode(&self) -> Opcode {
        match *self {
            Instruction::Arith { op, .. } => match op {
                AluOp::Add => Opcode::Add,
                AluOp::Sub => Opcode::Sub,
                AluOp::Mul => Opcode::Mul,
                AluOp::Div => Opcode::Div,
                AluOp::And => Opcode::And,
                AluOp::Or => Opcode::Or,
                AluOp::Xor => Opcode::Xor,
            },
            Instruction::ArithImm { op, .. } => match op {
                AluOp::Sub => Opcode::Subl,
                _ => Opcode::Addl,
            },
            Instruction::Movc { .. } => Opcode::Movc,
            Instruction::Load { post_increment, .. } => {
                if post_increment {
                    Opcode::Loadp
                } else {
                    Opcode::Load
                }
            }
            Instruction::Store { post_increment, .. } => {
                if post_increment {
                    Opcode::Storep
                } else {
                    Opcode::Store
                }
            }
            Instruction::Cmp { .. } => Opcode::Cmp,
            Instruction::Cml { .. } => Opcode::Cml,
            Instruction::Branch { cond, .. } => cond.opcode(),
            Instruction::Jump { .. } => Opcode::Jump,
            Instruction::Jalr { .. } => Opcode::Jalr,
            Instruction::Nop => Opcode::Nop,
            Instruction::Halt => Opcode::Halt,
        }
    }

    /// Register read into the `rs1_value` operand slot, if any.
    pub fn src1(&self) -> Option<usize> {
        match *self {
            Instruction::Arith { rs1, .. }
            | Instruction::ArithImm { rs1, .. }
            | Instruction::Load { rs1, .. }
            | Instruction::Store { rs1, .. }
            | Instruction::Cmp { rs1, .. }
            | Instruction::Cml { rs1, .. }
            | Instruction::Jump { rs1, .. }
            | Instruction::Jalr { rs1, .. } => Some(rs1),
            Instruction::Movc { .. }
            | Instruction::Branch { .. }
            | Instruction::Nop
            | Instruction::Halt => None,
        }
    }

    /// Register read into the `rs2_value` operand slot, if any.
    pub fn src2(&self) -> Option<usize> {
        match *self {
            Instruction::Arith { rs2, .. }
            | Instruction::Store { rs2, .. }
            | Instruction::Cmp { rs2, .. } => Some(rs2),
            _ => None,
        }
    }

    /// All registers read by this instruction.
    pub fn sources(&self) -> impl Iterator<Item = usize> {
        self.src1().into_iter().chain(self.src2())
    }

    /// Destination register written with `result` at Writeback.
    pub fn dest(&self) -> Option<usize> {
        match *self {
            Instruction::Arith { rd, .. }
            | Instruction::ArithImm { rd, .. }
            | Instruction::Movc { rd, .. }
            | Instruction::Load { rd, .. }
            | Instruction::Jalr { rd, .. } => Some(rd),
            _ => None,
        }
    }

    /// Base register rewritten with `base + 4` by LOADP / STOREP.
    pub fn base_writeback(&self) -> Option<usize> {
        match *self {
            Instruction::Load {
                rs1,
                post_increment: true,
                ..
            } => Some(rs1),
            Instruction::Store {
                rs2,
                post_increment: true,
                ..
            } => Some(rs2),
            _ => None,
        }
    }

    /// Every register this instruction writes, destination first.
    pub fn writes(&self) -> impl Iterator<Item = usize> {
        self.dest().into_iter().chain(self.base_writeback())
    }

    /// True for LOAD and LOADP.
    pub fn reads_memory(&self) -> bool {
        matches!(self, Instruction::Load { .. })
    }
}
