//! Instruction formatting.
//!
//! Renders instructions in the same comma-separated form the parser accepts,
//! e.g. `ADD,R3,R1,R2` or `STORE,R1,R2,#8`.

use std::fmt;

use super::instruction::Instruction;
use super::opcodes::{Opcode, OperandLayout};
use super::program::RawInstruction;

fn write_operands(
    f: &mut fmt::Formatter<'_>,
    opcode: Opcode,
    rd: usize,
    rs1: usize,
    rs2: usize,
    imm: i32,
) -> fmt::Result {
    write!(f, "{}", opcode.mnemonic())?;
    match opcode.layout() {
        OperandLayout::RdRsRs => write!(f, ",R{},R{},R{}", rd, rs1, rs2),
        OperandLayout::RdRsImm => write!(f, ",R{},R{},#{}", rd, rs1, imm),
        OperandLayout::RdImm => write!(f, ",R{},#{}", rd, imm),
        OperandLayout::RsRsImm => write!(f, ",R{},R{},#{}", rs1, rs2, imm),
        OperandLayout::RsRs => write!(f, ",R{},R{}", rs1, rs2),
        OperandLayout::RsImm => write!(f, ",R{},#{}", rs1, imm),
        OperandLayout::Imm => write!(f, ",#{}", imm),
        OperandLayout::None => Ok(()),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rd, rs1, rs2, imm) = match *self {
            Instruction::Arith { rd, rs1, rs2, .. } => (rd, rs1, rs2, 0),
            Instruction::ArithImm { rd, rs1, imm, .. } => (rd, rs1, 0, imm),
            Instruction::Movc { rd, imm } => (rd, 0, 0, imm),
            Instruction::Load { rd, rs1, imm, .. } => (rd, rs1, 0, imm),
            Instruction::Store { rs1, rs2, imm, .. } => (0, rs1, rs2, imm),
            Instruction::Cmp { rs1, rs2 } => (0, rs1, rs2, 0),
            Instruction::Cml { rs1, imm } => (0, rs1, 0, imm),
            Instruction::Branch { offset, .. } => (0, 0, 0, offset),
            Instruction::Jump { rs1, imm } => (0, rs1, 0, imm),
            Instruction::Jalr { rd, rs1, imm } => (rd, rs1, 0, imm),
            Instruction::Nop | Instruction::Halt => (0, 0, 0, 0),
        };
        write_operands(f, self.opcode(), rd, rs1, rs2, imm)
    }
}

impl fmt::Display for RawInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Opcode::from_code(self.opcode) {
            Some(op) => write_operands(f, op, self.rd, self.rs1, self.rs2, self.imm),
            None => write!(f, "{} <opcode {:#x}>", self.mnemonic, self.opcode),
        }
    }
}
