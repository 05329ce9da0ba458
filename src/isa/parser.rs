//! Program text parser.
//!
//! Builds the instruction array from assembler-style text. Each non-blank
//! line holds one instruction: a mnemonic followed by comma-separated
//! operands, registers written `R<n>` and literals `#<n>`:
//!
//! ```text
//! MOVC,R1,#5        ; comment
//! ADD,R2,R1,R1
//! STORE,R2,R0,#16
//! HALT
//! ```
//!
//! Text after `;` or `//` is ignored. Mnemonics and the `R` prefix are
//! case-insensitive. Branch offsets must land on an instruction boundary.

use crate::common::SimError;

use super::instruction::NUM_REGS;
use super::opcodes::{Opcode, OperandLayout};
use super::program::{RawInstruction, INSN_BYTES};

/// Parses a whole program.
///
/// # Returns
///
/// The instructions in program order, or a `Parse` error naming the first
/// bad line. An input with no instructions yields an empty vector; code
/// memory construction rejects it.
pub fn parse_program(text: &str) -> Result<Vec<RawInstruction>, SimError> {
    let mut insns = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if let Some(insn) = parse_line(line).map_err(|message| SimError::Parse {
            line: line_no,
            message,
        })? {
            insns.push(insn);
        }
    }
    Ok(insns)
}

/// Parses one line; `Ok(None)` for blank and comment-only lines.
pub fn parse_line(line: &str) -> Result<Option<RawInstruction>, String> {
    let code = strip_comment(line).trim();
    if code.is_empty() {
        return Ok(None);
    }

    let tokens: Vec<&str> = code
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    let (mnemonic, operands) = match tokens.split_first() {
        Some((m, rest)) => (*m, rest),
        None => return Ok(None),
    };

    let opcode =
        Opcode::from_mnemonic(mnemonic).ok_or_else(|| format!("unknown mnemonic '{}'", mnemonic))?;
    let layout = opcode.layout();
    let expected = operand_count(layout);
    if operands.len() != expected {
        return Err(format!(
            "{} expects {} operand(s), found {}",
            opcode.mnemonic(),
            expected,
            operands.len()
        ));
    }

    let mut insn = RawInstruction {
        mnemonic: opcode.mnemonic().to_string(),
        opcode: opcode.code(),
        ..Default::default()
    };

    match layout {
        OperandLayout::RdRsRs => {
            insn.rd = register(operands[0])?;
            insn.rs1 = register(operands[1])?;
            insn.rs2 = register(operands[2])?;
        }
        OperandLayout::RdRsImm => {
            insn.rd = register(operands[0])?;
            insn.rs1 = register(operands[1])?;
            insn.imm = literal(operands[2])?;
        }
        OperandLayout::RdImm => {
            insn.rd = register(operands[0])?;
            insn.imm = literal(operands[1])?;
        }
        OperandLayout::RsRsImm => {
            insn.rs1 = register(operands[0])?;
            insn.rs2 = register(operands[1])?;
            insn.imm = literal(operands[2])?;
        }
        OperandLayout::RsRs => {
            insn.rs1 = register(operands[0])?;
            insn.rs2 = register(operands[1])?;
        }
        OperandLayout::RsImm => {
            insn.rs1 = register(operands[0])?;
            insn.imm = literal(operands[1])?;
        }
        OperandLayout::Imm => {
            insn.imm = literal(operands[0])?;
            if insn.imm % INSN_BYTES as i32 != 0 {
                return Err(format!(
                    "branch offset {} is not a multiple of {}",
                    insn.imm, INSN_BYTES
                ));
            }
        }
        OperandLayout::None => {}
    }

    Ok(Some(insn))
}

fn strip_comment(line: &str) -> &str {
    let end = [line.find(';'), line.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    &line[..end]
}

fn operand_count(layout: OperandLayout) -> usize {
    match layout {
        OperandLayout::RdRsRs | OperandLayout::RdRsImm | OperandLayout::RsRsImm => 3,
        OperandLayout::RdImm | OperandLayout::RsRs | OperandLayout::RsImm => 2,
        OperandLayout::Imm => 1,
        OperandLayout::None => 0,
    }
}

fn register(token: &str) -> Result<usize, String> {
    let digits = token
        .strip_prefix('R')
        .or_else(|| token.strip_prefix('r'))
        .ok_or_else(|| format!("expected register, found '{}'", token))?;
    let idx: usize = digits
        .parse()
        .map_err(|_| format!("bad register '{}'", token))?;
    if idx >= NUM_REGS {
        return Err(format!("register '{}' out of range R0-R{}", token, NUM_REGS - 1));
    }
    Ok(idx)
}

fn literal(token: &str) -> Result<i32, String> {
    let digits = token
        .strip_prefix('#')
        .ok_or_else(|| format!("expected literal '#<n>', found '{}'", token))?;
    digits
        .parse()
        .map_err(|_| format!("bad literal '{}'", token))
}
