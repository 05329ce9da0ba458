//! Instruction Store.
//!
//! Holds the program as an immutable array of raw instruction records,
//! addressed by program counter. Instruction `i` lives at
//! `base + 4 * i`.

use serde::Serialize;

use crate::common::SimError;

/// Size of one instruction in bytes.
pub const INSN_BYTES: u32 = 4;

/// Default address of the first instruction.
pub const DEFAULT_CODE_BASE: u32 = 4000;

/// Undecoded instruction record as produced by the program builder.
///
/// Register fields that an opcode does not use are zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RawInstruction {
    /// Mnemonic as written in the source text.
    pub mnemonic: String,
    /// Numeric opcode value.
    pub opcode: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Immediate literal.
    pub imm: i32,
}

/// Read-only code memory.
#[derive(Clone, Debug)]
pub struct CodeMemory {
    base: u32,
    last_pc: u32,
    insns: Vec<RawInstruction>,
}

impl CodeMemory {
    /// Creates code memory starting at `base`.
    ///
    /// # Returns
    ///
    /// `SimError::EmptyProgram` if `insns` is empty, `SimError::CodeRange`
    /// if the last instruction would lie beyond the 32-bit address space.
    pub fn new(base: u32, insns: Vec<RawInstruction>) -> Result<Self, SimError> {
        if insns.is_empty() {
            return Err(SimError::EmptyProgram);
        }
        let last_pc = u32::try_from(insns.len() - 1)
            .ok()
            .and_then(|i| i.checked_mul(INSN_BYTES))
            .and_then(|offset| base.checked_add(offset))
            .ok_or(SimError::CodeRange {
                base,
                len: insns.len(),
            })?;
        Ok(Self {
            base,
            last_pc,
            insns,
        })
    }

    /// Address of the first instruction.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.insns.len()
    }

    /// Always false; empty programs are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    /// Address of the last instruction.
    pub fn last_pc(&self) -> u32 {
        self.last_pc
    }

    /// Returns true if `pc` falls inside the code range.
    pub fn contains(&self, pc: u32) -> bool {
        pc >= self.base && pc <= self.last_pc
    }

    /// Fetches the instruction at `pc`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when `pc` lies outside code memory, which lets the
    /// pipeline drain. A PC inside the range that is not on an
    /// instruction boundary is a `MisalignedFetch` fault.
    pub fn fetch(&self, pc: u32) -> Result<Option<&RawInstruction>, SimError> {
        if !self.contains(pc) {
            return Ok(None);
        }
        let offset = pc - self.base;
        if offset % INSN_BYTES != 0 {
            return Err(SimError::MisalignedFetch { pc });
        }
        Ok(self.insns.get((offset / INSN_BYTES) as usize))
    }
}
