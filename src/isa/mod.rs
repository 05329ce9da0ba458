//! APEX Instruction Set Architecture.
//!
//! Opcode table, decoded instruction representation, program text parser,
//! formatting, and the read-only instruction store.

/// Instruction formatting.
pub mod disasm;

/// Decoded instructions and branch conditions.
pub mod instruction;

/// Opcode numbers, mnemonics and operand layouts.
pub mod opcodes;

/// Program text parser.
pub mod parser;

/// Instruction store.
pub mod program;

pub use instruction::{Condition, Instruction};
pub use opcodes::Opcode;
pub use program::{CodeMemory, RawInstruction};
