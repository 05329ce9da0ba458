//! Simulator error definitions.
//!
//! Every failure the simulator can report is a variant of [`SimError`]:
//! problems with the program source, faults raised by an instruction while
//! it moves through the pipeline, and configuration errors.

use std::path::PathBuf;

use thiserror::Error;

use super::data::AccessType;

/// Errors produced while loading or simulating an APEX program.
///
/// Pipeline faults carry the program counter of the offending instruction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// The program file could not be opened or read.
    #[error("cannot read program '{}': {reason}", path.display())]
    SourceUnavailable {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error message.
        reason: String,
    },

    /// The program contains no instructions.
    #[error("program contains no instructions")]
    EmptyProgram,

    /// The program does not fit between its base address and the top of
    /// the address space.
    #[error("{len} instructions at base {base} overflow the code address space")]
    CodeRange {
        /// Address of the first instruction.
        base: u32,
        /// Number of instructions in the program.
        len: usize,
    },

    /// A line of program text could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// One-based source line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// An instruction word carries an opcode outside the ISA.
    #[error("invalid opcode {opcode:#x} at pc {pc}")]
    InvalidOpcode {
        /// Address of the instruction.
        pc: u32,
        /// Raw opcode value.
        opcode: u32,
    },

    /// An instruction names a register outside R0-R31.
    #[error("invalid register R{register} at pc {pc}")]
    InvalidRegister {
        /// Address of the instruction.
        pc: u32,
        /// Register index found in the instruction.
        register: usize,
    },

    /// DIV executed with a zero divisor.
    #[error("division by zero at pc {pc}")]
    DivisionByZero {
        /// Address of the DIV instruction.
        pc: u32,
    },

    /// A load or store addressed a word outside data memory.
    #[error("memory {access} fault at address {address} (pc {pc})")]
    MemoryFault {
        /// Address of the memory instruction.
        pc: u32,
        /// Effective address that was accessed.
        address: i32,
        /// Kind of access.
        access: AccessType,
    },

    /// The PC points inside code memory but not at an instruction boundary.
    #[error("misaligned instruction fetch at pc {pc}")]
    MisalignedFetch {
        /// Offending program counter.
        pc: u32,
    },

    /// The configuration file is unreadable or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
