//! APEX architectural state.
//!
//! Register file, condition flags and data memory: everything a program can
//! observe besides the program counter.

/// Condition flags.
pub mod flags;

/// General-Purpose Register file implementation.
pub mod gpr;

/// Word-addressed data memory.
pub mod memory;
