//! Pipeline control signals and operation types.
//!
//! Defines the ALU operation selector carried by decoded instructions and
//! the per-cycle control wires that run from later stages back to earlier
//! ones within a single cycle.

use super::latches::PipeEntry;

/// ALU operation types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiply (low 32 bits).
    Mul,
    /// Signed integer divide.
    Div,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
}

/// Control signals produced during one cycle.
///
/// Stages are evaluated from Writeback back to Fetch, so each stage sees the
/// signals raised by the stages after it. Latch contents never travel
/// through here; only the bypass copies of results computed this cycle do.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleSignals {
    /// Execute redirected the PC; the Decode latch is discarded.
    pub flush_decode: bool,
    /// Decode could not issue; Fetch holds its PC.
    pub stall: bool,
    /// Result leaving Execute this cycle.
    pub execute_out: Option<PipeEntry>,
    /// Result leaving Memory this cycle.
    pub memory_out: Option<PipeEntry>,
    /// Entry retired by Writeback this cycle.
    pub writeback_out: Option<PipeEntry>,
}
