//! Functional units used by the pipeline stages.

/// Arithmetic Logic Unit.
pub mod alu;

/// Branch resolution unit (BTB).
pub mod bru;
