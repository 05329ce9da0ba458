//! Processor core.
//!
//! The CPU, its architectural state, the pipeline, and the functional
//! units used by the pipeline stages.

/// Architectural state: registers, flags, data memory.
pub mod arch;

/// The CPU and its cycle driver.
pub mod cpu;

/// The five-stage pipeline.
pub mod pipeline;

/// ALU and branch resolution unit.
pub mod units;

pub use cpu::Cpu;
