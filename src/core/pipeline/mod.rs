//! Instruction pipeline implementation.
//!
//! This module contains the five-stage instruction pipeline (fetch, decode,
//! execute, memory, writeback), the latches between stages, hazard detection
//! and forwarding logic, and the per-cycle control signals.

/// Pipeline hazard detection and forwarding logic.
pub mod hazards;

/// Pipeline latches (Fetch, Decode, Execute, Memory, Writeback).
pub mod latches;

/// ALU operations and per-cycle control signals.
pub mod signals;

/// Pipeline stage implementations (fetch, decode, execute, memory, writeback).
pub mod stages;

/// Latch and hazard policy interfaces.
pub mod traits;
