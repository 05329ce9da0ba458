//! Branch resolution unit.
//!
//! Holds the branch target buffer and its two-bit direction history.

/// Branch Target Buffer.
pub mod btb;

pub use btb::{BranchResolution, Btb, BtbEntry, History};
