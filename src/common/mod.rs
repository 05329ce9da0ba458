//! Common types used throughout the APEX pipeline simulator.
//!
//! This module provides the error type and the memory access
//! classification shared by the loader, the pipeline stages and the driver.

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use data::AccessType;
pub use error::SimError;
