//! Memory Access Types.
//!
//! Classifies the data-memory accesses performed by the Memory stage so that
//! faults can report which kind of access went out of bounds.

use std::fmt;

use serde::Serialize;

/// Type of data memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AccessType {
    /// Data read access (LOAD, LOADP).
    Read,

    /// Data write access (STORE, STOREP).
    Write,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Read => write!(f, "read"),
            AccessType::Write => write!(f, "write"),
        }
    }
}
