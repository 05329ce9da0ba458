//! Data memory.
//!
//! A flat array of signed 32-bit words indexed directly by the effective
//! address computed in Execute. Addresses are word indices, not byte
//! offsets.

use crate::common::AccessType;

/// Default number of data words.
pub const DEFAULT_DATA_WORDS: usize = 4096;

/// An access outside data memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfBounds {
    pub address: i32,
    pub access: AccessType,
}

/// Word-addressed data memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataMemory {
    words: Vec<i32>,
}

impl DataMemory {
    /// Creates a zero-filled memory of `size` words.
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size],
        }
    }

    /// Capacity in words.
    pub fn size(&self) -> usize {
        self.words.len()
    }

    fn index(&self, address: i32, access: AccessType) -> Result<usize, OutOfBounds> {
        usize::try_from(address)
            .ok()
            .filter(|&idx| idx < self.words.len())
            .ok_or(OutOfBounds { address, access })
    }

    /// Reads the word at `address`.
    pub fn read(&self, address: i32) -> Result<i32, OutOfBounds> {
        let idx = self.index(address, AccessType::Read)?;
        Ok(self.words[idx])
    }

    /// Writes `value` to the word at `address`.
    pub fn write(&mut self, address: i32, value: i32) -> Result<(), OutOfBounds> {
        let idx = self.index(address, AccessType::Write)?;
        self.words[idx] = value;
        Ok(())
    }

    /// Iterates over `(address, value)` for every non-zero word.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.words
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, v)| v != 0)
    }
}
