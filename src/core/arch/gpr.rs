//! APEX General-Purpose Register File.
//!
//! Thirty-two signed 32-bit registers, R0-R31. Unlike many RISC machines,
//! R0 is an ordinary register and may be written.

use crate::isa::instruction::NUM_REGS;

/// General-Purpose Register file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gpr {
    regs: [i32; NUM_REGS],
}

impl Gpr {
    /// Creates a register file with every register cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31)
    pub fn read(&self, idx: usize) -> i32 {
        self.regs[idx]
    }

    /// Writes a register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31)
    /// * `val` - The value to write
    pub fn write(&mut self, idx: usize, val: i32) {
        self.regs[idx] = val;
    }

    /// All register values, R0 first.
    pub fn values(&self) -> &[i32; NUM_REGS] {
        &self.regs
    }

    /// Formats the register file four registers per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for i in (0..NUM_REGS).step_by(4) {
            for j in i..i + 4 {
                out.push_str(&format!("R{:<2}={:<11} ", j, self.regs[j]));
            }
            out.push('\n');
        }
        out
    }
}
