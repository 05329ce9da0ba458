//! Condition flags.
//!
//! Every flag-setting instruction recomputes all three flags, so exactly one
//! of them is set afterwards. All three are clear at reset.

use serde::Serialize;

/// The zero, positive and negative condition flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Flags {
    pub zero: bool,
    pub positive: bool,
    pub negative: bool,
}

impl Flags {
    /// Sets the flags from the sign of an ALU result.
    pub fn set_from_result(&mut self, value: i32) {
        self.zero = value == 0;
        self.positive = value > 0;
        self.negative = value < 0;
    }

    /// Sets the flags from a signed comparison of `lhs` against `rhs`.
    pub fn set_from_compare(&mut self, lhs: i32, rhs: i32) {
        self.zero = lhs == rhs;
        self.positive = lhs > rhs;
        self.negative = lhs < rhs;
    }
}
