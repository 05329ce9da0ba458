//! Pipeline latch and hazard policy interfaces.
//!
//! Defines the common behavior of pipeline latches and the interface the
//! Decode stage uses to decide whether an instruction may issue.

use crate::core::arch::gpr::Gpr;
use crate::isa::Instruction;

use super::hazards::{Bypass, Resolution};

/// Represents a pipeline latch (inter-stage buffer).
pub trait PipelineLatch {
    /// Clears the latch, turning it into a bubble.
    ///
    /// Called when a redirect squashes a younger instruction.
    fn flush(&mut self);

    /// Checks if the latch is empty.
    ///
    /// # Returns
    ///
    /// `true` if the latch holds no instruction.
    fn is_empty(&self) -> bool;
}

/// Strategy for resolving data hazards at Decode.
///
/// Implementations are selected once when the CPU is built.
pub trait HazardPolicy {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Decides whether `insn` can issue this cycle and, if so, with which
    /// operand values.
    ///
    /// # Arguments
    ///
    /// * `insn` - The instruction in Decode
    /// * `regs` - Register file, already updated by this cycle's Writeback
    /// * `bypass` - Results produced by the later stages this cycle
    fn resolve(&self, insn: &Instruction, regs: &Gpr, bypass: &Bypass) -> Resolution;

    /// Called when `insn` leaves Decode.
    fn on_issue(&mut self, _insn: &Instruction) {}

    /// Called when `insn` retires in Writeback.
    fn on_retire(&mut self, _insn: &Instruction) {}

    /// Registers currently reserved by in-flight writers.
    fn reserved(&self) -> Vec<usize> {
        Vec::new()
    }
}
