//! Pipeline latch definitions.
//!
//! Five latches sit in front of the five stages. The Fetch and Decode
//! latches hold undecoded instructions ([`IfIdEntry`]); from Execute onward
//! an instruction is carried as a [`PipeEntry`]. Each latch holds at most one
//! entry; an empty latch is a bubble.
//!
//! The CPU keeps one [`Latches`] set as the current state and builds a fresh
//! one every cycle. The new set replaces the old one when the cycle ends.

use serde::Serialize;

use crate::isa::{Instruction, RawInstruction};

use super::traits::PipelineLatch;

/// Branch predictor metadata travelling with an instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Prediction {
    /// Fetch found the PC in the BTB.
    pub hit: bool,
    /// BTB slot tracking this branch (hit at Fetch or allocated at Decode).
    pub index: Option<usize>,
    /// Fetch redirected to the stored target.
    pub taken: bool,
}

/// Entry in the Fetch and Decode latches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IfIdEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Instruction record copied from code memory.
    pub raw: RawInstruction,
    /// Prediction made at Fetch.
    pub prediction: Prediction,
}

/// Entry in the Execute, Memory and Writeback latches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipeEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Decoded instruction.
    pub insn: Instruction,
    /// Value of the first source operand, resolved at Decode.
    pub rs1_value: i32,
    /// Value of the second source operand, resolved at Decode.
    pub rs2_value: i32,
    /// ALU result, loaded value or JALR link address.
    pub result: i32,
    /// `result` holds the final destination value.
    /// False for loads until the Memory stage has run.
    pub result_ready: bool,
    /// Effective data address of a load or store.
    pub mem_address: i32,
    /// Incremented base register of LOADP / STOREP.
    pub base_update: i32,
    /// Prediction made at Fetch, completed at Decode.
    pub prediction: Prediction,
}

/// A single-entry pipeline latch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Latch<T> {
    /// The held entry; `None` is a bubble.
    pub entry: Option<T>,
}

impl<T> Default for Latch<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> Latch<T> {
    /// Creates a latch holding `entry`.
    pub fn holding(entry: T) -> Self {
        Self { entry: Some(entry) }
    }

    /// Borrows the held entry.
    pub fn get(&self) -> Option<&T> {
        self.entry.as_ref()
    }
}

impl<T> PipelineLatch for Latch<T> {
    fn flush(&mut self) {
        self.entry = None;
    }

    fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

/// Pipeline stages, in program order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    Fetch,
    Decode,
    Execute,
    Memory,
    Writeback,
}

impl Stage {
    /// All stages, Fetch first.
    pub const ALL: [Stage; 5] = [
        Stage::Fetch,
        Stage::Decode,
        Stage::Execute,
        Stage::Memory,
        Stage::Writeback,
    ];

    /// Display name used in dumps and traces.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Fetch => "Fetch",
            Stage::Decode => "Decode/RF",
            Stage::Execute => "Execute",
            Stage::Memory => "Memory",
            Stage::Writeback => "Writeback",
        }
    }
}

/// The full set of pipeline latches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Latches {
    /// Last instruction read by Fetch (display only).
    pub fetch: Latch<IfIdEntry>,
    /// Input of the Decode/RF stage.
    pub decode: Latch<IfIdEntry>,
    /// Input of the Execute stage.
    pub execute: Latch<PipeEntry>,
    /// Input of the Memory stage.
    pub memory: Latch<PipeEntry>,
    /// Input of the Writeback stage.
    pub writeback: Latch<PipeEntry>,
}

impl Latches {
    /// True when no instruction is in flight past Fetch.
    pub fn is_drained(&self) -> bool {
        self.decode.is_empty()
            && self.execute.is_empty()
            && self.memory.is_empty()
            && self.writeback.is_empty()
    }

    /// PC and instruction text held in front of `stage`.
    pub fn describe(&self, stage: Stage) -> Option<(u32, String)> {
        match stage {
            Stage::Fetch => self.fetch.get().map(|e| (e.pc, e.raw.to_string())),
            Stage::Decode => self.decode.get().map(|e| (e.pc, e.raw.to_string())),
            Stage::Execute => self.execute.get().map(|e| (e.pc, e.insn.to_string())),
            Stage::Memory => self.memory.get().map(|e| (e.pc, e.insn.to_string())),
            Stage::Writeback => self.writeback.get().map(|e| (e.pc, e.insn.to_string())),
        }
    }
}
