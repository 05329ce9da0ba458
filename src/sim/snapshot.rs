//! Observable machine state.
//!
//! A [`Snapshot`] captures everything a user can inspect between cycles:
//! stage contents, flags, the BTB, registers and non-zero data memory.
//! It renders as the text dump printed by the CLI and serializes to JSON.

use std::fmt;

use serde::Serialize;

use crate::core::arch::flags::Flags;
use crate::core::pipeline::latches::Stage;
use crate::core::units::bru::BtbEntry;
use crate::core::Cpu;

/// Contents of one pipeline stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageView {
    pub stage: Stage,
    pub pc: Option<u32>,
    pub instruction: Option<String>,
}

/// A non-zero data memory word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MemoryCell {
    pub address: usize,
    pub value: i32,
}

/// Machine state between two cycles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub cycle: u64,
    pub instructions_retired: u64,
    pub pc: u32,
    pub halted: bool,
    pub flags: Flags,
    pub registers: Vec<i32>,
    pub reserved_registers: Vec<usize>,
    pub btb: Vec<BtbEntry>,
    pub memory: Vec<MemoryCell>,
    pub stages: Vec<StageView>,
}

impl Snapshot {
    /// Captures the current state of `cpu`.
    pub fn capture(cpu: &Cpu) -> Self {
        let stages = Stage::ALL
            .iter()
            .map(|&stage| {
                let described = cpu.latches.describe(stage);
                StageView {
                    stage,
                    pc: described.as_ref().map(|(pc, _)| *pc),
                    instruction: described.map(|(_, text)| text),
                }
            })
            .collect();
        Self {
            cycle: cpu.stats.cycles,
            instructions_retired: cpu.stats.instructions_retired,
            pc: cpu.pc,
            halted: cpu.halted,
            flags: cpu.flags,
            registers: cpu.regs.values().to_vec(),
            reserved_registers: cpu.hazards.reserved(),
            btb: cpu.btb.entries().to_vec(),
            memory: cpu
                .memory
                .nonzero()
                .map(|(address, value)| MemoryCell { address, value })
                .collect(),
            stages,
        }
    }

    /// Value of data memory at `address`, zero if not listed.
    pub fn memory_at(&self, address: usize) -> i32 {
        self.memory
            .iter()
            .find(|cell| cell.address == address)
            .map_or(0, |cell| cell.value)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Clock cycle #{}  (retired {})", self.cycle, self.instructions_retired)?;
        writeln!(f, "--------------------------------")?;
        for view in &self.stages {
            match (&view.pc, &view.instruction) {
                (Some(pc), Some(text)) => writeln!(f, "{:<10}: pc({}) {}", view.stage.name(), pc, text)?,
                _ => writeln!(f, "{:<10}: EMPTY", view.stage.name())?,
            }
        }
        writeln!(f, "--------------------------------")?;
        writeln!(
            f,
            "PC={}  Z={} P={} N={}",
            self.pc, self.flags.zero as u8, self.flags.positive as u8, self.flags.negative as u8
        )?;
        writeln!(f, "--------------------------------")?;
        writeln!(f, "BTB")?;
        for (idx, e) in self.btb.iter().enumerate() {
            if e.valid {
                writeln!(
                    f,
                    "  [{}] tag={} target={} history=({},{})",
                    idx, e.tag, e.target, e.history.h0 as u8, e.history.h1 as u8
                )?;
            } else {
                writeln!(f, "  [{}] invalid", idx)?;
            }
        }
        writeln!(f, "--------------------------------")?;
        writeln!(f, "Registers")?;
        for (row, chunk) in self.registers.chunks(4).enumerate() {
            for (col, value) in chunk.iter().enumerate() {
                write!(f, "R{:<2}={:<11} ", row * 4 + col, value)?;
            }
            writeln!(f)?;
        }
        if !self.reserved_registers.is_empty() {
            let names: Vec<String> = self
                .reserved_registers
                .iter()
                .map(|r| format!("R{}", r))
                .collect();
            writeln!(f, "Busy: {}", names.join(" "))?;
        }
        writeln!(f, "--------------------------------")?;
        writeln!(f, "Data memory (non-zero)")?;
        if self.memory.is_empty() {
            writeln!(f, "  (all zero)")?;
        }
        for cell in &self.memory {
            writeln!(f, "  MEM[{}] = {}", cell.address, cell.value)?;
        }
        Ok(())
    }
}
