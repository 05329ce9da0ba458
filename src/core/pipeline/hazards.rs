//! Data Hazard Detection and Forwarding.
//!
//! This module implements the two hazard strategies the Decode stage can be
//! built with:
//!
//! - [`Scoreboard`]: stall-only. A busy bit per register is set when a writer
//!   issues and cleared when it retires; an instruction issues only when none
//!   of its sources or destinations are busy.
//! - [`Forwarding`]: operands are taken from the bypass network (results
//!   computed this cycle by Execute and Memory, and the entry retiring in
//!   Writeback). Only load-use hazards stall.

use crate::config::{ForwardingPriority, HazardStrategy};
use crate::core::arch::gpr::Gpr;
use crate::isa::instruction::NUM_REGS;
use crate::isa::Instruction;

use super::latches::PipeEntry;
use super::signals::CycleSignals;
use super::traits::HazardPolicy;

/// Results visible to Decode through the bypass network this cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bypass {
    /// Instruction that finished Execute this cycle (youngest).
    pub execute: Option<PipeEntry>,
    /// Instruction that finished Memory this cycle.
    pub memory: Option<PipeEntry>,
    /// Instruction retired by Writeback this cycle (oldest).
    pub writeback: Option<PipeEntry>,
}

impl Bypass {
    /// Collects the bypass values published in `signals`.
    pub fn from_signals(signals: &CycleSignals) -> Self {
        Self {
            execute: signals.execute_out,
            memory: signals.memory_out,
            writeback: signals.writeback_out,
        }
    }

    /// Producers in the order they are searched.
    fn ordered(&self, priority: ForwardingPriority) -> [Option<&PipeEntry>; 3] {
        match priority {
            ForwardingPriority::Youngest => [
                self.execute.as_ref(),
                self.memory.as_ref(),
                self.writeback.as_ref(),
            ],
            ForwardingPriority::Oldest => [
                self.writeback.as_ref(),
                self.memory.as_ref(),
                self.execute.as_ref(),
            ],
        }
    }
}

/// Outcome of hazard resolution for the instruction in Decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The instruction may issue with these operand values.
    Issue { rs1_value: i32, rs2_value: i32 },
    /// The instruction must wait in Decode.
    Stall,
}

/// Builds the hazard policy selected by the configuration.
///
/// # Arguments
///
/// * `strategy` - Scoreboard or forwarding
/// * `priority` - Producer search order used by the forwarding strategy
pub fn build_policy(
    strategy: HazardStrategy,
    priority: ForwardingPriority,
) -> Box<dyn HazardPolicy> {
    match strategy {
        HazardStrategy::Scoreboard => Box::new(Scoreboard::new()),
        HazardStrategy::Forwarding => Box::new(Forwarding::new(priority)),
    }
}

/// Checks if a stall is needed due to a load-use data hazard.
///
/// A load-use hazard occurs when the instruction in Decode reads the
/// destination of a LOAD or LOADP that is in Execute this cycle: the
/// loaded value only exists after the Memory stage.
///
/// # Arguments
///
/// * `insn` - The instruction in Decode
/// * `execute_out` - The instruction that finished Execute this cycle
///
/// # Returns
///
/// `true` if Decode must hold for one cycle.
pub fn need_stall_load_use(insn: &Instruction, execute_out: Option<&PipeEntry>) -> bool {
    let Some(producer) = execute_out else {
        return false;
    };
    if !producer.insn.reads_memory() || producer.result_ready {
        return false;
    }
    match producer.insn.dest() {
        Some(rd) => insn.sources().any(|src| src == rd),
        None => false,
    }
}

/// Forwards the post-increment base value of a LOADP or STOREP.
///
/// The incremented base is computed in Execute, so it can be forwarded from
/// any later stage even though a LOADP's loaded value may not exist yet.
///
/// # Returns
///
/// `Some(base + 4)` if `producer` rewrites `reg` as its base register.
pub fn forward_post_increment(reg: usize, producer: &PipeEntry) -> Option<i32> {
    (producer.insn.base_writeback() == Some(reg)).then_some(producer.base_update)
}

/// Value `producer` will write to `reg`, if it writes it and the value is
/// known. The base update wins over the destination when both match.
fn produced_value(reg: usize, producer: &PipeEntry) -> Option<i32> {
    forward_post_increment(reg, producer).or_else(|| {
        (producer.insn.dest() == Some(reg) && producer.result_ready).then_some(producer.result)
    })
}

/// Resolves one source register through the bypass network.
///
/// # Arguments
///
/// * `reg` - Source register index
/// * `bypass` - This cycle's bypass values
/// * `regs` - Register file, the fallback source
/// * `priority` - Search order over the producers
///
/// # Returns
///
/// The forwarded value, or the register file value if no in-flight
/// instruction writes `reg`.
pub fn forward_operand(
    reg: usize,
    bypass: &Bypass,
    regs: &Gpr,
    priority: ForwardingPriority,
) -> i32 {
    bypass
        .ordered(priority)
        .into_iter()
        .flatten()
        .find_map(|producer| produced_value(reg, producer))
        .unwrap_or_else(|| regs.read(reg))
}

/// Stall-only hazard strategy.
#[derive(Clone, Debug)]
pub struct Scoreboard {
    busy: [bool; NUM_REGS],
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Scoreboard {
    /// Creates a scoreboard with every register free.
    pub fn new() -> Self {
        Self {
            busy: [false; NUM_REGS],
        }
    }

    /// True if an in-flight instruction will write `reg`.
    pub fn is_busy(&self, reg: usize) -> bool {
        self.busy[reg]
    }
}

impl HazardPolicy for Scoreboard {
    fn name(&self) -> &'static str {
        "scoreboard"
    }

    fn resolve(&self, insn: &Instruction, regs: &Gpr, _bypass: &Bypass) -> Resolution {
        let blocked = insn
            .sources()
            .chain(insn.writes())
            .any(|reg| self.busy[reg]);
        if blocked {
            return Resolution::Stall;
        }
        Resolution::Issue {
            rs1_value: insn.src1().map_or(0, |r| regs.read(r)),
            rs2_value: insn.src2().map_or(0, |r| regs.read(r)),
        }
    }

    fn on_issue(&mut self, insn: &Instruction) {
        for reg in insn.writes() {
            self.busy[reg] = true;
        }
    }

    fn on_retire(&mut self, insn: &Instruction) {
        for reg in insn.writes() {
            self.busy[reg] = false;
        }
    }

    fn reserved(&self) -> Vec<usize> {
        (0..NUM_REGS).filter(|&r| self.busy[r]).collect()
    }
}

/// Forwarding hazard strategy.
#[derive(Clone, Debug)]
pub struct Forwarding {
    priority: ForwardingPriority,
}

impl Forwarding {
    /// Creates a forwarding unit searching producers in `priority` order.
    pub fn new(priority: ForwardingPriority) -> Self {
        Self { priority }
    }
}

impl HazardPolicy for Forwarding {
    fn name(&self) -> &'static str {
        "forwarding"
    }

    fn resolve(&self, insn: &Instruction, regs: &Gpr, bypass: &Bypass) -> Resolution {
        if need_stall_load_use(insn, bypass.execute.as_ref()) {
            return Resolution::Stall;
        }
        let operand = |reg: Option<usize>| {
            reg.map_or(0, |r| forward_operand(r, bypass, regs, self.priority))
        };
        Resolution::Issue {
            rs1_value: operand(insn.src1()),
            rs2_value: operand(insn.src2()),
        }
    }
}
