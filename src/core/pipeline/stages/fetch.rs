//! Instruction Fetch (IF) Stage.
//!
//! Reads the instruction at the PC, consults the BTB, and hands the
//! instruction to Decode. Fetch past the end of code memory is not an
//! error; the pipeline simply drains.

use tracing::trace;

use crate::common::SimError;
use crate::core::pipeline::latches::{IfIdEntry, Latch, Latches, Prediction};
use crate::core::pipeline::signals::CycleSignals;
use crate::core::Cpu;

/// Fall-through PC increment.
const INSN_BYTES: u32 = 4;

/// Executes the instruction fetch stage.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
/// * `next` - Latch set being built for the next cycle.
/// * `signals` - This cycle's control signals from the later stages.
///
/// # Returns
///
/// `MisalignedFetch` if the PC is inside code memory but off an
/// instruction boundary.
pub fn fetch_stage(
    cpu: &mut Cpu,
    next: &mut Latches,
    signals: &CycleSignals,
) -> Result<(), SimError> {
    if cpu.redirect_pending {
        cpu.redirect_pending = false;
        cpu.stats.bubbles += 1;
        trace!(pc = cpu.pc, "IF bubble");
        return Ok(());
    }
    if !cpu.fetch_enabled {
        return Ok(());
    }
    let Some(raw) = cpu.code.fetch(cpu.pc)?.cloned() else {
        return Ok(());
    };

    let mut entry = IfIdEntry {
        pc: cpu.pc,
        raw,
        prediction: Prediction::default(),
    };

    if signals.stall {
        next.fetch = Latch::holding(entry);
        return Ok(());
    }

    cpu.stats.btb_lookups += 1;
    cpu.pc = match cpu.btb.lookup(entry.pc) {
        Some((prediction, target)) => {
            cpu.stats.btb_hits += 1;
            entry.prediction = prediction;
            if prediction.taken {
                target
            } else {
                entry.pc.wrapping_add(INSN_BYTES)
            }
        }
        None => entry.pc.wrapping_add(INSN_BYTES),
    };
    trace!(pc = entry.pc, insn = %entry.raw, next_pc = cpu.pc, "IF");

    next.fetch = Latch::holding(entry.clone());
    next.decode = Latch::holding(entry);
    Ok(())
}
