//! Decode/Register-Read (ID) Stage.
//!
//! Decodes the raw instruction in the Decode latch and asks the hazard
//! policy for its operands. An instruction that cannot issue stays in the
//! latch and is re-evaluated next cycle. Conditional branches that missed
//! in the BTB at Fetch get an entry here.

use tracing::{debug, trace};

use crate::common::SimError;
use crate::core::pipeline::hazards::{Bypass, Resolution};
use crate::core::pipeline::latches::{Latch, Latches, PipeEntry};
use crate::core::pipeline::signals::CycleSignals;
use crate::core::Cpu;
use crate::isa::Instruction;

/// Executes the decode stage.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
/// * `next` - Latch set being built for the next cycle.
/// * `signals` - This cycle's control signals; raises `stall`.
///
/// # Returns
///
/// `InvalidOpcode` or `InvalidRegister` if the instruction does not decode.
pub fn decode_stage(
    cpu: &mut Cpu,
    next: &mut Latches,
    signals: &mut CycleSignals,
) -> Result<(), SimError> {
    let Some(entry) = cpu.latches.decode.entry.clone() else {
        return Ok(());
    };
    if signals.flush_decode {
        debug!(pc = entry.pc, "ID squashed");
        return Ok(());
    }

    let insn = Instruction::decode(&entry.raw, entry.pc)?;
    if matches!(insn, Instruction::Halt) {
        cpu.fetch_enabled = false;
    }

    let bypass = Bypass::from_signals(signals);
    match cpu.hazards.resolve(&insn, &cpu.regs, &bypass) {
        Resolution::Stall => {
            debug!(pc = entry.pc, insn = %insn, policy = cpu.hazards.name(), "ID stall");
            signals.stall = true;
            cpu.stats.stalls_data += 1;
            next.decode = Latch::holding(entry);
        }
        Resolution::Issue {
            rs1_value,
            rs2_value,
        } => {
            let mut prediction = entry.prediction;
            if let Instruction::Branch { cond, offset } = insn {
                if !prediction.hit {
                    let target = entry.pc.wrapping_add_signed(offset);
                    let slot = cpu.btb.allocate(entry.pc, target, cond);
                    cpu.stats.btb_allocations += 1;
                    debug!(pc = entry.pc, slot, "BTB allocate");
                    prediction.index = Some(slot);
                }
            }
            cpu.hazards.on_issue(&insn);
            trace!(pc = entry.pc, insn = %insn, rs1_value, rs2_value, "ID issue");
            next.execute = Latch::holding(PipeEntry {
                pc: entry.pc,
                insn,
                rs1_value,
                rs2_value,
                prediction,
                ..Default::default()
            });
        }
    }
    Ok(())
}
