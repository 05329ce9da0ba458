//! Execute (EX) Stage.
//!
//! This module implements the execution stage of the pipeline. It is responsible for:
//! - Performing ALU operations and updating the condition flags.
//! - Computing effective addresses and post-increment base values.
//! - Resolving conditional branches against the BTB prediction.
//! - Redirecting the PC for JUMP, JALR and mispredicted branches.

use tracing::{debug, trace};

use crate::common::SimError;
use crate::core::pipeline::latches::{Latch, Latches};
use crate::core::pipeline::signals::CycleSignals;
use crate::core::units::alu::Alu;
use crate::core::Cpu;
use crate::isa::Instruction;

/// Size of an instruction, used for link addresses and fall-through.
const INSN_BYTES: u32 = 4;

/// Post-increment step of LOADP and STOREP.
const POST_INCREMENT: i32 = 4;

/// Executes the Execute stage of the pipeline.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
/// * `next` - Latch set being built for the next cycle.
/// * `signals` - This cycle's control signals; receives the bypass value
///   and the Decode flush.
///
/// # Returns
///
/// `DivisionByZero` for a DIV with a zero divisor.
pub fn execute_stage(
    cpu: &mut Cpu,
    next: &mut Latches,
    signals: &mut CycleSignals,
) -> Result<(), SimError> {
    let Some(mut ex) = cpu.latches.execute.entry else {
        return Ok(());
    };
    let pc = ex.pc;
    ex.result_ready = true;

    match ex.insn {
        Instruction::Arith { op, .. } => {
            ex.result = Alu::execute(op, ex.rs1_value, ex.rs2_value)
                .ok_or(SimError::DivisionByZero { pc })?;
            cpu.flags.set_from_result(ex.result);
        }
        Instruction::ArithImm { op, imm, .. } => {
            ex.result =
                Alu::execute(op, ex.rs1_value, imm).ok_or(SimError::DivisionByZero { pc })?;
            cpu.flags.set_from_result(ex.result);
        }
        Instruction::Movc { imm, .. } => {
            ex.result = imm;
            cpu.flags.set_from_result(ex.result);
        }
        Instruction::Load {
            imm, post_increment, ..
        } => {
            ex.mem_address = ex.rs1_value.wrapping_add(imm);
            if post_increment {
                ex.base_update = ex.rs1_value.wrapping_add(POST_INCREMENT);
            }
            ex.result_ready = false;
        }
        Instruction::Store {
            imm, post_increment, ..
        } => {
            ex.mem_address = ex.rs2_value.wrapping_add(imm);
            if post_increment {
                ex.base_update = ex.rs2_value.wrapping_add(POST_INCREMENT);
            }
        }
        Instruction::Cmp { .. } => cpu.flags.set_from_compare(ex.rs1_value, ex.rs2_value),
        Instruction::Cml { imm, .. } => cpu.flags.set_from_compare(ex.rs1_value, imm),
        Instruction::Branch { cond, offset } => {
            let target = pc.wrapping_add_signed(offset);
            let taken = cond.evaluate(&cpu.flags);
            let resolution = cpu.btb.resolve(pc, ex.prediction, taken, target);
            cpu.stats.branch_predictions += 1;
            trace!(pc, taken, predicted = ex.prediction.taken, hit = ex.prediction.hit, "EX branch");
            if let Some(restart) = resolution.redirect {
                cpu.stats.branch_mispredictions += 1;
                redirect(cpu, signals, restart);
            }
        }
        Instruction::Jump { imm, .. } => {
            redirect(cpu, signals, ex.rs1_value.wrapping_add(imm) as u32);
        }
        Instruction::Jalr { imm, .. } => {
            ex.result = pc.wrapping_add(INSN_BYTES) as i32;
            redirect(cpu, signals, ex.rs1_value.wrapping_add(imm) as u32);
        }
        Instruction::Nop | Instruction::Halt => {}
    }

    trace!(pc, insn = %ex.insn, result = ex.result, "EX");
    signals.execute_out = Some(ex);
    next.memory = Latch::holding(ex);
    Ok(())
}

/// Restarts Fetch at `target`.
///
/// The instruction in Decode is squashed and Fetch loses the current cycle.
fn redirect(cpu: &mut Cpu, signals: &mut CycleSignals, target: u32) {
    debug!(from = cpu.pc, to = target, "EX redirect");
    cpu.pc = target;
    cpu.redirect_pending = true;
    cpu.fetch_enabled = true;
    cpu.stats.flushes += 1;
    signals.flush_decode = true;
}
