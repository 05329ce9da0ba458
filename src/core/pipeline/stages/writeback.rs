//! Writeback (WB) Stage.
//!
//! Retires the instruction in the Writeback latch: writes its destination
//! register and, for LOADP / STOREP, the incremented base register, then
//! releases its hazard reservations. A retiring HALT stops the machine.

use tracing::{debug, trace};

use crate::core::pipeline::signals::CycleSignals;
use crate::core::Cpu;
use crate::isa::Instruction;

/// Executes the writeback stage.
///
/// Runs first in every cycle so that Decode reads the registers it writes.
/// The retired entry is published as the oldest bypass value.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
/// * `signals` - This cycle's control signals.
pub fn wb_stage(cpu: &mut Cpu, signals: &mut CycleSignals) {
    let Some(wb) = cpu.latches.writeback.entry else {
        return;
    };

    if let Some(rd) = wb.insn.dest() {
        cpu.regs.write(rd, wb.result);
    }
    if let Some(base) = wb.insn.base_writeback() {
        cpu.regs.write(base, wb.base_update);
    }
    cpu.hazards.on_retire(&wb.insn);
    cpu.stats.record_retired(&wb.insn);
    trace!(pc = wb.pc, insn = %wb.insn, result = wb.result, "WB retire");

    signals.writeback_out = Some(wb);

    if matches!(wb.insn, Instruction::Halt) {
        debug!(pc = wb.pc, cycle = cpu.stats.cycles, "HALT retired");
        cpu.halted = true;
    }
}
