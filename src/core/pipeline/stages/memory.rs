//! Memory (MEM) Stage.
//!
//! Performs the data memory access of loads and stores. Every other
//! instruction passes through unchanged.

use tracing::trace;

use crate::common::SimError;
use crate::core::arch::memory::OutOfBounds;
use crate::core::pipeline::latches::{Latch, Latches};
use crate::core::pipeline::signals::CycleSignals;
use crate::core::Cpu;
use crate::isa::Instruction;

/// Executes the memory stage.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
/// * `next` - Latch set being built for the next cycle.
/// * `signals` - This cycle's control signals; receives the bypass value.
///
/// # Returns
///
/// `MemoryFault` if the effective address lies outside data memory.
pub fn mem_stage(
    cpu: &mut Cpu,
    next: &mut Latches,
    signals: &mut CycleSignals,
) -> Result<(), SimError> {
    let Some(mut mem) = cpu.latches.memory.entry else {
        return Ok(());
    };
    let pc = mem.pc;
    let fault = |e: OutOfBounds| SimError::MemoryFault {
        pc,
        address: e.address,
        access: e.access,
    };

    match mem.insn {
        Instruction::Load { .. } => {
            mem.result = cpu.memory.read(mem.mem_address).map_err(fault)?;
            mem.result_ready = true;
            trace!(pc, addr = mem.mem_address, value = mem.result, "MEM load");
        }
        Instruction::Store { .. } => {
            cpu.memory
                .write(mem.mem_address, mem.rs1_value)
                .map_err(fault)?;
            trace!(pc, addr = mem.mem_address, value = mem.rs1_value, "MEM store");
        }
        _ => {}
    }

    signals.memory_out = Some(mem);
    next.writeback = Latch::holding(mem);
    Ok(())
}
