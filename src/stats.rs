//! Simulation statistics collection and reporting.
//!
//! Tracks cycle and instruction counts, the instruction mix, pipeline
//! stalls and bubbles, and branch prediction accuracy.

use std::time::Instant;

use serde::Serialize;

use crate::isa::Instruction;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    pub cycles: u64,
    pub instructions_retired: u64,

    pub inst_alu: u64,
    pub inst_load: u64,
    pub inst_store: u64,
    pub inst_branch: u64,
    pub inst_jump: u64,
    pub inst_other: u64,

    /// Cycles Decode spent holding an instruction.
    pub stalls_data: u64,
    /// Fetch cycles lost to a redirect.
    pub bubbles: u64,
    /// Redirects raised by Execute.
    pub flushes: u64,

    pub btb_lookups: u64,
    pub btb_hits: u64,
    pub btb_allocations: u64,
    pub branch_predictions: u64,
    pub branch_mispredictions: u64,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_jump: 0,
            inst_other: 0,
            stalls_data: 0,
            bubbles: 0,
            flushes: 0,
            btb_lookups: 0,
            btb_hits: 0,
            btb_allocations: 0,
            branch_predictions: 0,
            branch_mispredictions: 0,
        }
    }
}

impl SimStats {
    /// Counts a retired instruction in the instruction mix.
    pub fn record_retired(&mut self, insn: &Instruction) {
        self.instructions_retired += 1;
        match insn {
            Instruction::Arith { .. }
            | Instruction::ArithImm { .. }
            | Instruction::Movc { .. }
            | Instruction::Cmp { .. }
            | Instruction::Cml { .. } => self.inst_alu += 1,
            Instruction::Load { .. } => self.inst_load += 1,
            Instruction::Store { .. } => self.inst_store += 1,
            Instruction::Branch { .. } => self.inst_branch += 1,
            Instruction::Jump { .. } | Instruction::Jalr { .. } => self.inst_jump += 1,
            Instruction::Nop | Instruction::Halt => self.inst_other += 1,
        }
    }

    /// Prints a formatted summary of all simulation statistics.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();

        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let instr = if self.instructions_retired == 0 {
            1
        } else {
            self.instructions_retired
        };

        let ipc = self.instructions_retired as f64 / cyc as f64;
        let cpi = cyc as f64 / instr as f64;

        println!("\n==========================================================");
        println!("APEX PIPELINE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_ipc                  {:.4}", ipc);
        println!("sim_cpi                  {:.4}", cpi);
        println!("----------------------------------------------------------");
        println!("PIPELINE");
        println!(
            "  stalls.data            {} ({:.2}%)",
            self.stalls_data,
            (self.stalls_data as f64 / cyc as f64) * 100.0
        );
        println!(
            "  bubbles.control        {} ({:.2}%)",
            self.bubbles,
            (self.bubbles as f64 / cyc as f64) * 100.0
        );
        println!("  flushes                {}", self.flushes);
        println!("----------------------------------------------------------");
        println!("INSTRUCTION MIX");
        let total_inst = instr as f64;
        for (name, count) in [
            ("op.alu", self.inst_alu),
            ("op.load", self.inst_load),
            ("op.store", self.inst_store),
            ("op.branch", self.inst_branch),
            ("op.jump", self.inst_jump),
            ("op.other", self.inst_other),
        ] {
            println!(
                "  {:<22} {} ({:.2}%)",
                name,
                count,
                (count as f64 / total_inst) * 100.0
            );
        }
        println!("----------------------------------------------------------");
        println!("BRANCH PREDICTION");
        let bp_total = self.branch_predictions;
        let bp_miss = self.branch_mispredictions;
        let bp_acc = if bp_total > 0 {
            100.0 * (1.0 - (bp_miss as f64 / bp_total as f64))
        } else {
            0.0
        };
        println!("  btb.lookups            {}", self.btb_lookups);
        println!("  btb.hits               {}", self.btb_hits);
        println!("  btb.allocations        {}", self.btb_allocations);
        println!("  bp.resolved            {}", bp_total);
        println!("  bp.mispredicts         {}", bp_miss);
        println!("  bp.accuracy            {:.2}%", bp_acc);
        println!("==========================================================");
    }
}
