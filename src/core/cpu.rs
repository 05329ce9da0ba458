//! The APEX CPU.
//!
//! [`Cpu`] owns every piece of simulator state: architectural registers,
//! flags and memory, the instruction store, the pipeline latches, the BTB,
//! the hazard policy, and statistics. One call to [`Cpu::tick`] advances the
//! machine by exactly one clock cycle.

use tracing::trace;

use crate::common::SimError;
use crate::config::Config;
use crate::core::arch::flags::Flags;
use crate::core::arch::gpr::Gpr;
use crate::core::arch::memory::DataMemory;
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::{Latches, Stage};
use crate::core::pipeline::signals::CycleSignals;
use crate::core::pipeline::stages;
use crate::core::pipeline::traits::{HazardPolicy, PipelineLatch};
use crate::core::units::bru::Btb;
use crate::isa::CodeMemory;
use crate::stats::SimStats;

pub struct Cpu {
    pub pc: u32,
    pub regs: Gpr,
    pub flags: Flags,
    pub memory: DataMemory,
    pub code: CodeMemory,

    pub latches: Latches,
    pub btb: Btb,
    pub hazards: Box<dyn HazardPolicy>,

    pub stats: SimStats,

    /// Cleared when HALT reaches Decode, set again by a redirect.
    pub fetch_enabled: bool,
    /// A redirect happened this cycle; Fetch loses the cycle.
    pub redirect_pending: bool,
    /// HALT has retired.
    pub halted: bool,
}

impl Cpu {
    /// Builds a CPU in its reset state, PC at the first instruction.
    ///
    /// `config` must have passed [`Config::validate`].
    pub fn new(code: CodeMemory, config: &Config) -> Self {
        let hazards = hazards::build_policy(
            config.pipeline.hazard_strategy,
            config.pipeline.forwarding_priority,
        );
        Self {
            pc: code.base(),
            regs: Gpr::new(),
            flags: Flags::default(),
            memory: DataMemory::new(config.memory.data_words),
            code,
            latches: Latches::default(),
            btb: Btb::new(
                config.predictor.btb_entries,
                config.predictor.replacement,
                config.predictor.seed,
            ),
            hazards,
            stats: SimStats::default(),
            fetch_enabled: true,
            redirect_pending: false,
            halted: false,
        }
    }

    /// Advances the pipeline by one cycle.
    ///
    /// Stages run from Writeback back to Fetch. Each reads only the latches
    /// of the current cycle and writes a fresh latch set, which becomes
    /// current at the end of the cycle. Writeback updates the register file
    /// before Decode reads it.
    ///
    /// # Returns
    ///
    /// The first fault raised by any stage. A halted CPU ignores the call.
    pub fn tick(&mut self) -> Result<(), SimError> {
        if self.halted {
            return Ok(());
        }
        self.stats.cycles += 1;
        if tracing::enabled!(tracing::Level::TRACE) {
            self.trace_pipeline();
        }

        let mut next = Latches::default();
        let mut signals = CycleSignals::default();

        stages::wb_stage(self, &mut signals);
        if self.halted {
            self.latches.writeback.flush();
            return Ok(());
        }
        stages::mem_stage(self, &mut next, &mut signals)?;
        stages::execute_stage(self, &mut next, &mut signals)?;
        stages::decode_stage(self, &mut next, &mut signals)?;
        stages::fetch_stage(self, &mut next, &signals)?;

        self.latches = next;
        Ok(())
    }

    /// True when no instruction is in flight and Fetch can make no
    /// further progress.
    pub fn is_drained(&self) -> bool {
        self.latches.is_drained()
            && !self.redirect_pending
            && (!self.fetch_enabled || !self.code.contains(self.pc))
    }

    fn trace_pipeline(&self) {
        for stage in Stage::ALL {
            match self.latches.describe(stage) {
                Some((pc, text)) => {
                    trace!(cycle = self.stats.cycles, "{:<10} pc={} {}", stage.name(), pc, text)
                }
                None => trace!(cycle = self.stats.cycles, "{:<10} empty", stage.name()),
            }
        }
    }
}
