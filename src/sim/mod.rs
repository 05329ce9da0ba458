//! Simulation driver.
//!
//! [`Simulator`] owns a [`Cpu`] and runs it cycle by cycle until HALT
//! retires, the pipeline drains, a cycle limit is reached, or a
//! [`StepControl`] asks to quit.

use std::path::Path;

use tracing::{debug, info};

use crate::common::SimError;
use crate::config::Config;
use crate::core::Cpu;
use crate::stats::SimStats;

/// Program loading from text and files.
pub mod loader;

/// Sequential reference interpreter.
pub mod reference;

/// Observable machine state and its text dump.
pub mod snapshot;

pub use snapshot::Snapshot;

/// Decision taken before each cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Hook consulted by [`Simulator::run_with`] before every cycle.
pub trait StepControl {
    fn before_cycle(&mut self, cpu: &Cpu) -> Control;
}

/// Runs without pausing.
#[derive(Clone, Copy, Debug, Default)]
pub struct FreeRun;

impl StepControl for FreeRun {
    fn before_cycle(&mut self, _cpu: &Cpu) -> Control {
        Control::Continue
    }
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// HALT retired.
    Halted,
    /// The cycle counter reached the requested limit.
    CycleLimit,
    /// The step controller asked to stop.
    Quit,
    /// No instruction in flight and nothing left to fetch.
    Drained,
}

/// Summary of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: StopReason,
    pub cycles: u64,
    pub instructions: u64,
}

/// Cycle driver around one CPU.
pub struct Simulator {
    pub cpu: Cpu,
}

impl Simulator {
    /// Loads a program file and builds a CPU in its reset state.
    ///
    /// # Returns
    ///
    /// `Config` for an invalid configuration, `SourceUnavailable` if the
    /// file cannot be read, `Parse`, `EmptyProgram` or `CodeRange` if it
    /// holds no program that fits in code memory.
    pub fn initialize(path: impl AsRef<Path>, config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        let code = loader::load_program(path.as_ref(), config.general.code_base)?;
        Ok(Self::with_cpu(Cpu::new(code, config)))
    }

    /// Builds a simulator from program text.
    pub fn from_source(text: &str, config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        let code = loader::build_code(text, config.general.code_base)?;
        Ok(Self::with_cpu(Cpu::new(code, config)))
    }

    fn with_cpu(cpu: Cpu) -> Self {
        info!(
            hazards = cpu.hazards.name(),
            btb_entries = cpu.btb.entries().len(),
            "simulator initialized"
        );
        Self { cpu }
    }

    /// Runs until the absolute cycle counter reaches `max_cycles`.
    pub fn run(&mut self, max_cycles: u64) -> Result<RunOutcome, SimError> {
        self.run_with(max_cycles, &mut FreeRun)
    }

    /// Runs with `control` consulted before every cycle.
    ///
    /// Calling it again after a `CycleLimit` or `Quit` resumes the run.
    ///
    /// # Returns
    ///
    /// The stop reason with the cycle and retired counts, or the first
    /// fault raised by the pipeline.
    pub fn run_with(
        &mut self,
        max_cycles: u64,
        control: &mut dyn StepControl,
    ) -> Result<RunOutcome, SimError> {
        let reason = loop {
            if self.cpu.halted {
                break StopReason::Halted;
            }
            if self.cpu.is_drained() {
                break StopReason::Drained;
            }
            if self.cpu.stats.cycles >= max_cycles {
                break StopReason::CycleLimit;
            }
            if control.before_cycle(&self.cpu) == Control::Quit {
                break StopReason::Quit;
            }
            self.cpu.tick()?;
        };
        let outcome = RunOutcome {
            reason,
            cycles: self.cpu.stats.cycles,
            instructions: self.cpu.stats.instructions_retired,
        };
        debug!(?outcome, "run stopped");
        Ok(outcome)
    }

    /// Captures the current machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.cpu)
    }

    /// Releases the simulator, returning its final statistics.
    pub fn stop(self) -> SimStats {
        self.cpu.stats
    }
}
