//! Shared test harness.
//!
//! Builds simulators from program text and runs them to completion.

#![allow(dead_code)]

use apex_sim::config::{Config, ForwardingPriority, HazardStrategy};
use apex_sim::sim::reference::SequentialCpu;
use apex_sim::sim::{RunOutcome, Simulator};

/// Cycle limit generous enough for every test program.
pub const MAX_CYCLES: u64 = 2_000;

/// Configuration with the given hazard strategy, other settings default.
pub fn config_with(strategy: HazardStrategy) -> Config {
    let mut config = Config::default();
    config.pipeline.hazard_strategy = strategy;
    config
}

/// Forwarding configuration with an explicit producer priority.
pub fn forwarding_with(priority: ForwardingPriority) -> Config {
    let mut config = config_with(HazardStrategy::Forwarding);
    config.pipeline.forwarding_priority = priority;
    config
}

pub struct TestContext {
    pub sim: Simulator,
}

impl TestContext {
    /// Builds a simulator for `program` under `config`.
    pub fn new(program: &str, config: &Config) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::WARN)
            .try_init();
        let sim = Simulator::from_source(program, config).expect("program should build");
        Self { sim }
    }

    pub fn with_strategy(program: &str, strategy: HazardStrategy) -> Self {
        Self::new(program, &config_with(strategy))
    }

    /// Runs to completion and returns the outcome.
    pub fn run(&mut self) -> RunOutcome {
        self.sim.run(MAX_CYCLES).expect("program should run without faults")
    }

    pub fn tick(&mut self) {
        self.sim.cpu.tick().expect("cycle should not fault");
    }

    pub fn reg(&self, idx: usize) -> i32 {
        self.sim.cpu.regs.read(idx)
    }

    pub fn mem(&self, addr: i32) -> i32 {
        self.sim.cpu.memory.read(addr).expect("address in range")
    }
}

/// Runs `program` on the sequential interpreter.
pub fn run_reference(program: &str, config: &Config) -> SequentialCpu {
    let code = apex_sim::sim::loader::build_code(program, config.general.code_base)
        .expect("program should build");
    let mut cpu = SequentialCpu::new(code, config);
    cpu.run(MAX_CYCLES).expect("reference run should not fault");
    cpu
}
