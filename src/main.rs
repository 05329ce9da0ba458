//! APEX Pipeline Simulator CLI.
//!
//! The main executable for the simulator. It handles command-line argument
//! parsing, logging setup, program loading, and the simulation loop.
//!
//! # Usage
//!
//! * `simulate <program> [cycles]`: run and print statistics.
//! * `display <program> [cycles]`: run, then dump the full machine state.
//! * `show-mem <program> <address> [cycles]`: run, then print one data word.
//! * `single-step <program>`: dump the state before every cycle and wait
//!   for Enter (`q` quits).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use apex_sim::config::{Config, HazardStrategy};
use apex_sim::core::Cpu;
use apex_sim::sim::{Control, FreeRun, RunOutcome, Simulator, Snapshot, StepControl, StopReason};

/// Command-line arguments for the APEX pipeline simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "APEX 5-Stage Pipeline Simulator")]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `pipeline.hazard_strategy`.
    #[arg(short, long, global = true, value_enum)]
    strategy: Option<HazardStrategy>,

    /// Logs every stage action.
    #[arg(long, global = true)]
    trace: bool,

    /// Prints machine state as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program and print statistics.
    Simulate {
        program: PathBuf,
        cycles: Option<u64>,
    },
    /// Run a program, then dump stages, flags, BTB, registers and memory.
    Display {
        program: PathBuf,
        cycles: Option<u64>,
    },
    /// Run a program, then print the data word at `address`.
    ShowMem {
        program: PathBuf,
        address: usize,
        cycles: Option<u64>,
    },
    /// Advance one cycle per Enter key.
    SingleStep { program: PathBuf },
}

/// Pauses before each cycle and reads a command from stdin.
struct Interactive {
    json: bool,
}

impl StepControl for Interactive {
    fn before_cycle(&mut self, cpu: &Cpu) -> Control {
        print_snapshot(&Snapshot::capture(cpu), self.json);
        print!("[Enter] next cycle, [q] quit > ");
        io::stdout().flush().ok();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => Control::Quit,
            Ok(_) if line.trim().eq_ignore_ascii_case("q") => Control::Quit,
            Ok(_) => Control::Continue,
        }
    }
}

fn init_tracing(enabled: bool) {
    let filter = if enabled {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_snapshot(snapshot: &Snapshot, json: bool) {
    if json {
        match serde_json::to_string_pretty(snapshot) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("[!] cannot serialize state: {}", e),
        }
    } else {
        print!("{}", snapshot);
    }
}

fn fatal(message: impl std::fmt::Display) -> ! {
    eprintln!("\n[!] FATAL: {}", message);
    process::exit(1);
}

/// Runs `sim` and exits the process on a pipeline fault.
fn drive(sim: &mut Simulator, max_cycles: u64, control: &mut dyn StepControl) -> RunOutcome {
    match sim.run_with(max_cycles, control) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            print!("{}", sim.snapshot());
            sim.cpu.stats.print();
            process::exit(1);
        }
    }
}

fn report(outcome: &RunOutcome) {
    let why = match outcome.reason {
        StopReason::Halted => "HALT retired",
        StopReason::CycleLimit => "cycle limit reached",
        StopReason::Quit => "stopped by user",
        StopReason::Drained => "pipeline drained",
    };
    println!(
        "\n[*] {} after {} cycles, {} instructions retired",
        why, outcome.cycles, outcome.instructions
    );
}

/// Main entry point for the APEX simulator.
///
/// # Behavior
///
/// 1. **Configuration**: Parses arguments, loads the TOML configuration and
///    applies command-line overrides.
/// 2. **Initialization**: Loads the program and builds the simulator.
/// 3. **Simulation Loop**: Ticks the CPU until HALT, drain, the cycle limit,
///    or a fatal fault.
/// 4. **Teardown**: Prints the requested state and statistics.
fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| fatal(e)),
        None => Config::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.pipeline.hazard_strategy = strategy;
    }
    if cli.trace {
        config.general.trace = true;
    }
    init_tracing(config.general.trace);

    let program = match &cli.command {
        Command::Simulate { program, .. }
        | Command::Display { program, .. }
        | Command::ShowMem { program, .. }
        | Command::SingleStep { program } => program,
    };
    let mut sim = Simulator::initialize(program, &config).unwrap_or_else(|e| fatal(e));

    println!("[*] Program:   {}", program.display());
    println!("[*] Hazards:   {}", sim.cpu.hazards.name());
    println!("[*] BTB size:  {}", sim.cpu.btb.entries().len());

    let default_cycles = config.general.max_cycles;
    match cli.command {
        Command::Simulate { cycles, .. } => {
            let outcome = drive(&mut sim, cycles.unwrap_or(default_cycles), &mut FreeRun);
            report(&outcome);
            if cli.json {
                print_snapshot(&sim.snapshot(), true);
            }
        }
        Command::Display { cycles, .. } => {
            let outcome = drive(&mut sim, cycles.unwrap_or(default_cycles), &mut FreeRun);
            report(&outcome);
            print_snapshot(&sim.snapshot(), cli.json);
        }
        Command::ShowMem {
            address, cycles, ..
        } => {
            let outcome = drive(&mut sim, cycles.unwrap_or(default_cycles), &mut FreeRun);
            report(&outcome);
            if address >= sim.cpu.memory.size() {
                fatal(format!(
                    "address {} outside data memory ({} words)",
                    address,
                    sim.cpu.memory.size()
                ));
            }
            println!("MEM[{}] = {}", address, sim.snapshot().memory_at(address));
        }
        Command::SingleStep { .. } => {
            let mut control = Interactive { json: cli.json };
            let outcome = drive(&mut sim, default_cycles, &mut control);
            report(&outcome);
            print_snapshot(&sim.snapshot(), cli.json);
        }
    }

    sim.stop().print();
}
