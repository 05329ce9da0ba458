//! APEX Five-Stage Pipeline Simulator Library.
//!
//! This crate implements a cycle-level simulator for the APEX teaching ISA: a
//! small 32-bit integer instruction set running on a five-stage in-order
//! pipeline with data hazard handling and a branch target buffer.
//!
//! # Architecture
//!
//! * **Core**: 5-stage in-order pipeline (Fetch, Decode/RF, Execute, Memory, Writeback)
//!   with double-buffered latches.
//! * **Hazards**: stall-only scoreboard or forwarding with load-use stalls,
//!   selected at construction.
//! * **Prediction**: 4-entry fully associative BTB with 2-bit history.
//!
//! # Modules
//!
//! * `common`: Error and access types.
//! * `config`: Configuration loading and parsing.
//! * `core`: CPU core implementation.
//! * `isa`: Instruction Set Architecture definitions and program parser.
//! * `sim`: Simulation driver, loader, snapshots and reference interpreter.
//! * `stats`: Performance statistics collection.

/// Shared error and memory access types.
///
/// Every failure the simulator reports is a `SimError` defined here.
pub mod common;

/// Configuration system for memory, pipeline and predictor settings.
///
/// Loads and parses TOML configuration files; every key has a default.
pub mod config;

/// CPU core implementation including pipeline stages and execution units.
///
/// Implements the 5-stage in-order pipeline, architectural state, hazard
/// policies and the branch target buffer.
pub mod core;

/// Instruction Set Architecture definitions.
///
/// Opcode table, decoded instruction enum, program text parser and the
/// instruction store.
pub mod isa;

/// Simulation harness and execution orchestration.
///
/// Loads programs, runs the cycle loop, captures snapshots, and provides a
/// sequential interpreter used as a golden model.
pub mod sim;

/// Performance statistics collection and reporting.
///
/// Tracks cycle counts, instruction mix, stalls, bubbles and branch
/// prediction accuracy.
pub mod stats;
