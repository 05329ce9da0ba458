//! Tests for data hazard handling: scoreboard stalls and forwarding.

mod common;

use apex_sim::config::{ForwardingPriority, HazardStrategy};
use apex_sim::core::arch::gpr::Gpr;
use apex_sim::core::pipeline::hazards::{
    forward_operand, forward_post_increment, need_stall_load_use, Bypass, Resolution, Scoreboard,
};
use apex_sim::core::pipeline::latches::PipeEntry;
use apex_sim::core::pipeline::signals::AluOp;
use apex_sim::core::pipeline::traits::HazardPolicy;
use apex_sim::isa::Instruction;
use apex_sim::sim::StopReason;
use common::{forwarding_with, TestContext};
use pretty_assertions::assert_eq;
use rstest::rstest;

const RAW_DEPENDENCY: &str = "\
MOVC,R1,#5
ADD,R2,R1,R1
HALT
";

const CHAIN: &str = "\
MOVC,R1,#1
ADDL,R1,R1,#1
ADDL,R1,R1,#1
HALT
";

const POST_INCREMENT: &str = "\
MOVC,R1,#10
MOVC,R2,#7
STOREP,R2,R1,#0
STOREP,R2,R1,#0
LOADP,R3,R1,#-8
ADD,R4,R3,R1
HALT
";

const LOAD_USE: &str = "\
MOVC,R1,#3
STORE,R1,R0,#5
LOAD,R2,R0,#5
ADD,R3,R2,R2
HALT
";

fn load(rd: usize, rs1: usize, post_increment: bool) -> Instruction {
    Instruction::Load {
        rd,
        rs1,
        imm: 0,
        post_increment,
    }
}

fn add(rd: usize, rs1: usize, rs2: usize) -> Instruction {
    Instruction::Arith {
        op: AluOp::Add,
        rd,
        rs1,
        rs2,
    }
}

fn entry(insn: Instruction) -> PipeEntry {
    PipeEntry {
        pc: 4000,
        insn,
        ..Default::default()
    }
}

/// Tests the stall-only strategy on a read-after-write dependency.
///
/// The ADD stalls for two cycles, not one: the busy bit on R1 is only
/// released when MOVC retires from Writeback, and Decode reads the register
/// file in that same cycle. A single-cycle stall would need MOVC's result
/// bypassed from Memory, which the stall-only strategy never does.
#[test]
fn test_scoreboard_stalls_dependent() {
    let mut ctx = TestContext::with_strategy(RAW_DEPENDENCY, HazardStrategy::Scoreboard);
    let outcome = ctx.run();
    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(outcome.instructions, 3);
    assert_eq!(outcome.cycles, 9);
    assert_eq!(ctx.reg(2), 10);
    assert_eq!(
        ctx.sim.cpu.stats.stalls_data, 2,
        "ADD waits until MOVC retires"
    );
}

/// Tests that forwarding removes the stall entirely.
#[test]
fn test_forwarding_removes_stall() {
    let mut ctx = TestContext::with_strategy(RAW_DEPENDENCY, HazardStrategy::Forwarding);
    let outcome = ctx.run();
    assert_eq!(outcome.instructions, 3);
    assert_eq!(outcome.cycles, 7);
    assert_eq!(ctx.reg(2), 10);
    assert_eq!(ctx.sim.cpu.stats.stalls_data, 0);
}

/// Tests that the scoreboard reserves a destination from issue to retire.
#[test]
fn test_scoreboard_reservation_lifetime() {
    let mut ctx = TestContext::with_strategy("MOVC,R4,#1\nHALT\n", HazardStrategy::Scoreboard);
    ctx.tick();
    assert!(ctx.sim.cpu.hazards.reserved().is_empty(), "fetched only");
    ctx.tick();
    assert_eq!(ctx.sim.cpu.hazards.reserved(), vec![4], "issued from Decode");
    ctx.tick();
    ctx.tick();
    assert_eq!(ctx.sim.cpu.hazards.reserved(), vec![4], "still in flight");
    ctx.tick();
    assert!(ctx.sim.cpu.hazards.reserved().is_empty(), "retired");
}

/// Tests that a write-after-write to a busy register also waits.
#[test]
fn test_scoreboard_blocks_busy_destination() {
    let mut board = Scoreboard::new();
    let regs = Gpr::new();
    let bypass = Bypass::default();
    let movc = Instruction::Movc { rd: 3, imm: 1 };
    board.on_issue(&movc);
    assert!(board.is_busy(3));
    assert_eq!(board.resolve(&movc, &regs, &bypass), Resolution::Stall);
    board.on_retire(&movc);
    assert!(matches!(
        board.resolve(&movc, &regs, &bypass),
        Resolution::Issue { .. }
    ));
}

/// Tests that a LOADP reserves both its destination and its base.
#[test]
fn test_scoreboard_post_increment_reservation() {
    let mut board = Scoreboard::new();
    board.on_issue(&load(3, 1, true));
    assert!(board.is_busy(3) && board.is_busy(1));
    assert_eq!(board.reserved(), vec![1, 3]);
    board.on_retire(&load(3, 1, true));
    assert!(board.reserved().is_empty());
}

/// Tests producer search order on a back-to-back chain.
#[rstest]
#[case(ForwardingPriority::Youngest, 3)]
#[case(ForwardingPriority::Oldest, 2)]
fn test_forwarding_priority(#[case] priority: ForwardingPriority, #[case] expected: i32) {
    let mut ctx = TestContext::new(CHAIN, &forwarding_with(priority));
    ctx.run();
    assert_eq!(ctx.reg(1), expected);
}

/// Tests that the scoreboard agrees with youngest-first forwarding.
#[test]
fn test_chain_matches_scoreboard() {
    let mut ctx = TestContext::with_strategy(CHAIN, HazardStrategy::Scoreboard);
    ctx.run();
    assert_eq!(ctx.reg(1), 3);
}

/// Tests post-increment addressing chains under both strategies.
#[rstest]
fn test_post_increment_chain(
    #[values(HazardStrategy::Scoreboard, HazardStrategy::Forwarding)] strategy: HazardStrategy,
) {
    let mut ctx = TestContext::with_strategy(POST_INCREMENT, strategy);
    let outcome = ctx.run();
    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(ctx.mem(10), 7);
    assert_eq!(ctx.mem(14), 7);
    assert_eq!(ctx.reg(1), 22);
    assert_eq!(ctx.reg(3), 7);
    assert_eq!(ctx.reg(4), 29);
}

/// Tests that a consumer of a LOAD waits exactly one cycle.
#[test]
fn test_load_use_single_stall() {
    let mut ctx = TestContext::with_strategy(LOAD_USE, HazardStrategy::Forwarding);
    ctx.run();
    assert_eq!(ctx.reg(3), 6);
    assert_eq!(ctx.sim.cpu.stats.stalls_data, 1);
}

/// Tests the load-use detector directly.
#[test]
fn test_need_stall_load_use() {
    let consumer = add(5, 2, 3);
    assert!(need_stall_load_use(&consumer, Some(&entry(load(2, 9, false)))));
    assert!(need_stall_load_use(&consumer, Some(&entry(load(3, 9, true)))));
    assert!(!need_stall_load_use(&consumer, Some(&entry(load(7, 9, false)))));
    assert!(!need_stall_load_use(&consumer, Some(&entry(add(2, 0, 0)))));
    assert!(!need_stall_load_use(&consumer, None));

    let mut loaded = entry(load(2, 9, false));
    loaded.result_ready = true;
    assert!(!need_stall_load_use(&consumer, Some(&loaded)));

    let base_reader = add(5, 9, 9);
    assert!(
        !need_stall_load_use(&base_reader, Some(&entry(load(2, 9, true)))),
        "the incremented base is forwardable"
    );
}

/// Tests the post-increment forwarding helper.
#[test]
fn test_forward_post_increment() {
    let mut loadp = entry(load(2, 9, true));
    loadp.base_update = 104;
    assert_eq!(forward_post_increment(9, &loadp), Some(104));
    assert_eq!(forward_post_increment(2, &loadp), None);
    assert_eq!(forward_post_increment(9, &entry(load(2, 9, false))), None);
}

/// Tests operand resolution through the bypass network.
#[test]
fn test_forward_operand_sources() {
    let mut regs = Gpr::new();
    regs.write(1, 100);

    let mut ex = entry(add(1, 0, 0));
    ex.result = 7;
    ex.result_ready = true;
    let mut wb = entry(add(1, 0, 0));
    wb.result = 3;
    wb.result_ready = true;

    let bypass = Bypass {
        execute: Some(ex),
        memory: None,
        writeback: Some(wb),
    };
    assert_eq!(forward_operand(1, &bypass, &regs, ForwardingPriority::Youngest), 7);
    assert_eq!(forward_operand(1, &bypass, &regs, ForwardingPriority::Oldest), 3);
    assert_eq!(forward_operand(2, &bypass, &regs, ForwardingPriority::Youngest), 0);
    assert_eq!(
        forward_operand(1, &Bypass::default(), &regs, ForwardingPriority::Youngest),
        100,
        "falls back to the register file"
    );
}

/// Tests that forwarding never takes more cycles than stalling.
#[rstest]
#[case(RAW_DEPENDENCY)]
#[case(CHAIN)]
#[case(POST_INCREMENT)]
#[case(LOAD_USE)]
fn test_forwarding_not_slower(#[case] program: &str) {
    let mut stalled = TestContext::with_strategy(program, HazardStrategy::Scoreboard);
    let mut forwarded = TestContext::with_strategy(program, HazardStrategy::Forwarding);
    let slow = stalled.run();
    let fast = forwarded.run();
    assert!(fast.cycles <= slow.cycles, "{} > {}", fast.cycles, slow.cycles);
    assert_eq!(
        forwarded.sim.cpu.regs.values(),
        stalled.sim.cpu.regs.values()
    );
}
