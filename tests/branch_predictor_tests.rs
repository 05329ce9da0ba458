//! Tests for the branch target buffer and misprediction recovery.

mod common;

use apex_sim::config::{HazardStrategy, ReplacementPolicy, SeedPolicy};
use apex_sim::core::pipeline::latches::Prediction;
use apex_sim::core::pipeline::traits::PipelineLatch;
use apex_sim::core::units::bru::{Btb, History};
use apex_sim::isa::Condition;
use apex_sim::sim::StopReason;
use common::TestContext;
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Two passes through a loop whose inner branch flips direction.
const FLIP_LOOP: &str = "\
MOVC,R2,#2
MOVC,R3,#0
BNZ,#12
SUBL,R2,R2,#1
BNZ,#-12
HALT
";

fn h(h0: u8, h1: u8) -> History {
    History {
        h0: h0 == 1,
        h1: h1 == 1,
    }
}

/// Tests every transition of the two-bit history.
#[rstest]
#[case(h(0, 0), true, h(0, 1))]
#[case(h(0, 0), false, h(0, 0))]
#[case(h(0, 1), true, h(1, 0))]
#[case(h(0, 1), false, h(0, 1))]
#[case(h(1, 0), true, h(1, 1))]
#[case(h(1, 0), false, h(0, 1))]
#[case(h(1, 1), true, h(1, 1))]
#[case(h(1, 1), false, h(1, 0))]
fn test_history_transitions(#[case] from: History, #[case] taken: bool, #[case] to: History) {
    assert_eq!(from.next(taken), to);
}

/// Tests that only h0 decides the predicted direction.
#[test]
fn test_history_prediction() {
    assert!(!h(0, 0).predicts_taken());
    assert!(!h(0, 1).predicts_taken());
    assert!(h(1, 0).predicts_taken());
    assert!(h(1, 1).predicts_taken());
}

/// Tests a branch observed taken, taken, not taken, taken.
#[test]
fn test_btb_state_sequence() {
    let pc = 5000;
    let target = 5100;
    let mut btb = Btb::new(4, ReplacementPolicy::SlotZero, SeedPolicy::MnemonicBias);
    assert!(btb.lookup(pc).is_none(), "BTB starts empty");

    let slot = btb.allocate(pc, target, Condition::Zero);
    assert_eq!(btb.entries()[slot].history, History::NOT_TAKEN);

    let steps = [
        (true, false, Some(target), h(0, 1)),
        (true, false, Some(target), h(1, 0)),
        (false, true, Some(pc + 4), h(0, 1)),
        (true, false, Some(target), h(1, 0)),
    ];
    for (i, (taken, predicted, redirect, state)) in steps.into_iter().enumerate() {
        let (prediction, stored) = btb.lookup(pc).expect("entry stays resident");
        assert_eq!(stored, target);
        assert_eq!(prediction.taken, predicted, "prediction at step {}", i);
        let resolution = btb.resolve(pc, prediction, taken, target);
        assert_eq!(resolution.redirect, redirect, "redirect at step {}", i);
        assert_eq!(btb.entries()[slot].history, state, "state after step {}", i);
    }
}

/// Tests the six resolution cases.
#[rstest]
#[case(true, true, true, None)]
#[case(true, true, false, Some(200))]
#[case(true, false, false, Some(200))]
#[case(false, true, true, Some(104))]
#[case(false, true, false, None)]
#[case(false, false, false, None)]
fn test_resolution_table(
    #[case] taken: bool,
    #[case] hit: bool,
    #[case] predicted: bool,
    #[case] redirect: Option<u32>,
) {
    let mut btb = Btb::new(4, ReplacementPolicy::SlotZero, SeedPolicy::NotTaken);
    let prediction = Prediction {
        hit,
        index: None,
        taken: predicted,
    };
    let resolution = btb.resolve(100, prediction, taken, 200);
    assert_eq!(resolution.redirect, redirect);
    assert_eq!(resolution.mispredicted(), redirect.is_some());
}

/// Tests the seed policies.
#[test]
fn test_seed_policies() {
    let mut bias = Btb::new(4, ReplacementPolicy::SlotZero, SeedPolicy::MnemonicBias);
    let bnz = bias.allocate(100, 0, Condition::NotZero);
    let bp = bias.allocate(104, 0, Condition::Positive);
    let bn = bias.allocate(108, 0, Condition::Negative);
    assert_eq!(bias.entries()[bnz].history, History::TAKEN);
    assert_eq!(bias.entries()[bp].history, History::TAKEN);
    assert_eq!(bias.entries()[bn].history, History::NOT_TAKEN);

    let mut taken = Btb::new(4, ReplacementPolicy::SlotZero, SeedPolicy::Taken);
    let slot = taken.allocate(100, 0, Condition::Zero);
    assert_eq!(taken.entries()[slot].history, History::TAKEN);
}

/// Tests that a resident branch keeps its slot.
#[test]
fn test_allocate_reuses_tag() {
    let mut btb = Btb::new(4, ReplacementPolicy::SlotZero, SeedPolicy::NotTaken);
    assert_eq!(btb.allocate(100, 0, Condition::Zero), 0);
    assert_eq!(btb.allocate(104, 0, Condition::Zero), 1);
    assert_eq!(btb.allocate(100, 0, Condition::Zero), 0);
    assert_eq!(btb.entries().iter().filter(|e| e.valid).count(), 2);
}

/// Tests five distinct branches in a four-entry table.
#[rstest]
#[case(ReplacementPolicy::SlotZero, [0, 1, 2, 3, 0, 0])]
#[case(ReplacementPolicy::RoundRobin, [0, 1, 2, 3, 0, 1])]
fn test_capacity_collision(#[case] policy: ReplacementPolicy, #[case] slots: [usize; 6]) {
    let mut btb = Btb::new(4, policy, SeedPolicy::NotTaken);
    for (i, expected) in slots.into_iter().enumerate() {
        let pc = 100 + 4 * i as u32;
        assert_eq!(btb.allocate(pc, 0, Condition::Zero), expected, "branch {}", i);
        assert_eq!(btb.lookup(pc).and_then(|(p, _)| p.index), Some(expected));
    }
    let tags: Vec<u32> = btb.entries().iter().map(|e| e.tag).collect();
    match policy {
        ReplacementPolicy::SlotZero => assert_eq!(tags, vec![120, 104, 108, 112]),
        ReplacementPolicy::RoundRobin => assert_eq!(tags, vec![116, 120, 108, 112]),
    }
    assert!(btb.lookup(100).is_none(), "the first branch was evicted");
}

/// Tests that a reallocated slot is not updated by the evicted branch.
#[test]
fn test_resolve_skips_reallocated_slot() {
    let mut btb = Btb::new(1, ReplacementPolicy::SlotZero, SeedPolicy::NotTaken);
    let slot = btb.allocate(100, 200, Condition::Zero);
    let stale = Prediction {
        hit: false,
        index: Some(slot),
        taken: false,
    };
    btb.allocate(300, 400, Condition::Zero);

    btb.resolve(100, stale, true, 200);
    let entry = btb.entries()[slot];
    assert_eq!(entry.tag, 300);
    assert_eq!(entry.target, 400);
    assert_eq!(entry.history, History::NOT_TAKEN);
}

/// Tests that a wrong taken prediction costs one bubble and restarts at
/// the fall-through address.
#[rstest]
fn test_mispredict_recovery(
    #[values(HazardStrategy::Scoreboard, HazardStrategy::Forwarding)] strategy: HazardStrategy,
) {
    let mut ctx = TestContext::with_strategy(FLIP_LOOP, strategy);

    let mut guard = 0;
    while !ctx
        .sim
        .cpu
        .latches
        .execute
        .get()
        .is_some_and(|e| e.pc == 4008 && e.prediction.hit)
    {
        ctx.tick();
        guard += 1;
        assert!(guard < 100, "branch never reached Execute with a BTB hit");
    }
    let ex = ctx.sim.cpu.latches.execute.get().copied().unwrap();
    assert!(ex.prediction.taken, "stale entry predicts taken");
    assert_eq!(
        ctx.sim.cpu.latches.decode.get().map(|e| e.pc),
        Some(4020),
        "wrong path fetched from the predicted target"
    );

    let bubbles = ctx.sim.cpu.stats.bubbles;
    ctx.tick();
    assert!(ctx.sim.cpu.latches.decode.is_empty(), "Decode flushed");
    assert!(ctx.sim.cpu.latches.execute.is_empty(), "nothing issued");
    assert_eq!(ctx.sim.cpu.stats.bubbles, bubbles + 1);
    assert_eq!(ctx.sim.cpu.pc, 4012);

    ctx.tick();
    assert_eq!(ctx.sim.cpu.latches.decode.get().map(|e| e.pc), Some(4012));
}

/// Tests the architectural result and predictor state of the loop.
#[rstest]
fn test_flip_loop_completes(
    #[values(HazardStrategy::Scoreboard, HazardStrategy::Forwarding)] strategy: HazardStrategy,
) {
    let mut ctx = TestContext::with_strategy(FLIP_LOOP, strategy);
    let outcome = ctx.run();
    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(outcome.instructions, 10);
    assert_eq!(ctx.reg(2), 0);
    assert_eq!(ctx.reg(3), 0);

    let btb = ctx.sim.cpu.btb.entries();
    assert_eq!((btb[0].tag, btb[0].history), (4008, h(0, 1)));
    assert_eq!((btb[1].tag, btb[1].history), (4016, h(1, 0)));
    assert!(!btb[2].valid && !btb[3].valid);

    let stats = &ctx.sim.cpu.stats;
    assert_eq!(stats.branch_predictions, 4);
    assert_eq!(stats.branch_mispredictions, 3);
    assert_eq!(stats.btb_allocations, 2);
    assert_eq!(stats.bubbles, 3);
}
