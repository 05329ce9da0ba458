//! Branch Target Buffer (BTB).
//!
//! A small fully associative table of conditional branches. Each entry keeps
//! the branch target and a two-bit history that predicts the direction:
//!
//! | (h0,h1) | taken  | not taken | predicts |
//! |---------|--------|-----------|----------|
//! | (0,0)   | (0,1)  | (0,0)     | not taken |
//! | (0,1)   | (1,0)  | (0,1)     | not taken |
//! | (1,0)   | (1,1)  | (0,1)     | taken    |
//! | (1,1)   | (1,1)  | (1,0)     | taken    |
//!
//! Fetch looks entries up by exact PC. Decode allocates an entry for a
//! branch that missed, and Execute updates it once the branch resolves.

use serde::Serialize;

use crate::config::{ReplacementPolicy, SeedPolicy};
use crate::core::pipeline::latches::Prediction;
use crate::isa::Condition;

/// Two-bit branch history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct History {
    pub h0: bool,
    pub h1: bool,
}

impl History {
    /// Strongly not taken, (0,0).
    pub const NOT_TAKEN: History = History { h0: false, h1: false };

    /// Strongly taken, (1,1).
    pub const TAKEN: History = History { h0: true, h1: true };

    /// True if the history predicts the branch taken.
    pub fn predicts_taken(self) -> bool {
        self.h0
    }

    /// Returns the history after observing one outcome.
    pub fn next(self, taken: bool) -> History {
        let (h0, h1) = match (self.h0, self.h1, taken) {
            (false, false, true) => (false, true),
            (false, false, false) => (false, false),
            (true, false, true) => (true, true),
            (true, false, false) => (false, true),
            (true, true, true) => (true, true),
            (true, true, false) => (true, false),
            (false, true, true) => (true, false),
            (false, true, false) => (false, true),
        };
        History { h0, h1 }
    }
}

/// An entry in the Branch Target Buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BtbEntry {
    /// PC of the branch owning this entry.
    pub tag: u32,
    /// Direction history.
    pub history: History,
    /// Branch target address.
    pub target: u32,
    /// Indicates if this entry contains valid data.
    pub valid: bool,
}

/// Result of resolving a branch in Execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchResolution {
    /// PC Fetch must restart from, if the fetched path was wrong.
    pub redirect: Option<u32>,
}

impl BranchResolution {
    /// True if the instructions fetched after the branch are discarded.
    pub fn mispredicted(&self) -> bool {
        self.redirect.is_some()
    }
}

/// Branch Target Buffer structure.
#[derive(Clone, Debug)]
pub struct Btb {
    /// The table of BTB entries.
    table: Vec<BtbEntry>,
    replacement: ReplacementPolicy,
    seed: SeedPolicy,
    /// Next slot to overwrite under round-robin replacement.
    victim: usize,
}

impl Btb {
    /// Creates an empty BTB.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of entries
    /// * `replacement` - Slot chosen when the table is full
    /// * `seed` - Initial history of new entries
    pub fn new(size: usize, replacement: ReplacementPolicy, seed: SeedPolicy) -> Self {
        Self {
            table: vec![BtbEntry::default(); size],
            replacement,
            seed,
            victim: 0,
        }
    }

    /// All entries, slot 0 first.
    pub fn entries(&self) -> &[BtbEntry] {
        &self.table
    }

    /// Looks up the entry for `pc`.
    ///
    /// # Returns
    ///
    /// On a hit, the prediction metadata (slot index and predicted
    /// direction) together with the stored target.
    pub fn lookup(&self, pc: u32) -> Option<(Prediction, u32)> {
        self.slot_of(pc).map(|idx| {
            let entry = &self.table[idx];
            let prediction = Prediction {
                hit: true,
                index: Some(idx),
                taken: entry.history.predicts_taken(),
            };
            (prediction, entry.target)
        })
    }

    fn slot_of(&self, pc: u32) -> Option<usize> {
        self.table.iter().position(|e| e.valid && e.tag == pc)
    }

    fn seed_history(&self, cond: Condition) -> History {
        let taken = match self.seed {
            SeedPolicy::MnemonicBias => cond.is_taken_biased(),
            SeedPolicy::NotTaken => false,
            SeedPolicy::Taken => true,
        };
        if taken {
            History::TAKEN
        } else {
            History::NOT_TAKEN
        }
    }

    /// Allocates an entry for a branch that missed at Fetch.
    ///
    /// An entry already tagged with `pc` is reused as is. Otherwise the first
    /// invalid slot is taken, and when the table is full the replacement
    /// policy picks the victim.
    ///
    /// # Returns
    ///
    /// The slot index now owned by `pc`.
    pub fn allocate(&mut self, pc: u32, target: u32, cond: Condition) -> usize {
        if let Some(idx) = self.slot_of(pc) {
            return idx;
        }
        let idx = match self.table.iter().position(|e| !e.valid) {
            Some(free) => free,
            None => match self.replacement {
                ReplacementPolicy::SlotZero => 0,
                ReplacementPolicy::RoundRobin => {
                    let idx = self.victim;
                    self.victim = (self.victim + 1) % self.table.len();
                    idx
                }
            },
        };
        self.table[idx] = BtbEntry {
            tag: pc,
            history: self.seed_history(cond),
            target,
            valid: true,
        };
        idx
    }

    /// Resolves a branch in Execute.
    ///
    /// Refreshes the target and history of the branch's entry, unless the
    /// slot has been handed to another branch since, and decides whether the
    /// fetched path must be discarded.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the branch
    /// * `prediction` - Prediction metadata carried from Fetch and Decode
    /// * `taken` - Actual direction
    /// * `target` - Actual target, `pc + offset`
    pub fn resolve(
        &mut self,
        pc: u32,
        prediction: Prediction,
        taken: bool,
        target: u32,
    ) -> BranchResolution {
        if let Some(entry) = prediction
            .index
            .and_then(|idx| self.table.get_mut(idx))
            .filter(|e| e.valid && e.tag == pc)
        {
            entry.target = target;
            entry.history = entry.history.next(taken);
        }

        let redirect = match (taken, prediction.hit, prediction.taken) {
            (true, true, true) => None,
            (true, true, false) => Some(target),
            (true, false, _) => Some(target),
            (false, true, true) => Some(pc.wrapping_add(4)),
            (false, true, false) => None,
            (false, false, _) => None,
        };
        BranchResolution { redirect }
    }
}
