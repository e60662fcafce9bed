//! Forced spawn budget and exit slots for one population pass.

use crate::config::{GenerationContext, SpawnPolicy};

/// What the next placement iteration should try to create.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementKind {
    Exit,
    Monster,
    Loot,
    Nothing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnBudget {
    iterations: usize,
    exit_slots: usize,
    monsters: usize,
    loot: usize,
}

impl SpawnBudget {
    pub fn new(policy: &SpawnPolicy, context: &GenerationContext) -> Self {
        let exit_slots = match (context.disable_normal_exit, context.secondary_exit) {
            (true, _) => 0,
            (false, true) => 2,
            (false, false) => 1,
        };
        Self {
            iterations: policy.forced_monsters + policy.forced_loot + 1,
            exit_slots,
            monsters: policy.forced_monsters,
            loot: policy.forced_loot,
        }
    }

    /// Non-retry iterations of the placement loop; one more than the forced
    /// monster and loot counts together.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Consumes budget for `iteration` and reports what to place there.
    /// Monster and loot budget is spent even when the cell later turns out
    /// to be excluded.
    pub fn next_placement(&mut self, iteration: usize) -> PlacementKind {
        if iteration < self.exit_slots {
            PlacementKind::Exit
        } else if self.monsters > 0 {
            self.monsters -= 1;
            PlacementKind::Monster
        } else if self.loot > 0 {
            self.loot -= 1;
            PlacementKind::Loot
        } else {
            PlacementKind::Nothing
        }
    }

    pub fn monsters_left(&self) -> usize {
        self.monsters
    }

    pub fn loot_left(&self) -> usize {
        self.loot
    }
}
