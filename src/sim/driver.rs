//! Run driver: fixed-quantity mode ("open N boxes to exhaustion") and
//! completion mode ("purchase until every tank is obtained").
//!
//! Each run operates on a private clone of the reference table and a seeded
//! [Rng], so runs are reproducible and safe to execute concurrently.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::sim::engine::{open_all_from_tier, RunState};
use crate::sim::error::SimError;
use crate::sim::rng::Rng;
use crate::table::model::{LootTable, Tier, TierMap};

/// Stop condition for completion mode: every tier exhausted, or one specific
/// tier exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTarget {
    All,
    Tier(Tier),
}

impl CompletionTarget {
    /// Parse the CLI/API spelling: `all`, `1`, `2` or `3`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => Some(Self::All),
            "1" => Some(Self::Tier(Tier::One)),
            "2" => Some(Self::Tier(Tier::Two)),
            "3" => Some(Self::Tier(Tier::Three)),
            _ => None,
        }
    }

    pub fn satisfied(&self, table: &LootTable) -> Result<bool, SimError> {
        match self {
            Self::All => {
                for tier in Tier::ALL {
                    if !table.is_tier_complete(tier)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Tier(tier) => table.is_tier_complete(*tier),
        }
    }
}

impl std::fmt::Display for CompletionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Tier(tier) => write!(f, "{tier}"),
        }
    }
}

/// Terminal result of a fixed-quantity run.
#[derive(Debug, Clone, Serialize)]
pub struct OpeningOutcome {
    /// Boxes opened per tier, chained openings included.
    pub opened: TierMap<u64>,
    /// Cumulative rewards, ordered by item name.
    pub rewards: BTreeMap<String, u64>,
}

fn next_tier_with_remaining(state: &RunState) -> Option<Tier> {
    Tier::ALL.into_iter().find(|&tier| state.remaining[tier] > 0)
}

/// Drain every queued box, always working the lowest-numbered tier that has
/// boxes remaining. Chained drops re-enter the queue and are picked up here.
fn drain_all(table: &mut LootTable, state: &mut RunState, rng: &mut Rng) -> Result<(), SimError> {
    while let Some(tier) = next_tier_with_remaining(state) {
        open_all_from_tier(table, tier, state, rng)?;
    }
    Ok(())
}

/// Fixed-quantity mode: open `amount` tier-1 boxes to exhaustion, following
/// chained drops across tiers.
pub fn open_amount(table: &LootTable, amount: u64, seed: u64) -> Result<OpeningOutcome, SimError> {
    let mut table = table.clone();
    let mut rng = Rng::new(seed);
    let mut state = RunState::new(&table)?;
    state.remaining[Tier::One] = amount;

    drain_all(&mut table, &mut state, &mut rng)?;

    Ok(OpeningOutcome {
        opened: state.opened,
        rewards: state.rewards,
    })
}

/// Completion mode: purchase one tier-1 box at a time, drain every chain, and
/// stop once `target` is satisfied. Returns the number of boxes purchased,
/// always at least 1.
///
/// Terminates because pity bounds the openings between protected drops and
/// each tier's tank pool only ever shrinks.
pub fn open_until(table: &LootTable, target: CompletionTarget, seed: u64) -> Result<u64, SimError> {
    let mut table = table.clone();
    let mut rng = Rng::new(seed);
    let mut state = RunState::new(&table)?;
    let mut purchased: u64 = 1;
    state.remaining[Tier::One] = 1;

    loop {
        drain_all(&mut table, &mut state, &mut rng)?;
        if target.satisfied(&table)? {
            return Ok(purchased);
        }
        purchased += 1;
        state.remaining[Tier::One] += 1;
    }
}
