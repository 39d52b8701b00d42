//! Box-opening engine: runs the sampler across every slot of a box, applies
//! pity overrides, aggregates rewards, chains extra boxes and mutates the
//! tank pool. Any lookup or sampler failure aborts the run; it indicates a
//! corrupted loot table, not a transient condition.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::sim::error::{DrawStage, SimError};
use crate::sim::pity::remove_from_tank_pool;
use crate::sim::rng::Rng;
use crate::sim::sampler;
use crate::table::model::{LootTable, SlotSpecial, Tier, TierMap};

/// One hit emitted by a slot during a box opening.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropRecord {
    pub slot_no: u32,
    pub group: String,
    pub special: SlotSpecial,
    pub name: String,
    pub amount: u64,
}

/// Transient per-run bookkeeping: cumulative rewards (name-ordered), boxes
/// remaining/opened per tier, and the pity counters.
#[derive(Debug, Clone)]
pub struct RunState {
    pub rewards: BTreeMap<String, u64>,
    pub remaining: TierMap<u64>,
    pub opened: TierMap<u64>,
    pub pity: TierMap<u32>,
}

impl RunState {
    pub fn new(table: &LootTable) -> Result<Self, SimError> {
        let mut pity = TierMap::filled(0u32);
        for tier in Tier::ALL {
            pity[tier] = table.pity_threshold(tier)?;
        }
        Ok(Self {
            rewards: BTreeMap::new(),
            remaining: TierMap::filled(0),
            opened: TierMap::filled(0),
            pity,
        })
    }

    /// An opening performed while the counter sits at 0 is pity-forced.
    pub fn pity_due(&self, tier: Tier) -> bool {
        self.pity[tier] == 0
    }
}

/// Open a single box of `tier`: one independent hit/miss draw per slot, in
/// slot order, then a group draw and an item draw for each hit. When
/// `pity_forced` is set the protected slot's trigger rate is overridden to 1
/// for this box only.
pub fn open_one(
    table: &LootTable,
    tier: Tier,
    pity_forced: bool,
    rng: &mut Rng,
) -> Result<Vec<DropRecord>, SimError> {
    let lootbox = table.box_for(tier)?;
    let mut drops = Vec::new();

    for slot in &lootbox.slots {
        let protected = matches!(slot.special, SlotSpecial::Tank | SlotSpecial::Compensation);
        let effective_rate = if protected && pity_forced { 1.0 } else { slot.rate };
        let hit = sampler::hits(effective_rate, rng)
            .map_err(|err| SimError::distribution(tier, slot.slot_no, DrawStage::SlotRate, err))?;
        if !hit {
            continue;
        }

        let group_weights: Vec<f64> = slot.groups.iter().map(|group| group.rate).collect();
        let group_index = sampler::weighted_index(&group_weights, rng)
            .map_err(|err| SimError::distribution(tier, slot.slot_no, DrawStage::Group, err))?;
        let group = &slot.groups[group_index];

        let item_weights: Vec<f64> = group.items.iter().map(|item| item.rate).collect();
        let item_index = sampler::weighted_index(&item_weights, rng)
            .map_err(|err| SimError::distribution(tier, slot.slot_no, DrawStage::Item, err))?;
        let item = &group.items[item_index];

        drops.push(DropRecord {
            slot_no: slot.slot_no,
            group: group.alias.clone(),
            special: slot.special,
            name: item.name.clone(),
            amount: item.amount,
        });
    }

    Ok(drops)
}

/// Open boxes of `tier` while any remain, with full per-opening bookkeeping:
/// reward aggregation, chaining of box/compensation drops, pity reset on
/// protected drops, tank-pool mutation, pity decrement otherwise.
///
/// Returns early (without exhausting the tier) as soon as chaining has queued
/// a box for a lower tier, so the driver always drains the lowest tier first.
pub fn open_all_from_tier(
    table: &mut LootTable,
    tier: Tier,
    state: &mut RunState,
    rng: &mut Rng,
) -> Result<(), SimError> {
    while state.remaining[tier] > 0 {
        let forced = state.pity_due(tier);
        let drops = open_one(table, tier, forced, rng)?;
        state.opened[tier] += 1;
        state.remaining[tier] -= 1;

        let mut protected_dropped = false;
        for record in &drops {
            *state.rewards.entry(record.name.clone()).or_insert(0) += record.amount;
            if matches!(record.special, SlotSpecial::Box | SlotSpecial::Compensation) {
                let chained = table.tier_for_box_name(&record.name)?;
                state.remaining[chained] += 1;
            }
            if matches!(record.special, SlotSpecial::Tank | SlotSpecial::Compensation) {
                protected_dropped = true;
                state.pity[tier] = table.pity_threshold(tier)?;
            }
            if record.special == SlotSpecial::Tank {
                remove_from_tank_pool(table, tier, &record.name)?;
            }
        }
        if !protected_dropped {
            state.pity[tier] = state.pity[tier].saturating_sub(1);
        }

        if Tier::ALL.iter().any(|&lower| lower < tier && state.remaining[lower] > 0) {
            break;
        }
    }
    Ok(())
}
