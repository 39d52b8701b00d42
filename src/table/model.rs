//! Loot-table data model: tiers, boxes, slots, groups, items.
//!
//! The shape is fixed (three tiers, one box per tier, one tank slot per box)
//! but the contents mutate during a run as tanks are removed from the pool.
//! Each run clones the reference table so runs never share mutable state.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::sim::error::SimError;

/// Box rarity class. One box definition and one pity counter per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::One, Tier::Two, Tier::Three];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            3 => Ok(Tier::Three),
            other => Err(format!("tier must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier as u8 + 1
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Dense per-tier storage. Indexable by [Tier], so tier handling is checked
/// at compile time instead of going through string- or int-keyed maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierMap<T>([T; 3]);

impl<T> TierMap<T> {
    pub fn from_fn(mut init: impl FnMut(Tier) -> T) -> Self {
        Self([init(Tier::One), init(Tier::Two), init(Tier::Three)])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, &T)> {
        Tier::ALL.iter().map(move |&tier| (tier, &self.0[tier.index()]))
    }
}

impl<T: Copy> TierMap<T> {
    pub fn filled(value: T) -> Self {
        Self([value; 3])
    }
}

impl<T> Index<Tier> for TierMap<T> {
    type Output = T;

    fn index(&self, tier: Tier) -> &T {
        &self.0[tier.index()]
    }
}

impl<T> IndexMut<Tier> for TierMap<T> {
    fn index_mut(&mut self, tier: Tier) -> &mut T {
        &mut self.0[tier.index()]
    }
}

impl<T: Serialize> Serialize for TierMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        for (tier, value) in self.iter() {
            map.serialize_entry(&u8::from(tier), value)?;
        }
        map.end()
    }
}

/// Tag marking how a slot's drops are handled by the opening engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotSpecial {
    /// Plain filler reward, no special handling.
    None,
    /// Drops name another box; obtaining one queues an opening for its tier.
    Box,
    /// The protected scarce drop, subject to pity and pool mutation.
    Tank,
    /// Terminal state of an exhausted tank slot. Drops the configured
    /// compensation, resets pity, and chains like a box drop.
    Compensation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub name: String,
    pub amount: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootGroup {
    pub alias: String,
    pub rate: f64,
    #[serde(rename = "loot_items")]
    pub items: Vec<LootItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootSlot {
    pub slot_no: u32,
    /// Trigger rate in [0, 1]. Forced to 1 for protected slots while pity is due.
    pub rate: f64,
    pub special: SlotSpecial,
    #[serde(rename = "loot_groups")]
    pub groups: Vec<LootGroup>,
}

/// The fallback drop inserted once every tank in a box has been obtained.
/// Its name must refer to another box so the drop chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationDrop {
    pub name: String,
    #[serde(default = "default_compensation_amount")]
    pub amount: u64,
}

fn default_compensation_amount() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootBox {
    pub name: String,
    pub tier: Tier,
    /// Pity threshold: openings without a protected drop before one is forced.
    pub pity: u32,
    pub compensation: CompensationDrop,
    #[serde(rename = "loot_slots")]
    pub slots: Vec<LootSlot>,
}

impl LootBox {
    pub fn tank_slot(&self) -> Option<&LootSlot> {
        self.slots.iter().find(|slot| slot.special == SlotSpecial::Tank)
    }

    pub fn tank_slot_mut(&mut self) -> Option<&mut LootSlot> {
        self.slots.iter_mut().find(|slot| slot.special == SlotSpecial::Tank)
    }
}

/// The loot table for one lootbox event: header metadata and one box per tier,
/// plus a name-to-tier index built once at load so chained drops resolve in O(1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub boxes: Vec<LootBox>,
    #[serde(skip)]
    box_tiers: HashMap<String, Tier>,
}

impl LootTable {
    pub fn new(boxes: Vec<LootBox>) -> Self {
        let mut table = Self {
            game: None,
            event: None,
            source: None,
            boxes,
            box_tiers: HashMap::new(),
        };
        table.rebuild_index();
        table
    }

    /// Rebuild the name-to-tier index. Must run after deserialization, before
    /// any lookup.
    pub(crate) fn rebuild_index(&mut self) {
        self.box_tiers = self
            .boxes
            .iter()
            .map(|lootbox| (lootbox.name.clone(), lootbox.tier))
            .collect();
    }

    pub fn box_for(&self, tier: Tier) -> Result<&LootBox, SimError> {
        self.boxes
            .iter()
            .find(|lootbox| lootbox.tier == tier)
            .ok_or(SimError::UnknownTier(tier))
    }

    pub fn box_for_mut(&mut self, tier: Tier) -> Result<&mut LootBox, SimError> {
        self.boxes
            .iter_mut()
            .find(|lootbox| lootbox.tier == tier)
            .ok_or(SimError::UnknownTier(tier))
    }

    pub fn pity_threshold(&self, tier: Tier) -> Result<u32, SimError> {
        Ok(self.box_for(tier)?.pity)
    }

    /// Tier of the box a box-typed or compensation drop converts to.
    pub fn tier_for_box_name(&self, name: &str) -> Result<Tier, SimError> {
        self.box_tiers
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownBox {
                name: name.to_string(),
            })
    }

    /// A tier is complete once its tank slot has converted to compensation,
    /// i.e. every protected item has been obtained.
    pub fn is_tier_complete(&self, tier: Tier) -> Result<bool, SimError> {
        Ok(self
            .box_for(tier)?
            .slots
            .iter()
            .any(|slot| slot.special == SlotSpecial::Compensation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_box(name: &str, tier: Tier) -> LootBox {
        LootBox {
            name: name.to_string(),
            tier,
            pity: 5,
            compensation: CompensationDrop {
                name: name.to_string(),
                amount: 1,
            },
            slots: Vec::new(),
        }
    }

    #[test]
    fn tier_round_trips_through_u8() {
        for tier in Tier::ALL {
            assert_eq!(Tier::try_from(u8::from(tier)), Ok(tier));
        }
        assert!(Tier::try_from(0).is_err());
        assert!(Tier::try_from(4).is_err());
    }

    #[test]
    fn tier_map_indexes_by_tier() {
        let mut map = TierMap::filled(0u64);
        map[Tier::Two] = 7;
        assert_eq!(map[Tier::One], 0);
        assert_eq!(map[Tier::Two], 7);
        let counts = TierMap::from_fn(|tier| u64::from(u8::from(tier)));
        assert_eq!(counts[Tier::Three], 3);
    }

    #[test]
    fn tier_map_serializes_with_tier_numbers_as_keys() {
        let map = TierMap::from_fn(|tier| u64::from(u8::from(tier)) * 10);
        let json = serde_json::to_value(map).expect("serialize");
        assert_eq!(json["1"], 10);
        assert_eq!(json["3"], 30);
    }

    #[test]
    fn box_name_index_resolves_tiers() {
        let table = LootTable::new(vec![
            minimal_box("Standard Crate", Tier::One),
            minimal_box("Premium Crate", Tier::Two),
        ]);
        assert_eq!(table.tier_for_box_name("Premium Crate").unwrap(), Tier::Two);
        assert!(matches!(
            table.tier_for_box_name("Mystery Crate"),
            Err(SimError::UnknownBox { .. })
        ));
    }

    #[test]
    fn missing_tier_is_a_configuration_error() {
        let table = LootTable::new(vec![minimal_box("Standard Crate", Tier::One)]);
        assert!(matches!(
            table.box_for(Tier::Three),
            Err(SimError::UnknownTier(Tier::Three))
        ));
    }
}
