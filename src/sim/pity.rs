//! Pool mutation for obtained tanks.
//!
//! Once a tank drops it is removed from its group and its probability mass is
//! redistributed evenly across the surviving items, keeping the group's rates
//! summing to 1. When the last tank is removed the slot converts to the
//! terminal compensation state: a single synthetic item with rate 1.0 named
//! after the box's configured compensation drop. That conversion happens
//! exactly once and never reverts.
//!
//! The removed mass is split evenly across the survivors, keeping the group
//! normalized without tracking original weights.

use crate::sim::error::SimError;
use crate::table::model::{LootItem, LootTable, SlotSpecial, Tier};

/// Remove `name` from the tier's tank pool and restore the rate invariant.
/// Removing a name that is not in the pool is an error, never a no-op.
pub fn remove_from_tank_pool(table: &mut LootTable, tier: Tier, name: &str) -> Result<(), SimError> {
    let lootbox = table.box_for_mut(tier)?;
    let compensation = lootbox.compensation.clone();
    let slot = lootbox
        .tank_slot_mut()
        .ok_or(SimError::MissingTankSlot(tier))?;
    let group = slot
        .groups
        .first_mut()
        .ok_or(SimError::MissingTankSlot(tier))?;

    let position = group
        .items
        .iter()
        .position(|item| item.name == name)
        .ok_or_else(|| SimError::UnknownItem {
            tier,
            name: name.to_string(),
        })?;
    let removed = group.items.remove(position);

    if group.items.is_empty() {
        slot.special = SlotSpecial::Compensation;
        group.items.push(LootItem {
            name: compensation.name,
            amount: compensation.amount,
            rate: 1.0,
        });
    } else {
        let share = removed.rate / group.items.len() as f64;
        for item in &mut group.items {
            item.rate += share;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::model::{CompensationDrop, LootBox, LootGroup, LootSlot};

    fn tank_table(items: Vec<LootItem>) -> LootTable {
        LootTable::new(vec![LootBox {
            name: "Crate".to_string(),
            tier: Tier::One,
            pity: 5,
            compensation: CompensationDrop {
                name: "Crate".to_string(),
                amount: 1,
            },
            slots: vec![LootSlot {
                slot_no: 1,
                rate: 0.02,
                special: SlotSpecial::Tank,
                groups: vec![LootGroup {
                    alias: "Vehicles".to_string(),
                    rate: 1.0,
                    items,
                }],
            }],
        }])
    }

    fn item(name: &str, rate: f64) -> LootItem {
        LootItem {
            name: name.to_string(),
            amount: 1,
            rate,
        }
    }

    #[test]
    fn removed_rate_splits_evenly_across_survivors() {
        let mut table = tank_table(vec![item("A", 0.4), item("B", 0.35), item("C", 0.25)]);
        remove_from_tank_pool(&mut table, Tier::One, "A").unwrap();

        let group = &table.box_for(Tier::One).unwrap().slots[0].groups[0];
        assert_eq!(group.items.len(), 2);
        assert!((group.items[0].rate - (0.35 + 0.2)).abs() < 1e-9);
        assert!((group.items[1].rate - (0.25 + 0.2)).abs() < 1e-9);
        let sum: f64 = group.items.iter().map(|i| i.rate).sum();
        assert!((sum - 1.0).abs() < 1e-9, "rates sum to {sum}");
    }

    #[test]
    fn emptying_the_pool_converts_slot_to_compensation() {
        let mut table = tank_table(vec![item("Last One", 1.0)]);
        remove_from_tank_pool(&mut table, Tier::One, "Last One").unwrap();

        let slot = &table.box_for(Tier::One).unwrap().slots[0];
        assert_eq!(slot.special, SlotSpecial::Compensation);
        assert_eq!(slot.groups[0].items.len(), 1);
        let substitute = &slot.groups[0].items[0];
        assert_eq!(substitute.name, "Crate");
        assert_eq!(substitute.amount, 1);
        assert_eq!(substitute.rate, 1.0);
        assert!(table.is_tier_complete(Tier::One).unwrap());
    }

    #[test]
    fn conversion_is_terminal() {
        let mut table = tank_table(vec![item("Last One", 1.0)]);
        remove_from_tank_pool(&mut table, Tier::One, "Last One").unwrap();
        // The tank slot is gone, so further mutation attempts must fail
        // rather than touch the compensation item.
        assert_eq!(
            remove_from_tank_pool(&mut table, Tier::One, "Crate"),
            Err(SimError::MissingTankSlot(Tier::One))
        );
    }

    #[test]
    fn removing_an_absent_item_fails() {
        let mut table = tank_table(vec![item("A", 0.5), item("B", 0.5)]);
        assert!(matches!(
            remove_from_tank_pool(&mut table, Tier::One, "Z"),
            Err(SimError::UnknownItem { .. })
        ));
    }
}
