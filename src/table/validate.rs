//! Structural validation of a loot table. Runs at load time; any
//! error-severity diagnostic makes the table unusable (the engine assumes
//! every invariant below and treats violations found later as fatal).

use std::collections::HashSet;
use std::fmt;

use crate::table::model::{LootTable, SlotSpecial, Tier};

/// Tolerance for the sum-to-1 invariants on group and item rates.
pub const RATE_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    fn error(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.push(ValidationSeverity::Error, context, message);
    }

    fn warning(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.push(ValidationSeverity::Warning, context, message);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diag in &self.diagnostics {
            writeln!(f, "{diag}")?;
        }
        Ok(())
    }
}

/// Check every structural invariant the opening engine relies on.
pub fn validate_loot_table(table: &LootTable) -> ValidationReport {
    let mut report = ValidationReport::default();

    for tier in Tier::ALL {
        let count = table.boxes.iter().filter(|b| b.tier == tier).count();
        if count == 0 {
            report.error(format!("tier {tier}"), "no box defined");
        } else if count > 1 {
            report.error(format!("tier {tier}"), format!("{count} boxes defined, expected 1"));
        }
    }

    let mut box_names = HashSet::new();
    for lootbox in &table.boxes {
        if !box_names.insert(lootbox.name.as_str()) {
            report.error(
                format!("box '{}'", lootbox.name),
                "box name is not unique",
            );
        }
    }

    for lootbox in &table.boxes {
        let ctx = format!("box '{}'", lootbox.name);

        if lootbox.pity == 0 {
            report.error(&ctx, "pity threshold must be strictly positive");
        }
        if !box_names.contains(lootbox.compensation.name.as_str()) {
            report.error(
                &ctx,
                format!(
                    "compensation '{}' does not name a box",
                    lootbox.compensation.name
                ),
            );
        }
        if lootbox.compensation.amount == 0 {
            report.error(&ctx, "compensation amount must be strictly positive");
        }

        let tank_slots = lootbox
            .slots
            .iter()
            .filter(|slot| {
                matches!(slot.special, SlotSpecial::Tank | SlotSpecial::Compensation)
            })
            .count();
        if tank_slots != 1 {
            report.error(
                &ctx,
                format!("{tank_slots} tank slots, expected exactly 1"),
            );
        }

        if !lootbox.slots.iter().any(|slot| slot.rate >= 1.0) {
            report.warning(&ctx, "no guaranteed slot, box can roll empty");
        }

        for (position, slot) in lootbox.slots.iter().enumerate() {
            let slot_ctx = format!("{ctx} slot {}", slot.slot_no);

            if slot.slot_no as usize != position + 1 {
                report.error(
                    &slot_ctx,
                    format!("slot numbers must be dense and 1-based, expected {}", position + 1),
                );
            }
            if !slot.rate.is_finite() || !(0.0..=1.0).contains(&slot.rate) {
                report.error(&slot_ctx, format!("trigger rate {} outside [0, 1]", slot.rate));
            }
            if slot.groups.is_empty() {
                report.error(&slot_ctx, "slot has no groups");
                continue;
            }
            if matches!(slot.special, SlotSpecial::Tank | SlotSpecial::Compensation)
                && slot.groups.len() != 1
            {
                report.error(
                    &slot_ctx,
                    format!("tank slot must hold a single group, found {}", slot.groups.len()),
                );
            }

            let group_sum: f64 = slot.groups.iter().map(|group| group.rate).sum();
            if (group_sum - 1.0).abs() > RATE_SUM_TOLERANCE {
                report.error(
                    &slot_ctx,
                    format!("group rates sum to {group_sum}, expected 1"),
                );
            }

            for group in &slot.groups {
                let group_ctx = format!("{slot_ctx} group '{}'", group.alias);

                if group.items.is_empty() {
                    report.error(&group_ctx, "group has no items");
                    continue;
                }
                let item_sum: f64 = group.items.iter().map(|item| item.rate).sum();
                if (item_sum - 1.0).abs() > RATE_SUM_TOLERANCE {
                    report.error(
                        &group_ctx,
                        format!("item rates sum to {item_sum}, expected 1"),
                    );
                }

                let mut item_names = HashSet::new();
                for item in &group.items {
                    if !item_names.insert(item.name.as_str()) {
                        report.error(
                            &group_ctx,
                            format!("item name '{}' is not unique within the group", item.name),
                        );
                    }
                    if item.amount == 0 {
                        report.error(
                            &group_ctx,
                            format!("item '{}' amount must be strictly positive", item.name),
                        );
                    }
                    if !item.rate.is_finite() || item.rate < 0.0 || item.rate > 1.0 {
                        report.error(
                            &group_ctx,
                            format!("item '{}' rate {} outside [0, 1]", item.name, item.rate),
                        );
                    }
                    if slot.special == SlotSpecial::Box && !box_names.contains(item.name.as_str()) {
                        report.error(
                            &group_ctx,
                            format!("box drop '{}' does not name a box", item.name),
                        );
                    }
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::model::{CompensationDrop, LootBox, LootGroup, LootItem, LootSlot};

    fn valid_box(name: &str, tier: Tier) -> LootBox {
        LootBox {
            name: name.to_string(),
            tier,
            pity: 10,
            compensation: CompensationDrop {
                name: name.to_string(),
                amount: 1,
            },
            slots: vec![
                LootSlot {
                    slot_no: 1,
                    rate: 1.0,
                    special: SlotSpecial::None,
                    groups: vec![LootGroup {
                        alias: "Filler".to_string(),
                        rate: 1.0,
                        items: vec![LootItem {
                            name: "Credits".to_string(),
                            amount: 100,
                            rate: 1.0,
                        }],
                    }],
                },
                LootSlot {
                    slot_no: 2,
                    rate: 0.05,
                    special: SlotSpecial::Tank,
                    groups: vec![LootGroup {
                        alias: "Vehicles".to_string(),
                        rate: 1.0,
                        items: vec![
                            LootItem {
                                name: "Alpha".to_string(),
                                amount: 1,
                                rate: 0.6,
                            },
                            LootItem {
                                name: "Beta".to_string(),
                                amount: 1,
                                rate: 0.4,
                            },
                        ],
                    }],
                },
            ],
        }
    }

    fn valid_table() -> LootTable {
        LootTable::new(vec![
            valid_box("Standard Crate", Tier::One),
            valid_box("Premium Crate", Tier::Two),
            valid_box("Legendary Crate", Tier::Three),
        ])
    }

    #[test]
    fn well_formed_table_passes() {
        let report = validate_loot_table(&valid_table());
        assert!(!report.has_errors(), "unexpected errors:\n{report}");
    }

    #[test]
    fn missing_tier_is_reported() {
        let table = LootTable::new(vec![valid_box("Standard Crate", Tier::One)]);
        assert!(validate_loot_table(&table).has_errors());
    }

    #[test]
    fn group_rate_sum_must_be_one() {
        let mut table = valid_table();
        table.boxes[0].slots[0].groups[0].rate = 0.9;
        let report = validate_loot_table(&table);
        assert!(report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.message.contains("group rates sum")));
    }

    #[test]
    fn item_rate_sum_must_be_one() {
        let mut table = valid_table();
        table.boxes[1].slots[1].groups[0].items[0].rate = 0.5;
        assert!(validate_loot_table(&table).has_errors());
    }

    #[test]
    fn two_tank_slots_rejected() {
        let mut table = valid_table();
        table.boxes[0].slots[0].special = SlotSpecial::Tank;
        assert!(validate_loot_table(&table).has_errors());
    }

    #[test]
    fn compensation_must_name_a_box() {
        let mut table = valid_table();
        table.boxes[2].compensation.name = "Void Crate".to_string();
        let report = validate_loot_table(&table);
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.message.contains("does not name a box")));
    }

    #[test]
    fn sparse_slot_numbers_rejected() {
        let mut table = valid_table();
        table.boxes[0].slots[1].slot_no = 5;
        assert!(validate_loot_table(&table).has_errors());
    }

    #[test]
    fn box_without_guaranteed_slot_warns_but_passes() {
        let mut table = valid_table();
        table.boxes[0].slots[0].rate = 0.5;
        let report = validate_loot_table(&table);
        assert!(!report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Warning));
    }
}
