//! Loot-table model, JSON loader and structural validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_loot_table, parse_loot_table, TableError, DEFAULT_LOOT_TABLE_PATH};
pub use model::{
    CompensationDrop, LootBox, LootGroup, LootItem, LootSlot, LootTable, SlotSpecial, Tier,
    TierMap,
};
pub use validate::{
    validate_loot_table, ValidationDiagnostic, ValidationReport, ValidationSeverity,
    RATE_SUM_TOLERANCE,
};
