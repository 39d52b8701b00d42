//! Load a loot table from JSON. Validation runs on load and any error-level
//! diagnostic fails the load; the engine never sees a malformed table.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::table::model::LootTable;
use crate::table::validate::{validate_loot_table, ValidationReport};

pub const DEFAULT_LOOT_TABLE_PATH: &str = "data/loot_table.json";

#[derive(Debug)]
pub enum TableError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    Invalid(ValidationReport),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read loot table: {err}"),
            Self::Parse(err) => write!(f, "failed to parse loot table JSON: {err}"),
            Self::Invalid(report) => {
                let errors = report
                    .diagnostics
                    .iter()
                    .filter(|diag| diag.severity == crate::table::validate::ValidationSeverity::Error)
                    .count();
                write!(f, "loot table failed validation with {errors} error(s):\n{report}")
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Parse and validate a loot table from a JSON string.
pub fn parse_loot_table(data: &str) -> Result<LootTable, TableError> {
    let mut table: LootTable = serde_json::from_str(data).map_err(TableError::Parse)?;
    table.rebuild_index();
    let report = validate_loot_table(&table);
    if report.has_errors() {
        return Err(TableError::Invalid(report));
    }
    Ok(table)
}

/// Load and validate the loot table at `path`.
pub fn load_loot_table(path: impl AsRef<Path>) -> Result<LootTable, TableError> {
    let data = fs::read_to_string(path).map_err(TableError::Read)?;
    parse_loot_table(&data)
}
