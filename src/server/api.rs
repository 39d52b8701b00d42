//! JSON payload handlers for the HTTP API. Each handler is a pure
//! body-string to body-string function so routing and tests stay trivial.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::parallel::{run_batch_parallel, WorkerPool};
use crate::sim::driver::{open_amount, open_until, CompletionTarget};
use crate::sim::error::SimError;
use crate::table::loader::{load_loot_table, TableError, DEFAULT_LOOT_TABLE_PATH};
use crate::table::model::{LootTable, TierMap};

pub const DEFAULT_SEED: u64 = 7;
pub const DEFAULT_BATCH_ITERATIONS: usize = 100;
pub const MAX_BATCH_ITERATIONS: usize = 100_000;
pub const MAX_OPEN_AMOUNT: u64 = 1_000_000;

#[derive(Debug)]
pub enum ApiError {
    /// Request body was not valid JSON for the endpoint.
    Parse(serde_json::Error),
    /// Request was well-formed but semantically invalid.
    Validation(String),
    /// The loot table on disk failed to load or validate.
    Table(TableError),
    /// A run aborted on a corrupted-table condition.
    Simulation(SimError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid request body: {err}"),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::Table(err) => write!(f, "{err}"),
            Self::Simulation(err) => write!(f, "simulation aborted: {err}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenRequest {
    pub amount: u64,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenResponse {
    pub amount: u64,
    pub seed: u64,
    pub opened: TierMap<u64>,
    pub rewards: std::collections::BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UntilRequest {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UntilResponse {
    pub target: String,
    pub seed: u64,
    pub purchased: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub iterations: Option<usize>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub target: String,
    pub iterations: u64,
    pub seed: u64,
    pub min: u64,
    pub max: u64,
    pub average: f64,
}

fn reference_table() -> Result<LootTable, ApiError> {
    load_loot_table(DEFAULT_LOOT_TABLE_PATH).map_err(ApiError::Table)
}

fn parse_target(raw: Option<&str>) -> Result<CompletionTarget, ApiError> {
    match raw {
        None => Ok(CompletionTarget::All),
        Some(raw) => CompletionTarget::parse(raw).ok_or_else(|| {
            ApiError::Validation(format!("unknown target '{raw}', expected all, 1, 2 or 3"))
        }),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Parse)
}

pub fn health_payload() -> String {
    json!({
        "status": "ok",
        "engine": "pandora",
        "version": env!("CARGO_PKG_VERSION"),
    })
    .to_string()
}

pub fn table_payload() -> Result<String, ApiError> {
    to_json(&reference_table()?)
}

pub fn open_payload(body: &str) -> Result<String, ApiError> {
    let request: OpenRequest = serde_json::from_str(body).map_err(ApiError::Parse)?;
    if request.amount == 0 {
        return Err(ApiError::Validation("amount must be at least 1".to_string()));
    }
    if request.amount > MAX_OPEN_AMOUNT {
        return Err(ApiError::Validation(format!(
            "amount {} exceeds the maximum of {MAX_OPEN_AMOUNT}",
            request.amount
        )));
    }

    let table = reference_table()?;
    let seed = request.seed.unwrap_or(DEFAULT_SEED);
    let outcome = open_amount(&table, request.amount, seed).map_err(ApiError::Simulation)?;
    to_json(&OpenResponse {
        amount: request.amount,
        seed,
        opened: outcome.opened,
        rewards: outcome.rewards,
    })
}

pub fn until_payload(body: &str) -> Result<String, ApiError> {
    let request: UntilRequest = serde_json::from_str(body).map_err(ApiError::Parse)?;
    let target = parse_target(request.target.as_deref())?;
    let table = reference_table()?;
    let seed = request.seed.unwrap_or(DEFAULT_SEED);
    let purchased = open_until(&table, target, seed).map_err(ApiError::Simulation)?;
    to_json(&UntilResponse {
        target: target.to_string(),
        seed,
        purchased,
    })
}

pub fn batch_payload(body: &str) -> Result<String, ApiError> {
    let request: BatchRequest = serde_json::from_str(body).map_err(ApiError::Parse)?;
    let target = parse_target(request.target.as_deref())?;
    let iterations = request.iterations.unwrap_or(DEFAULT_BATCH_ITERATIONS);
    if iterations == 0 {
        return Err(ApiError::Validation("iterations must be at least 1".to_string()));
    }
    if iterations > MAX_BATCH_ITERATIONS {
        return Err(ApiError::Validation(format!(
            "iterations {iterations} exceeds the maximum of {MAX_BATCH_ITERATIONS}"
        )));
    }

    let table = reference_table()?;
    let seed = request.seed.unwrap_or(DEFAULT_SEED);
    let pool = WorkerPool::with_workers(request.workers.unwrap_or(0));
    let summary =
        run_batch_parallel(&table, target, iterations, seed, &pool).map_err(ApiError::Simulation)?;
    to_json(&BatchResponse {
        target: target.to_string(),
        iterations: summary.runs,
        seed,
        min: summary.min,
        max: summary.max,
        average: summary.average(),
    })
}
