//! Batch runs of the completion-mode driver with min/max/sum aggregation.
//!
//! Runs are embarrassingly parallel: each one owns a cloned table and a seed
//! derived from the base seed plus its run index, so the parallel result is
//! identical to the sequential one no matter how the runs are sharded.

use std::ops::Range;

use rayon::prelude::*;
use serde::Serialize;

use crate::parallel::pool::WorkerPool;
use crate::sim::driver::{open_until, CompletionTarget};
use crate::sim::error::SimError;
use crate::table::model::LootTable;

/// How many shards to cut per worker thread. More shards than threads keeps
/// cores busy when run lengths vary widely (pity makes them vary a lot).
const SHARDS_PER_WORKER: usize = 4;

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use pandora::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Reduction of purchase counts across a batch of completion-mode runs.
/// [merge](BatchSummary::merge) is commutative and associative with
/// [EMPTY](BatchSummary::EMPTY) as identity, so partial summaries from any
/// sharding merge to the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub runs: u64,
    pub min: u64,
    pub max: u64,
    pub sum: u64,
}

impl BatchSummary {
    pub const EMPTY: BatchSummary = BatchSummary {
        runs: 0,
        min: u64::MAX,
        max: 0,
        sum: 0,
    };

    pub fn of_run(purchased: u64) -> Self {
        Self {
            runs: 1,
            min: purchased,
            max: purchased,
            sum: purchased,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            runs: self.runs + other.runs,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            sum: self.sum + other.sum,
        }
    }

    pub fn average(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.sum as f64 / self.runs as f64
        }
    }
}

fn run_batch_range(
    table: &LootTable,
    target: CompletionTarget,
    runs: Range<u64>,
    base_seed: u64,
) -> Result<BatchSummary, SimError> {
    let mut summary = BatchSummary::EMPTY;
    for run in runs {
        let purchased = open_until(table, target, base_seed.wrapping_add(run))?;
        summary = summary.merge(BatchSummary::of_run(purchased));
    }
    Ok(summary)
}

/// Run `iterations` independent completion-mode simulations sequentially.
/// The first failing run aborts the batch; a corrupted table invalidates
/// every run built from it.
pub fn run_batch(
    table: &LootTable,
    target: CompletionTarget,
    iterations: usize,
    base_seed: u64,
) -> Result<BatchSummary, SimError> {
    run_batch_range(table, target, 0..iterations as u64, base_seed)
}

/// Like [run_batch] but sharded across the worker pool. Per-run seeds depend
/// only on the run index, so this returns exactly the sequential summary.
pub fn run_batch_parallel(
    table: &LootTable,
    target: CompletionTarget,
    iterations: usize,
    base_seed: u64,
    pool: &WorkerPool,
) -> Result<BatchSummary, SimError> {
    pool.install(|| {
        let shards = batch_ranges(iterations, rayon::current_num_threads() * SHARDS_PER_WORKER);
        shards
            .par_iter()
            .map(|&(start, end)| {
                run_batch_range(table, target, start as u64..end as u64, base_seed)
            })
            .try_reduce(|| BatchSummary::EMPTY, |a, b| Ok(a.merge(b)))
    })
}
