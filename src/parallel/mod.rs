pub mod batch;
pub mod pool;

pub use batch::{batch_ranges, run_batch, run_batch_parallel, BatchSummary};
pub use pool::WorkerPool;
