//! Rayon thread pool configuration for batch simulation.
//!
//! Mirrors the original tool's "T worker processes" knob: a fixed worker
//! count when the caller asks for one, Rayon's default (all cores) otherwise.

use rayon::ThreadPoolBuilder;

/// Number of worker threads used for parallel batch execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// If 0, use the global Rayon pool (all CPU cores).
    pub workers: usize,
}

impl WorkerPool {
    /// Use exactly `workers` threads, or the Rayon default when 0.
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    /// Run `f` on a pool with this worker count.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            f()
        } else {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()
                .expect("Rayon thread pool");
            pool.install(f)
        }
    }
}
