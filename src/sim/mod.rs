//! Simulation core: RNG, weighted sampling, pity and pool mutation, the
//! box-opening engine, and the fixed-quantity / completion run drivers.

pub mod driver;
pub mod engine;
pub mod error;
pub mod pity;
pub mod rng;
pub mod sampler;

pub use driver::{open_amount, open_until, CompletionTarget, OpeningOutcome};
pub use engine::{open_all_from_tier, open_one, DropRecord, RunState};
pub use error::{DrawStage, SimError};
pub use pity::remove_from_tank_pool;
pub use rng::Rng;
pub use sampler::{hits, weighted_index, InvalidDistribution};
