//! Tiered, probabilistic lootbox economy simulator.
//!
//! Opening a box draws each of its slots independently; some drops grant
//! further boxes, and each tier's scarce "tank" drop is protected by a pity
//! counter that forces it after enough misses. Obtained tanks leave the pool
//! for good, so repeated purchases eventually collect everything; the
//! completion-mode driver and batch aggregator measure how many purchases
//! that takes on average and at the extremes.

pub mod cli;
pub mod parallel;
pub mod server;
pub mod sim;
pub mod table;
