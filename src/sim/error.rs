//! Simulation errors. Every variant indicates a corrupted or mismatched loot
//! table, never a transient condition, so nothing here is retried.

use std::fmt;

use crate::sim::sampler::InvalidDistribution;
use crate::table::model::Tier;

/// Which draw of a slot produced a degenerate probability vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStage {
    SlotRate,
    Group,
    Item,
}

impl DrawStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlotRate => "slot rate",
            Self::Group => "group",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for DrawStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// No box definition for the tier.
    UnknownTier(Tier),
    /// A box-typed or compensation drop could not be resolved to a box.
    UnknownBox { name: String },
    /// Pool mutation asked to remove an item the tank pool does not contain.
    UnknownItem { tier: Tier, name: String },
    /// Pool mutation on a tier whose tank slot is gone or malformed.
    MissingTankSlot(Tier),
    /// A weighted draw over a non-positive-sum or negative-weight vector.
    /// Carries the full vector for root-cause diagnosis.
    InvalidDistribution {
        tier: Tier,
        slot_no: u32,
        stage: DrawStage,
        weights: Vec<f64>,
        sum: f64,
    },
}

impl SimError {
    pub fn distribution(tier: Tier, slot_no: u32, stage: DrawStage, err: InvalidDistribution) -> Self {
        Self::InvalidDistribution {
            tier,
            slot_no,
            stage,
            weights: err.weights,
            sum: err.sum,
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTier(tier) => write!(f, "no box defined for tier {tier}"),
            Self::UnknownBox { name } => {
                write!(f, "'{name}' does not name a box in the loot table")
            }
            Self::UnknownItem { tier, name } => {
                write!(f, "tier {tier} tank pool contains no item named '{name}'")
            }
            Self::MissingTankSlot(tier) => {
                write!(f, "tier {tier} has no tank slot left to mutate")
            }
            Self::InvalidDistribution {
                tier,
                slot_no,
                stage,
                weights,
                sum,
            } => write!(
                f,
                "invalid {stage} distribution at tier {tier} slot {slot_no}: weights {weights:?} sum to {sum}"
            ),
        }
    }
}

impl std::error::Error for SimError {}
