//! Weighted sampling over explicit probability weights.
//!
//! Preconditions are checked before drawing: every weight must be finite and
//! non-negative and the sum strictly positive. A violation is returned as
//! [InvalidDistribution] with the offending vector, instead of crashing mid
//! draw, so the engine can surface which tier/slot holds the corrupt data.

use crate::sim::rng::Rng;

/// A weighted draw was requested over a degenerate probability vector.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidDistribution {
    pub weights: Vec<f64>,
    pub sum: f64,
}

impl InvalidDistribution {
    fn new(weights: &[f64]) -> Self {
        Self {
            weights: weights.to_vec(),
            sum: weights.iter().sum(),
        }
    }
}

/// Select an index with probability `weights[i] / sum(weights)`.
pub fn weighted_index(weights: &[f64], rng: &mut Rng) -> Result<usize, InvalidDistribution> {
    let mut sum = 0.0;
    for &weight in weights {
        if !weight.is_finite() || weight < 0.0 {
            return Err(InvalidDistribution::new(weights));
        }
        sum += weight;
    }
    if sum <= 0.0 {
        return Err(InvalidDistribution::new(weights));
    }

    let mut threshold = rng.next_f64() * sum;
    let mut last_positive = 0;
    for (index, &weight) in weights.iter().enumerate() {
        if weight > 0.0 {
            last_positive = index;
            if threshold < weight {
                return Ok(index);
            }
            threshold -= weight;
        }
    }
    // Rounding in the cumulative scan can leave a sliver past the final
    // weight; it belongs to the last selectable index.
    Ok(last_positive)
}

/// Binary form of [weighted_index]: does a slot with trigger rate `rate` hit?
/// Equivalent to drawing from the two-outcome distribution {rate, 1 - rate}.
pub fn hits(rate: f64, rng: &mut Rng) -> Result<bool, InvalidDistribution> {
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        return Err(InvalidDistribution::new(&[rate, 1.0 - rate]));
    }
    Ok(rng.next_f64() < rate)
}
