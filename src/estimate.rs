//! π estimate and its error metric.
//!
//! # Governing Equations
//!
//! ```text
//! Estimator:      π̂ = 4 · inside / n
//! Percent error:  e = |π̂ - π| / π · 100
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PiError, PiResult};
use crate::sampler::SampleBatch;

/// True value of π used for every error computation.
pub const PI_TRUE: f64 = std::f64::consts::PI;

/// Compute `4 · inside / n`.
///
/// # Errors
///
/// Returns `InvalidArgument` if `n == 0` or `inside > n`.
pub fn pi_estimate(inside_count: u64, n_points: u64) -> PiResult<f64> {
    if n_points == 0 {
        return Err(PiError::invalid_argument(
            "n_points",
            n_points,
            "must be at least 1",
        ));
    }
    if inside_count > n_points {
        return Err(PiError::invalid_argument(
            "inside_count",
            inside_count,
            format!("cannot exceed n_points ({n_points})"),
        ));
    }
    Ok(4.0 * inside_count as f64 / n_points as f64)
}

/// Relative deviation of `estimate` from π, as a percentage.
#[must_use]
pub fn error_percent(estimate: f64) -> f64 {
    (estimate - PI_TRUE).abs() / PI_TRUE * 100.0
}

/// One row of the convergence ledger.
///
/// Serialized field names match the ledger's columnar layout:
/// `N_points`, `pi_est`, `error`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    /// Number of points the estimate was computed from.
    #[serde(rename = "N_points")]
    pub n_points: u64,
    /// The π estimate, in [0, 4].
    #[serde(rename = "pi_est")]
    pub pi_estimate: f64,
    /// Percent error against π, non-negative.
    #[serde(rename = "error")]
    pub error_percent: f64,
}

impl EstimateRecord {
    /// Build a record from already-computed values.
    #[must_use]
    pub const fn new(n_points: u64, pi_estimate: f64, error_percent: f64) -> Self {
        Self {
            n_points,
            pi_estimate,
            error_percent,
        }
    }

    /// Derive a record from raw counts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the counts are inconsistent.
    pub fn from_counts(inside_count: u64, n_points: u64) -> PiResult<Self> {
        let estimate = pi_estimate(inside_count, n_points)?;
        Ok(Self::new(n_points, estimate, error_percent(estimate)))
    }

    /// Derive a record from a sample batch.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the batch is empty.
    pub fn from_batch(batch: &SampleBatch) -> PiResult<Self> {
        Self::from_counts(batch.inside_count(), batch.len() as u64)
    }

    /// Percent error rounded to three decimals, for display.
    #[must_use]
    pub fn display_error(&self) -> f64 {
        (self.error_percent * 1000.0).round() / 1000.0
    }

    /// Whether the record satisfies the value-range invariants.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.n_points >= 1
            && (0.0..=4.0).contains(&self.pi_estimate)
            && self.error_percent.is_finite()
            && self.error_percent >= 0.0
    }
}
