//! Ranking engine configuration

use crate::error::RankingError;
use serde::{Deserialize, Serialize};

/// Tunables shared by both ranking algorithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Maximum number of update passes before giving up on convergence
    pub max_iters: usize,
    /// Per-competitor change below which a ranking counts as stable
    pub tolerance: f64,
    /// Exponent applied to an opponent's prior rank (iterative ranker)
    pub scaling_factor: f64,
    /// Rating every competitor starts from (Elo ranker)
    pub initial_rating: f64,
    /// Maximum per-match rating adjustment (Elo ranker)
    pub k_factor: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            tolerance: 0.001,
            scaling_factor: 1.0,
            initial_rating: 1500.0,
            k_factor: 32.0,
        }
    }
}

impl RankingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(RankingError::ConfigurationError {
                message: "Tolerance must be a positive finite number".to_string(),
            }
            .into());
        }

        // Ranks of 0.0 raised to a negative power would poison the weights
        if !(self.scaling_factor >= 0.0) || !self.scaling_factor.is_finite() {
            return Err(RankingError::ConfigurationError {
                message: "Scaling factor must be a non-negative finite number".to_string(),
            }
            .into());
        }

        if !self.initial_rating.is_finite() {
            return Err(RankingError::ConfigurationError {
                message: "Initial rating must be finite".to_string(),
            }
            .into());
        }

        if !(self.k_factor > 0.0) || !self.k_factor.is_finite() {
            return Err(RankingError::ConfigurationError {
                message: "K-factor must be a positive finite number".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
