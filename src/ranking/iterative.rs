//! Iterative strength-weighted win-rate ranker
//!
//! Each pass reweights every win by the opponent's rank from the previous
//! pass, so beating strong competitors counts for more than beating weak
//! ones. The ranking is seeded with the plain win rate and iterated until no
//! competitor moves by `tolerance` or more.

use crate::config::RankingConfig;
use crate::ranking::engine::RankingAlgorithm;
use crate::ranking::normalize::normalize;
use crate::ranking::parser::initial_win_rates;
use crate::types::{Algorithm, ParsedMatrix, RankingOutcome};
use crate::utils::scores_converged;
use tracing::debug;

/// Strength-weighted win-rate ranker ("default" algorithm)
#[derive(Debug, Clone)]
pub struct IterativeRanker {
    config: RankingConfig,
}

impl IterativeRanker {
    /// Create a new iterative ranker
    pub fn new(config: RankingConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    /// One reweighting pass over the matrix, normalized
    pub fn update(&self, parsed: &ParsedMatrix, previous: &[f64]) -> Vec<f64> {
        let raw: Vec<f64> = parsed
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut weighted_wins = 0.0;
                let mut weight_total = 0.0;

                for (j, record) in row.iter().enumerate().take(previous.len()) {
                    if i == j {
                        continue;
                    }
                    let weight = previous[j].powf(self.config.scaling_factor);
                    weighted_wins += f64::from(record.wins) * weight;
                    weight_total += record.total() as f64 * weight;
                }

                if weight_total > 0.0 {
                    weighted_wins / weight_total
                } else {
                    0.0
                }
            })
            .collect();

        normalize(&raw)
    }
}

impl Default for IterativeRanker {
    fn default() -> Self {
        Self {
            config: RankingConfig::default(),
        }
    }
}

impl RankingAlgorithm for IterativeRanker {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Default
    }

    fn rank(&self, parsed: &ParsedMatrix) -> RankingOutcome {
        if parsed.is_empty() {
            return RankingOutcome::empty();
        }

        let mut ranks = normalize(&initial_win_rates(parsed));

        for iteration in 1..=self.config.max_iters {
            let next = self.update(parsed, &ranks);
            let converged = scores_converged(&ranks, &next, self.config.tolerance);
            ranks = next;

            if converged {
                debug!(
                    "Iterative ranking converged after {} passes for {} competitors",
                    iteration,
                    parsed.len()
                );
                return RankingOutcome {
                    scores: ranks,
                    iterations: iteration,
                    converged: true,
                };
            }
        }

        debug!(
            "Iterative ranking stopped at max_iters={} without converging",
            self.config.max_iters
        );
        RankingOutcome {
            scores: ranks,
            iterations: self.config.max_iters,
            converged: false,
        }
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.algorithm().as_str(),
            "max_iters": self.config.max_iters,
            "tolerance": self.config.tolerance,
            "scaling_factor": self.config.scaling_factor,
        })
    }
}
