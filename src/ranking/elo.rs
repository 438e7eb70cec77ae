//! Elo-style sequential ranker
//!
//! Every recorded win and loss is replayed as an individual Elo match. Within
//! a pass the updates are applied in place and in a fixed order, so later
//! matches see the ratings produced by earlier ones:
//!
//! 1. rows in index order, then columns in index order (row-major over the
//!    ordered pairs `(i, j)`, skipping the diagonal);
//! 2. for each pair, all of `i`'s wins against `j` before all of its losses.
//!
//! A different replay order gives different intermediate ratings. Passes are
//! repeated until no rating moves by `tolerance` or more, then the ratings are
//! normalized to [0, 1].

use crate::config::RankingConfig;
use crate::ranking::engine::RankingAlgorithm;
use crate::ranking::normalize::normalize;
use crate::types::{Algorithm, ParsedMatrix, RankingOutcome};
use crate::utils::scores_converged;
use skillratings::elo::{expected_score, EloConfig, EloRating};
use tracing::debug;

/// Sequential Elo replay ranker ("elo" algorithm)
#[derive(Debug, Clone)]
pub struct EloRanker {
    config: RankingConfig,
    elo_config: EloConfig,
}

impl EloRanker {
    /// Create a new Elo ranker
    pub fn new(config: RankingConfig) -> crate::error::Result<Self> {
        config.validate()?;

        let elo_config = EloConfig { k: config.k_factor };
        Ok(Self { config, elo_config })
    }

    /// Rating every competitor starts from
    pub fn initial_rating(&self) -> f64 {
        self.config.initial_rating
    }

    /// Apply one match between `player` and `opponent`.
    ///
    /// `actual` is 1.0 when `player` won and 0.0 when it lost. The opponent
    /// moves by exactly the negated delta.
    pub fn apply_match(&self, ratings: &mut [f64], player: usize, opponent: usize, actual: f64) {
        let (expected, _) = expected_score(
            &EloRating {
                rating: ratings[player],
            },
            &EloRating {
                rating: ratings[opponent],
            },
        );

        let delta = self.elo_config.k * (actual - expected);
        ratings[player] += delta;
        ratings[opponent] -= delta;
    }

    /// Replay every recorded match once, starting from `ratings`
    pub fn replay_pass(&self, parsed: &ParsedMatrix, mut ratings: Vec<f64>) -> Vec<f64> {
        let n = ratings.len();

        for (i, row) in parsed.iter().enumerate().take(n) {
            for (j, record) in row.iter().enumerate().take(n) {
                if i == j {
                    continue;
                }
                for _ in 0..record.wins {
                    self.apply_match(&mut ratings, i, j, 1.0);
                }
                for _ in 0..record.losses {
                    self.apply_match(&mut ratings, i, j, 0.0);
                }
            }
        }

        ratings
    }

    /// Run replay passes until convergence and return the raw ratings
    pub fn ratings(&self, parsed: &ParsedMatrix) -> (Vec<f64>, usize, bool) {
        let mut ratings = vec![self.config.initial_rating; parsed.len()];

        for iteration in 1..=self.config.max_iters {
            let next = self.replay_pass(parsed, ratings.clone());
            let converged = scores_converged(&ratings, &next, self.config.tolerance);
            ratings = next;

            if converged {
                return (ratings, iteration, true);
            }
        }

        (ratings, self.config.max_iters, false)
    }
}

impl Default for EloRanker {
    fn default() -> Self {
        let config = RankingConfig::default();
        Self {
            elo_config: EloConfig { k: config.k_factor },
            config,
        }
    }
}

impl RankingAlgorithm for EloRanker {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Elo
    }

    fn rank(&self, parsed: &ParsedMatrix) -> RankingOutcome {
        if parsed.is_empty() {
            return RankingOutcome::empty();
        }

        let (ratings, iterations, converged) = self.ratings(parsed);
        debug!(
            "Elo ranking finished after {} passes (converged: {}) for {} competitors",
            iterations,
            converged,
            parsed.len()
        );

        RankingOutcome {
            scores: normalize(&ratings),
            iterations,
            converged,
        }
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.algorithm().as_str(),
            "max_iters": self.config.max_iters,
            "tolerance": self.config.tolerance,
            "initial_rating": self.config.initial_rating,
            "k_factor": self.elo_config.k,
        })
    }
}
