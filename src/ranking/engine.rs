//! Ranking facade and algorithm trait
//!
//! The boundary layer only talks to [`RankingEngine`]: it checks the matrix
//! shape, parses the cells once and dispatches to the selected ranker.

use crate::config::RankingConfig;
use crate::error::RankingError;
use crate::ranking::elo::EloRanker;
use crate::ranking::iterative::IterativeRanker;
use crate::ranking::parser::parse_matrix;
use crate::types::{Algorithm, Cell, ParsedMatrix, RankingOutcome, ScoreVector};
use tracing::debug;

/// Trait for turning a parsed record matrix into normalized scores
pub trait RankingAlgorithm: Send + Sync {
    /// Selector this ranker answers to
    fn algorithm(&self) -> Algorithm;

    /// Rank every competitor of the parsed matrix
    ///
    /// Total over its input: an empty matrix yields an empty outcome and
    /// degenerate records resolve to the 0.5 midpoint.
    fn rank(&self, parsed: &ParsedMatrix) -> RankingOutcome;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Entry point selecting a ranking algorithm by name
#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    iterative: IterativeRanker,
    elo: EloRanker,
}

impl RankingEngine {
    /// Create an engine whose rankers share `config`
    pub fn new(config: RankingConfig) -> crate::error::Result<Self> {
        Ok(Self {
            iterative: IterativeRanker::new(config.clone())?,
            elo: EloRanker::new(config)?,
        })
    }

    /// Ranker registered for `algorithm`
    pub fn ranker(&self, algorithm: Algorithm) -> &dyn RankingAlgorithm {
        match algorithm {
            Algorithm::Default => &self.iterative,
            Algorithm::Elo => &self.elo,
        }
    }

    /// Rank `matrix` with the algorithm named `algorithm` (`"default"` or `"elo"`)
    pub fn compute(&self, matrix: &[Vec<Cell>], algorithm: &str) -> crate::error::Result<ScoreVector> {
        Ok(self.compute_detailed(matrix, algorithm)?.scores)
    }

    /// Like [`compute`](Self::compute) but also reports iteration count and convergence
    pub fn compute_detailed(
        &self,
        matrix: &[Vec<Cell>],
        algorithm: &str,
    ) -> crate::error::Result<RankingOutcome> {
        let algorithm: Algorithm = algorithm.parse()?;
        self.compute_with(matrix, algorithm)
    }

    /// Rank `matrix` with an already-selected algorithm
    pub fn compute_with(
        &self,
        matrix: &[Vec<Cell>],
        algorithm: Algorithm,
    ) -> crate::error::Result<RankingOutcome> {
        check_shape(matrix)?;

        let parsed = parse_matrix(matrix);
        let outcome = self.ranker(algorithm).rank(&parsed);

        debug!(
            "Ranked {} competitors with '{}' in {} passes",
            matrix.len(),
            algorithm,
            outcome.iterations
        );
        Ok(outcome)
    }

    /// Configuration of every registered ranker
    pub fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "default": self.iterative.config(),
            "elo": self.elo.config(),
        })
    }
}

/// Reject empty and non-square matrices.
///
/// Jagged rows are refused here instead of being tolerated by the rankers;
/// reciprocal-score symmetry is left to the league validator.
pub fn check_shape(matrix: &[Vec<Cell>]) -> crate::error::Result<()> {
    if matrix.is_empty() {
        return Err(RankingError::EmptyMatrix.into());
    }

    let expected = matrix.len();
    if let Some((row, cells)) = matrix
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() != expected)
    {
        return Err(RankingError::NonSquareMatrix {
            row,
            expected,
            found: cells.len(),
        }
        .into());
    }

    Ok(())
}

/// Rank `matrix` with default engine settings
pub fn compute(matrix: &[Vec<Cell>], algorithm: &str) -> crate::error::Result<ScoreVector> {
    RankingEngine::default().compute(matrix, algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_matrix(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| Cell::from(*cell)).collect())
            .collect()
    }

    fn scenario_a() -> Vec<Vec<Cell>> {
        text_matrix(&[
            &["0--0", "2--1", "3--0"],
            &["1--2", "0--0", "1--1"],
            &["0--3", "1--1", "0--0"],
        ])
    }

    #[test]
    fn test_dispatch_by_name() {
        let engine = RankingEngine::default();
        assert_eq!(engine.ranker(Algorithm::Default).algorithm(), Algorithm::Default);
        assert_eq!(engine.ranker(Algorithm::Elo).algorithm(), Algorithm::Elo);

        let elo = engine.compute(&scenario_a(), "elo").unwrap();
        let default = engine.compute(&scenario_a(), "default").unwrap();
        assert_eq!(elo.len(), 3);
        assert_eq!(default.len(), 3);
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = RankingEngine::default()
            .compute(&scenario_a(), "bogus")
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<RankingError>(),
            Some(&RankingError::InvalidAlgorithm {
                name: "bogus".to_string()
            })
        );
    }

    #[test]
    fn test_shape_errors() {
        let engine = RankingEngine::default();

        let err = engine.compute(&[], "default").unwrap_err();
        assert_eq!(err.downcast_ref::<RankingError>(), Some(&RankingError::EmptyMatrix));

        let ragged = text_matrix(&[&["0 -- 0", "1 -- 0"], &["0 -- 1"]]);
        let err = engine.compute(&ragged, "elo").unwrap_err();
        assert_eq!(
            err.downcast_ref::<RankingError>(),
            Some(&RankingError::NonSquareMatrix {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_algorithm_checked_before_shape() {
        let err = RankingEngine::default().compute(&[], "bogus").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RankingError>(),
            Some(RankingError::InvalidAlgorithm { .. })
        ));
    }

    #[test]
    fn test_single_competitor() {
        let scores = compute(&text_matrix(&[&["0 -- 0"]]), "elo").unwrap();
        assert_eq!(scores, vec![0.5]);
    }

    #[test]
    fn test_engine_config() {
        let config = RankingEngine::default().config();
        assert_eq!(config["default"]["max_iters"], 100);
        assert_eq!(config["elo"]["k_factor"], 32.0);
    }
}
