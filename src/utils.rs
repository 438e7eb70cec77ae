//! Utility functions for the ranking service

use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two scores
pub fn score_difference(score1: f64, score2: f64) -> f64 {
    (score1 - score2).abs()
}

/// Check whether every competitor moved strictly less than `tolerance`
/// between two passes. Vectors of different length never count as converged.
pub fn scores_converged(previous: &[f64], current: &[f64], tolerance: f64) -> bool {
    previous.len() == current.len()
        && previous
            .iter()
            .zip(current)
            .all(|(a, b)| score_difference(*a, *b) < tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_difference() {
        assert_eq!(score_difference(1500.0, 1400.0), 100.0);
        assert_eq!(score_difference(1400.0, 1500.0), 100.0);
        assert_eq!(score_difference(0.5, 0.5), 0.0);
    }

    #[test]
    fn test_scores_converged() {
        assert!(scores_converged(&[0.0, 1.0], &[0.0005, 0.9995], 0.001));
        assert!(!scores_converged(&[0.0, 1.0], &[0.002, 1.0], 0.001));
        // Strict comparison: a change equal to the tolerance is not converged
        assert!(!scores_converged(&[0.0], &[0.5], 0.5));
        assert!(scores_converged(&[], &[], 0.001));
        assert!(!scores_converged(&[0.0], &[], 0.001));
    }
}
