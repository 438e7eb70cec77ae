//! Property-based tests for the ranking engine.

use proptest::prelude::*;

use h2h_ranker::config::RankingConfig;
use h2h_ranker::ranking::{normalize, parse_cell};
use h2h_ranker::types::{Algorithm, Cell, HeadToHead};
use h2h_ranker::RankingEngine;

/// Strategy: a square matrix of small win/loss records (1-7 competitors).
fn record_matrix() -> impl Strategy<Value = Vec<Vec<Cell>>> {
    (1usize..=7).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec((0u32..5, 0u32..5), n), n).prop_map(|rows| {
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|(w, l)| Cell::from(format!("{} -- {}", w, l)))
                        .collect()
                })
                .collect()
        })
    })
}

fn algorithm_strategy() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.to_vec())
}

proptest! {
    // 1. Every score lies in [0, 1] and one score per competitor
    #[test]
    fn scores_within_unit_interval(table in record_matrix(), algorithm in algorithm_strategy()) {
        let outcome = RankingEngine::default().compute_with(&table, algorithm).unwrap();
        prop_assert_eq!(outcome.scores.len(), table.len());
        for score in &outcome.scores {
            prop_assert!((0.0..=1.0).contains(score), "score={score} algorithm={algorithm}");
        }
    }

    // 2. Unless all tie, the extremes are exactly 0 and 1
    #[test]
    fn extremes_are_pinned(table in record_matrix(), algorithm in algorithm_strategy()) {
        let scores = RankingEngine::default().compute_with(&table, algorithm).unwrap().scores;
        let max = scores.iter().cloned().fold(f64::MIN, f64::max);
        let min = scores.iter().cloned().fold(f64::MAX, f64::min);
        if max == min {
            prop_assert!(scores.iter().all(|&s| s == 0.5));
        } else {
            prop_assert_eq!(max, 1.0);
            prop_assert_eq!(min, 0.0);
        }
    }

    // 3. Ranking is deterministic
    #[test]
    fn ranking_deterministic(table in record_matrix(), algorithm in algorithm_strategy()) {
        let engine = RankingEngine::default();
        let first = engine.compute_with(&table, algorithm).unwrap();
        let second = engine.compute_with(&table, algorithm).unwrap();
        prop_assert_eq!(first, second);
    }

    // 4. Iterations never exceed the configured limit
    #[test]
    fn iterations_bounded(table in record_matrix(), algorithm in algorithm_strategy(), max_iters in 0usize..20) {
        let engine = RankingEngine::new(RankingConfig { max_iters, ..RankingConfig::default() }).unwrap();
        let outcome = engine.compute_with(&table, algorithm).unwrap();
        prop_assert!(outcome.iterations <= max_iters);
    }

    // 5. Well-formed cells parse back to their counts, whitespace aside
    #[test]
    fn cell_parse_round_trip(wins in 0u32..100_000, losses in 0u32..100_000, pad in 0usize..3) {
        let spaces = " ".repeat(pad);
        let cell = Cell::from(format!("{spaces}{wins}{spaces}--{spaces}{losses}{spaces}"));
        prop_assert_eq!(parse_cell(&cell), HeadToHead::new(wins, losses));
    }

    // 6. Arbitrary text never panics and yields either a record or (0, 0)
    #[test]
    fn cell_parse_total(text in ".{0,16}") {
        let _ = parse_cell(&Cell::from(text));
    }

    // 7. normalize preserves order
    #[test]
    fn normalize_monotone(values in prop::collection::vec(-1000.0f64..1000.0, 1..20)) {
        let normalized = normalize(&values);
        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] < values[j] {
                    prop_assert!(normalized[i] <= normalized[j]);
                }
            }
        }
    }
}
