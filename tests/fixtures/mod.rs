//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use h2h_ranker::heatmap::HeatmapClient;
use h2h_ranker::types::Cell;
use mockall::mock;

// Heatmap generator double
mock! {
    pub Heatmap {}

    #[async_trait]
    impl HeatmapClient for Heatmap {
        async fn upload_csv(&self, filename: &str, contents: &[u8]) -> h2h_ranker::Result<()>;
        async fn request_heatmap(&self, filename: &str, colors: &str) -> h2h_ranker::Result<Vec<u8>>;
    }
}

/// Build a record matrix from string cells
pub fn matrix(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| Cell::from(*cell)).collect())
        .collect()
}

/// Three competitors where the first dominates and the last trails
pub fn three_way_league() -> Vec<Vec<Cell>> {
    matrix(&[
        &["0--0", "2--1", "3--0"],
        &["1--2", "0--0", "1--1"],
        &["0--3", "1--1", "0--0"],
    ])
}

/// `n` competitors without any recorded matches
pub fn all_zero(n: usize) -> Vec<Vec<Cell>> {
    (0..n)
        .map(|_| (0..n).map(|_| Cell::from("0 -- 0")).collect())
        .collect()
}

/// Strict ladder: competitor `i` beat every `j > i` once
pub fn ladder(n: usize) -> Vec<Vec<Cell>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    let cell = if i == j {
                        "0 -- 0"
                    } else if i < j {
                        "1 -- 0"
                    } else {
                        "0 -- 1"
                    };
                    Cell::from(cell)
                })
                .collect()
        })
        .collect()
}

/// Deterministic pseudo-random reciprocal league
pub fn round_robin(n: usize, seed: u64) -> Vec<Vec<Cell>> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) % 6
    };

    let mut records = vec![vec![(0u64, 0u64); n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let (wins, losses) = (next(), next());
            records[i][j] = (wins, losses);
            records[j][i] = (losses, wins);
        }
    }

    records
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(wins, losses)| Cell::from(format!("{} -- {}", wins, losses)))
                .collect()
        })
        .collect()
}
