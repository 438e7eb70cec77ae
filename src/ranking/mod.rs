//! Ranking engine for head-to-head record matrices
//!
//! This module turns a square matrix of win/loss records into a normalized
//! score per competitor. Two interchangeable algorithms are provided: an
//! iterative strength-weighted win rate and a sequential Elo replay.

pub mod elo;
pub mod engine;
pub mod iterative;
pub mod normalize;
pub mod parser;

// Re-export commonly used types
pub use elo::EloRanker;
pub use engine::{check_shape, compute, RankingAlgorithm, RankingEngine};
pub use iterative::IterativeRanker;
pub use normalize::normalize;
pub use parser::{initial_win_rates, parse_cell, parse_matrix, CELL_SEPARATOR};
