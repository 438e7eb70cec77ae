//! h2h-ranker - Head-to-head league ranking service
//!
//! This crate turns a square matrix of `"W -- L"` match records into
//! normalized strength scores, using either an iterative strength-weighted
//! win rate or a sequential Elo replay. It also validates and exports
//! league tables and talks to an external heatmap generator.

pub mod config;
pub mod error;
pub mod heatmap;
pub mod league;
pub mod metrics;
pub mod ranking;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RankingError, Result};
pub use types::*;

// Re-export key components
pub use ranking::{compute, RankingAlgorithm, RankingEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
