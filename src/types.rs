//! Common types used throughout the ranking service

use crate::error::RankingError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One cell of a record matrix as received from the caller
///
/// Cells normally carry the textual `"wins -- losses"` encoding. Anything that
/// is not a string (numbers, nulls, nested values) is kept as-is and parses to
/// an empty record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Other(serde_json::Value),
}

impl Cell {
    /// Textual content of the cell, if it is a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            Cell::Other(_) => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

/// N×N head-to-head table; cell (i, j) holds i's record against j
pub type RecordMatrix = Vec<Vec<Cell>>;

/// Normalized ranking scores, index-aligned to the matrix rows
pub type ScoreVector = Vec<f64>;

/// Parsed head-to-head record of one competitor against another
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeadToHead {
    pub wins: u32,
    pub losses: u32,
}

impl HeadToHead {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self { wins, losses }
    }

    /// Total matches recorded in this cell
    pub fn total(&self) -> u64 {
        u64::from(self.wins) + u64::from(self.losses)
    }
}

/// Record matrix after cell parsing
pub type ParsedMatrix = Vec<Vec<HeadToHead>>;

/// Ranking algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Iterative strength-weighted win rate
    Default,
    /// Sequential Elo replay
    Elo,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Default, Algorithm::Elo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Default => "default",
            Algorithm::Elo => "elo",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Algorithm::Default),
            "elo" => Ok(Algorithm::Elo),
            other => Err(RankingError::InvalidAlgorithm {
                name: other.to_string(),
            }),
        }
    }
}

/// Result of running one ranker to convergence (or exhaustion)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingOutcome {
    /// Final normalized scores
    pub scores: ScoreVector,
    /// Update passes executed, never more than the configured maximum
    pub iterations: usize,
    /// Whether the tolerance check passed before the iteration limit
    pub converged: bool,
}

impl RankingOutcome {
    pub fn empty() -> Self {
        Self {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        }
    }
}
