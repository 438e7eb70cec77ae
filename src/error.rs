//! Error types for the ranking service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Degenerate numeric input (malformed cells, competitors
//! without matches, all-equal scores) is resolved inside the engine and never shows up here.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ranking scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    #[error("Invalid algorithm type '{name}'. Choose \"default\" or \"elo\".")]
    InvalidAlgorithm { name: String },

    #[error("Record matrix is empty")]
    EmptyMatrix,

    #[error("Record matrix is not square: row {row} has {found} cells, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Ranking did not finish within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Export input mismatch: {reason}")]
    ExportMismatch { reason: String },

    #[error("Invalid file name '{filename}'")]
    InvalidFileName { filename: String },

    #[error("Heatmap transfer failed: {message}")]
    Transfer { message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl RankingError {
    /// Whether the error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RankingError::InvalidAlgorithm { .. }
                | RankingError::EmptyMatrix
                | RankingError::NonSquareMatrix { .. }
                | RankingError::ExportMismatch { .. }
                | RankingError::InvalidFileName { .. }
        )
    }
}
