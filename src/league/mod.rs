//! League table collaborators around the ranking engine
//!
//! Validation of submitted head-to-head tables, per-competitor statistics
//! and the CSV export that joins scores with competitor names.

pub mod export;
pub mod stats;
pub mod validation;

// Re-export commonly used types
pub use export::{export_csv, ranked_rows, ExportRow, EXPORT_FILENAME};
pub use stats::{competitor_stats, CompetitorStats};
pub use validation::{validate_head_to_head, LeagueRow};
