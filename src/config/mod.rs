//! Configuration management for the ranking service
//!
//! This module handles all configuration loading from environment variables
//! and TOML files, validation, and default values.

pub mod app;
pub mod ranking;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, HeatmapSettings, ServiceSettings};
pub use ranking::RankingConfig;
