//! Main application configuration
//!
//! This module defines the primary configuration structures for the ranking
//! service, including environment variable and TOML file loading and validation.

use crate::config::ranking::RankingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub ranking: RankingConfig,
    pub heatmap: HeatmapSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Host the HTTP server binds to
    pub http_host: String,
    /// Port for the HTTP API
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// Maximum in-flight HTTP requests
    pub max_concurrent_requests: usize,
    /// Wall-clock budget for a single ranking computation
    pub request_timeout_ms: u64,
}

/// Heatmap transfer service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    /// Host running the heatmap upload and generator servers
    pub host: String,
    /// Port accepting CSV uploads
    pub upload_port: u16,
    /// Port answering heatmap requests
    pub request_port: u16,
    /// Connect and IO timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "h2h-ranker".to_string(),
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 5050,
            shutdown_timeout_seconds: 30,
            max_concurrent_requests: 256,
            request_timeout_ms: 10_000,
        }
    }
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            upload_port: 5555,
            request_port: 5556,
            timeout_seconds: 30,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            self.service.http_port = parse_var("HTTP_PORT", &port)?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds =
                parse_var("SHUTDOWN_TIMEOUT_SECONDS", &timeout)?;
        }
        if let Ok(max) = env::var("MAX_CONCURRENT_REQUESTS") {
            self.service.max_concurrent_requests = parse_var("MAX_CONCURRENT_REQUESTS", &max)?;
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_MS") {
            self.service.request_timeout_ms = parse_var("REQUEST_TIMEOUT_MS", &timeout)?;
        }

        // Ranking settings
        if let Ok(iters) = env::var("RANK_MAX_ITERS") {
            self.ranking.max_iters = parse_var("RANK_MAX_ITERS", &iters)?;
        }
        if let Ok(tolerance) = env::var("RANK_TOLERANCE") {
            self.ranking.tolerance = parse_var("RANK_TOLERANCE", &tolerance)?;
        }
        if let Ok(factor) = env::var("RANK_SCALING_FACTOR") {
            self.ranking.scaling_factor = parse_var("RANK_SCALING_FACTOR", &factor)?;
        }
        if let Ok(rating) = env::var("ELO_INITIAL_RATING") {
            self.ranking.initial_rating = parse_var("ELO_INITIAL_RATING", &rating)?;
        }
        if let Ok(k) = env::var("ELO_K_FACTOR") {
            self.ranking.k_factor = parse_var("ELO_K_FACTOR", &k)?;
        }

        // Heatmap settings
        if let Ok(host) = env::var("HEATMAP_HOST") {
            self.heatmap.host = host;
        }
        if let Ok(port) = env::var("HEATMAP_UPLOAD_PORT") {
            self.heatmap.upload_port = parse_var("HEATMAP_UPLOAD_PORT", &port)?;
        }
        if let Ok(port) = env::var("HEATMAP_REQUEST_PORT") {
            self.heatmap.request_port = parse_var("HEATMAP_REQUEST_PORT", &port)?;
        }
        if let Ok(timeout) = env::var("HEATMAP_TIMEOUT_SECONDS") {
            self.heatmap.timeout_seconds = parse_var("HEATMAP_TIMEOUT_SECONDS", &timeout)?;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get ranking request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.service.request_timeout_ms)
    }

    /// Get heatmap transfer timeout as Duration
    pub fn heatmap_timeout(&self) -> Duration {
        Duration::from_secs(self.heatmap.timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.heatmap.upload_port == 0 || config.heatmap.request_port == 0 {
        return Err(anyhow!("Heatmap ports cannot be 0"));
    }
    if config.heatmap.host.is_empty() {
        return Err(anyhow!("Heatmap host cannot be empty"));
    }

    // Validate timeouts and limits
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.service.request_timeout_ms == 0 {
        return Err(anyhow!("Request timeout must be greater than 0"));
    }
    if config.service.max_concurrent_requests == 0 {
        return Err(anyhow!("Max concurrent requests must be greater than 0"));
    }
    if config.heatmap.timeout_seconds == 0 {
        return Err(anyhow!("Heatmap timeout must be greater than 0"));
    }

    config.ranking.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.http_port, 5050);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.service.http_port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.service.max_concurrent_requests = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.ranking.tolerance = -1.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!(
            "h2h-ranker-config-{}.toml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[service]\nhttp_port = 6060\n\n[ranking]\nmax_iters = 25\nk_factor = 16.0\n"
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.service.http_port, 6060);
        assert_eq!(config.service.name, "h2h-ranker");
        assert_eq!(config.ranking.max_iters, 25);
        assert_eq!(config.ranking.k_factor, 16.0);
        assert_eq!(config.ranking.tolerance, 0.001);
    }

    #[test]
    fn test_from_missing_file() {
        let result = AppConfig::from_file(Path::new("/nonexistent/h2h-ranker.toml"));
        assert!(result.is_err());
    }
}
