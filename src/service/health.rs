//! Health check endpoints and monitoring
//!
//! This module provides health check functionality for the ranking
//! service, including readiness and liveness probes.

use crate::service::app::AppState;
use crate::types::{Algorithm, Cell};
use crate::utils::current_timestamp;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Value exported on the health gauge (0=unhealthy, 1=degraded, 2=healthy)
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }

    /// Combine with a component status, keeping the worse of the two
    fn worst(self, other: &HealthStatus) -> HealthStatus {
        if other.as_gauge() < self.as_gauge() {
            other.clone()
        } else {
            self
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if not healthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    pub uptime_seconds: u64,
    pub rankings_served: u64,
    pub rankings_failed: u64,
    pub exports_served: u64,
    /// Where heatmap transfers are sent
    pub heatmap_endpoint: String,
}

impl HealthCheck {
    /// Perform a comprehensive health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        let service_check = Self::check_service_running(&app_state).await;
        if service_check.status != HealthStatus::Healthy {
            overall_status = HealthStatus::Unhealthy;
        }
        checks.push(service_check);

        let engine_check = Self::check_ranking_engine(&app_state);
        overall_status = overall_status.worst(&engine_check.status);
        checks.push(engine_check);

        Ok(HealthCheck {
            status: overall_status,
            service: app_state.config().service.name.clone(),
            version: crate::VERSION.to_string(),
            timestamp: current_timestamp(),
            checks,
            stats: Self::gather_service_stats(&app_state),
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify service can rank
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        Ok(Self::check_ranking_engine(&app_state).status)
    }

    /// Check if service is running
    async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Rank a two-competitor sample table with every algorithm
    fn check_ranking_engine(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();
        let sample = vec![
            vec![Cell::from("0 -- 0"), Cell::from("1 -- 0")],
            vec![Cell::from("0 -- 1"), Cell::from("0 -- 0")],
        ];

        let engine = app_state.engine();
        let failures: Vec<String> = Algorithm::ALL
            .iter()
            .filter_map(|&algorithm| match engine.compute_with(&sample, algorithm) {
                Ok(outcome) if outcome.scores.len() == 2 && outcome.scores[0] > outcome.scores[1] => {
                    None
                }
                Ok(outcome) => Some(format!(
                    "'{}' produced unexpected scores {:?}",
                    algorithm, outcome.scores
                )),
                Err(e) => {
                    error!("Ranking engine self-check failed for '{}': {}", algorithm, e);
                    Some(format!("'{}' failed: {}", algorithm, e))
                }
            })
            .collect();

        let (status, message) = if failures.is_empty() {
            (HealthStatus::Healthy, None)
        } else {
            (HealthStatus::Degraded, Some(failures.join("; ")))
        };

        ComponentCheck {
            name: "ranking_engine".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn gather_service_stats(app_state: &AppState) -> ServiceStats {
        let heatmap = &app_state.config().heatmap;

        ServiceStats {
            uptime_seconds: app_state.uptime().as_secs(),
            rankings_served: app_state.rankings_served(),
            rankings_failed: app_state.rankings_failed(),
            exports_served: app_state.exports_served(),
            heatmap_endpoint: format!(
                "{}:{}/{}",
                heatmap.host, heatmap.upload_port, heatmap.request_port
            ),
        }
    }
}

/// Convert health check to JSON string
impl HealthCheck {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}
