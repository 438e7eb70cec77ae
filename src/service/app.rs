//! Main application state and service coordination
//!
//! This module contains the AppState shared by every HTTP handler: the
//! ranking engine, the heatmap client, metrics and the background tasks
//! that keep service gauges current.

use crate::config::AppConfig;
use crate::error::RankingError;
use crate::heatmap::{HeatmapClient, TcpHeatmapClient};
use crate::metrics::MetricsCollector;
use crate::ranking::RankingEngine;
use crate::service::health::HealthCheck;
use crate::types::{Algorithm, Cell, RankingOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Interval between refreshes of the uptime and health gauges
const HEALTH_METRICS_INTERVAL: Duration = Duration::from_secs(15);

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("HTTP server error: {message}")]
    Server { message: String },
}

/// Counters reported by the health endpoint
#[derive(Debug, Default)]
struct RequestCounters {
    rankings_served: AtomicU64,
    rankings_failed: AtomicU64,
    exports_served: AtomicU64,
}

/// Main application state
pub struct AppState {
    config: AppConfig,
    engine: Arc<RankingEngine>,
    metrics: Arc<MetricsCollector>,
    heatmap: Arc<dyn HeatmapClient>,
    counters: RequestCounters,
    /// Held by each ranking until its blocking computation returns
    compute_permits: Arc<Semaphore>,
    started_at: Instant,
    is_running: Arc<RwLock<bool>>,
    background_tasks: RwLock<Vec<JoinHandle<()>>>,
}

impl AppState {
    /// Build the application state from configuration
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        crate::config::validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let engine =
            RankingEngine::new(config.ranking.clone()).map_err(|e| ServiceError::Initialization {
                message: format!("ranking engine: {}", e),
            })?;
        let metrics = MetricsCollector::new().map_err(|e| ServiceError::Initialization {
            message: format!("metrics registry: {}", e),
        })?;
        let heatmap = TcpHeatmapClient::new(config.heatmap.clone());

        info!(
            "Initialized ranking engine: {}",
            serde_json::to_string(&engine.config()).unwrap_or_default()
        );

        let compute_permits = Arc::new(Semaphore::new(config.service.max_concurrent_requests));

        Ok(Self {
            config,
            engine: Arc::new(engine),
            metrics: Arc::new(metrics),
            heatmap: Arc::new(heatmap),
            compute_permits,
            counters: RequestCounters::default(),
            started_at: Instant::now(),
            is_running: Arc::new(RwLock::new(false)),
            background_tasks: RwLock::new(Vec::new()),
        })
    }

    /// Replace the heatmap client (used by tests and alternative transports)
    pub fn with_heatmap_client(mut self, client: Arc<dyn HeatmapClient>) -> Self {
        self.heatmap = client;
        self
    }

    /// Mark the service as running and start background tasks
    pub async fn start(self: &Arc<Self>) -> Result<(), ServiceError> {
        info!("Starting {} service", self.config.service.name);

        *self.is_running.write().await = true;
        self.metrics.update_health_status(2);
        self.start_background_tasks().await;

        info!("✅ {} service started successfully", self.config.service.name);
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of {} service", self.config.service.name);

        *self.is_running.write().await = false;
        self.metrics.update_health_status(0);
        self.stop_background_tasks().await;

        info!(
            "Final statistics - rankings served: {}, failed: {}, exports: {}, uptime: {:?}",
            self.rankings_served(),
            self.rankings_failed(),
            self.exports_served(),
            self.uptime()
        );
        info!("✅ {} service shutdown completed", self.config.service.name);

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn engine(&self) -> Arc<RankingEngine> {
        self.engine.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn heatmap(&self) -> Arc<dyn HeatmapClient> {
        self.heatmap.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn rankings_served(&self) -> u64 {
        self.counters.rankings_served.load(Ordering::Relaxed)
    }

    pub fn rankings_failed(&self) -> u64 {
        self.counters.rankings_failed.load(Ordering::Relaxed)
    }

    pub fn exports_served(&self) -> u64 {
        self.counters.exports_served.load(Ordering::Relaxed)
    }

    /// Rankings that can start computing right now
    pub fn available_compute_permits(&self) -> usize {
        self.compute_permits.available_permits()
    }

    /// Count a successful CSV export
    pub fn record_export(&self) {
        self.counters.exports_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Rank `table` off the async runtime, bounded by the request timeout.
    ///
    /// The engine cannot be cancelled, so a computation that overruns the
    /// timeout keeps its blocking thread and its compute permit until it
    /// returns. Waiting for a permit counts against the same timeout.
    pub async fn rank(
        &self,
        table: Vec<Vec<Cell>>,
        algorithm: &str,
    ) -> crate::error::Result<RankingOutcome> {
        let selected: Algorithm = match algorithm.parse() {
            Ok(selected) => selected,
            Err(e) => {
                self.record_ranking_failure(algorithm, "invalid_algorithm");
                return Err(anyhow::Error::from(e));
            }
        };

        let engine = self.engine.clone();
        let timer = self.metrics.start_timer();
        let timeout = self.config.request_timeout();
        let permits = self.compute_permits.clone();
        let task = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|e| anyhow::anyhow!("compute permits closed: {}", e))?;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                engine.compute_with(&table, selected)
            })
            .await
            .map_err(anyhow::Error::from)
        };

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(outcome))) => {
                let duration = timer.stop();
                self.metrics.record_ranking(selected, &outcome, duration);
                self.counters.rankings_served.fetch_add(1, Ordering::Relaxed);

                if !outcome.converged {
                    warn!(
                        "'{}' ranking of {} competitors stopped at the iteration limit ({})",
                        selected,
                        outcome.scores.len(),
                        outcome.iterations
                    );
                }
                debug!(
                    "Ranked {} competitors with '{}' in {:.2}ms",
                    outcome.scores.len(),
                    selected,
                    duration.as_secs_f64() * 1000.0
                );
                Ok(outcome)
            }
            Ok(Ok(Err(e))) => {
                self.record_ranking_failure(algorithm, "invalid_matrix");
                Err(e)
            }
            Ok(Err(task_error)) => {
                error!("Ranking task failed: {}", task_error);
                self.record_ranking_failure(algorithm, "task_failed");
                Err(anyhow::anyhow!("ranking task failed: {}", task_error))
            }
            Err(_) => {
                warn!(
                    "'{}' ranking exceeded the {}ms request timeout",
                    selected, self.config.service.request_timeout_ms
                );
                self.record_ranking_failure(algorithm, "timeout");
                Err(RankingError::Timeout {
                    timeout_ms: self.config.service.request_timeout_ms,
                }
                .into())
            }
        }
    }

    fn record_ranking_failure(&self, algorithm: &str, reason: &str) {
        self.metrics.record_ranking_failure(algorithm, reason);
        self.counters.rankings_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Start background maintenance tasks
    async fn start_background_tasks(self: &Arc<Self>) {
        let state = Arc::clone(self);
        let is_running = self.is_running.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(HEALTH_METRICS_INTERVAL);
            info!("Health metrics task started");

            while *is_running.read().await {
                interval.tick().await;

                state.metrics.update_uptime(state.uptime());
                match HealthCheck::check(state.clone()).await {
                    Ok(health) => state.metrics.update_health_status(health.status.as_gauge()),
                    Err(e) => {
                        error!("Health check failed: {}", e);
                        state.metrics.update_health_status(0);
                    }
                }
            }

            info!("Health metrics task stopped");
        });

        self.background_tasks.write().await.push(handle);
        info!("1 background maintenance task started successfully");
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&self) {
        let mut tasks = self.background_tasks.write().await;
        for handle in tasks.drain(..) {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Background task ended with error: {}", e);
                }
            }
        }
        debug!("Background tasks stopped");
    }
}
