//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the ranking service using
//! Prometheus metrics.

use crate::types::{Algorithm, RankingOutcome};
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the ranking service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Ranking engine metrics
    ranking_metrics: RankingMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// HTTP requests by endpoint and status code
    pub http_requests_total: IntCounterVec,

    /// Heatmap transfers by operation and status
    pub heatmap_transfers_total: IntCounterVec,
}

/// Ranking engine metrics
#[derive(Clone)]
pub struct RankingMetrics {
    /// Ranking requests by algorithm and outcome
    pub requests_total: IntCounterVec,

    /// Rankings that hit the iteration limit
    pub not_converged_total: IntCounterVec,

    /// Update passes per ranking
    pub iterations: HistogramVec,

    /// Ranking computation time
    pub duration_seconds: HistogramVec,

    /// Competitors per ranked matrix
    pub competitors: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let ranking_metrics = RankingMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            ranking_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get ranking metrics
    pub fn ranking(&self) -> &RankingMetrics {
        &self.ranking_metrics
    }

    /// Record a completed ranking
    pub fn record_ranking(&self, algorithm: Algorithm, outcome: &RankingOutcome, duration: Duration) {
        let label = algorithm.as_str();

        self.ranking_metrics
            .requests_total
            .with_label_values(&[label, "success"])
            .inc();
        self.ranking_metrics
            .iterations
            .with_label_values(&[label])
            .observe(outcome.iterations as f64);
        self.ranking_metrics
            .duration_seconds
            .with_label_values(&[label])
            .observe(duration.as_secs_f64());
        self.ranking_metrics
            .competitors
            .observe(outcome.scores.len() as f64);

        if !outcome.converged {
            self.ranking_metrics
                .not_converged_total
                .with_label_values(&[label])
                .inc();
        }
    }

    /// Record a ranking request that failed (`algorithm` is the raw selector)
    pub fn record_ranking_failure(&self, algorithm: &str, reason: &str) {
        let label = match algorithm.parse::<Algorithm>() {
            Ok(algorithm) => algorithm.as_str(),
            Err(_) => "unknown",
        };

        self.ranking_metrics
            .requests_total
            .with_label_values(&[label, reason])
            .inc();
    }

    /// Record an HTTP response
    pub fn record_http_request(&self, endpoint: &str, status: u16) {
        self.service_metrics
            .http_requests_total
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }

    /// Record a heatmap transfer
    pub fn record_heatmap_transfer(&self, operation: &str, success: bool) {
        let status = if success { "success" } else { "error" };

        self.service_metrics
            .heatmap_transfers_total
            .with_label_values(&[operation, status])
            .inc();
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update uptime
    pub fn update_uptime(&self, uptime: Duration) {
        self.service_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Render all metrics in the Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds = IntGauge::new("h2h_ranker_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "h2h_ranker_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("h2h_ranker_http_requests_total", "Total HTTP requests"),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let heatmap_transfers_total = IntCounterVec::new(
            Opts::new(
                "h2h_ranker_heatmap_transfers_total",
                "Total heatmap service transfers",
            ),
            &["operation", "status"],
        )?;
        registry.register(Box::new(heatmap_transfers_total.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            http_requests_total,
            heatmap_transfers_total,
        })
    }
}

impl RankingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("h2h_ranker_rankings_total", "Total ranking requests"),
            &["algorithm", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let not_converged_total = IntCounterVec::new(
            Opts::new(
                "h2h_ranker_rankings_not_converged_total",
                "Rankings that stopped at the iteration limit",
            ),
            &["algorithm"],
        )?;
        registry.register(Box::new(not_converged_total.clone()))?;

        let iterations = HistogramVec::new(
            HistogramOpts::new("h2h_ranker_ranking_iterations", "Update passes per ranking")
                .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
            &["algorithm"],
        )?;
        registry.register(Box::new(iterations.clone()))?;

        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "h2h_ranker_ranking_duration_seconds",
                "Ranking computation time",
            )
            .buckets(vec![0.0001, 0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0]),
            &["algorithm"],
        )?;
        registry.register(Box::new(duration_seconds.clone()))?;

        let competitors = Histogram::with_opts(
            HistogramOpts::new("h2h_ranker_ranking_competitors", "Competitors per ranking")
                .buckets(vec![2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0]),
        )?;
        registry.register(Box::new(competitors.clone()))?;

        Ok(Self {
            requests_total,
            not_converged_total,
            iterations,
            duration_seconds,
            competitors,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(converged: bool) -> RankingOutcome {
        RankingOutcome {
            scores: vec![1.0, 0.0],
            iterations: 7,
            converged,
        }
    }

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        let _service = collector.service();
        let _ranking = collector.ranking();
    }

    #[test]
    fn test_ranking_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_ranking(Algorithm::Elo, &outcome(false), Duration::from_millis(3));
        collector.record_ranking(Algorithm::Default, &outcome(true), Duration::from_millis(1));
        collector.record_ranking_failure("bogus", "invalid_algorithm");

        let ranking = collector.ranking();
        assert_eq!(
            ranking
                .requests_total
                .with_label_values(&["elo", "success"])
                .get(),
            1
        );
        assert_eq!(
            ranking.not_converged_total.with_label_values(&["elo"]).get(),
            1
        );
        assert_eq!(
            ranking
                .not_converged_total
                .with_label_values(&["default"])
                .get(),
            0
        );
        assert_eq!(
            ranking
                .requests_total
                .with_label_values(&["unknown", "invalid_algorithm"])
                .get(),
            1
        );
    }

    #[test]
    fn test_gather_text() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        collector.record_http_request("/rank", 200);
        collector.record_heatmap_transfer("upload", true);
        collector.update_health_status(2);

        let text = collector.gather_text().unwrap();
        assert!(text.contains("h2h_ranker_http_requests_total"));
        assert!(text.contains("h2h_ranker_heatmap_transfers_total"));
        assert!(text.contains("h2h_ranker_health_status 2"));
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();

        assert!(duration >= Duration::from_millis(10));

        let final_duration = timer.stop();
        assert!(final_duration >= Duration::from_millis(10));
    }
}
