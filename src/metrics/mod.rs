//! Metrics and monitoring for the ranking service
//!
//! Prometheus counters and histograms for ranking requests, heatmap
//! transfers and overall service health.

pub mod collector;

pub use collector::{MetricsCollector, MetricsTimer, RankingMetrics, ServiceMetrics};
