//! Service layer for the ranking service
//!
//! This module contains the application state, health reporting and the
//! HTTP router used by the production binary.

pub mod app;
pub mod health;
pub mod http;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
pub use http::{create_router, serve};
