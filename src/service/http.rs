//! HTTP boundary
//!
//! axum router exposing ranking, validation, export and heatmap routes on
//! top of [`AppState`], plus health and Prometheus endpoints.

use crate::error::RankingError;
use crate::heatmap::client::transfer_name;
use crate::league::{export_csv, validate_head_to_head, LeagueRow, EXPORT_FILENAME};
use crate::service::app::{AppState, ServiceError};
use crate::service::health::{HealthCheck, HealthStatus};
use crate::types::{Algorithm, Cell};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{MatchedPath, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower::limit::GlobalConcurrencyLimitLayer;
use tracing::{debug, error, info, warn};

/// Body of `POST /rank`
#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub table: Option<Vec<Vec<Cell>>>,
    #[serde(default)]
    pub algorithm: Option<String>,
}

/// Body of `POST /validate_data`
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub headers: Option<Vec<Value>>,
    #[serde(default)]
    pub rows: Option<Vec<LeagueRow>>,
}

/// Body of `POST /export_ranking_data`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub table: Option<Vec<Vec<Cell>>>,
    #[serde(default)]
    pub ranking: Option<Vec<f64>>,
    #[serde(default)]
    pub player_names: Option<Vec<String>>,
}

/// Body of `POST /heatmap`
#[derive(Debug, Deserialize)]
pub struct HeatmapRequest {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub color: String,
}

/// Build the service router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_concurrent = state.config().service.max_concurrent_requests;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/rank", post(rank_handler))
        .route("/validate_data", post(validate_handler))
        .route("/export_ranking_data", post(export_handler))
        .route("/upload/{filename}", post(upload_handler))
        .route("/heatmap", post(heatmap_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
        .with_state(state)
}

/// Bind the configured address and serve until `shutdown` resolves
pub async fn serve<F>(state: Arc<AppState>, shutdown: F) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = format!(
        "{}:{}",
        state.config().service.http_host,
        state.config().service.http_port
    );
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::Server {
            message: format!("failed to bind {}: {}", address, e),
        })?;

    info!("🌐 HTTP server listening on {}", address);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServiceError::Server {
            message: e.to_string(),
        })
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn invalid_payload(rejection: JsonRejection) -> Response {
    debug!("Rejected request body: {}", rejection.body_text());
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid JSON payload: {}", rejection.body_text()),
    )
}

/// Map a failure to the status code the caller should see
fn error_status(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<RankingError>() {
        Some(RankingError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        Some(RankingError::Transfer { .. }) | Some(RankingError::Protocol { .. }) => {
            StatusCode::BAD_GATEWAY
        }
        Some(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Count and log every routed request
async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;
    let status = response.status();

    state.metrics().record_http_request(&endpoint, status.as_u16());
    info!(
        "{} {} -> {} ({:.2}ms)",
        method,
        endpoint,
        status.as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    response
}

async fn root_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "service": state.config().service.name,
            "version": crate::VERSION,
            "algorithms": Algorithm::ALL.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
            "endpoints": [
                "GET /health",
                "GET /metrics",
                "POST /rank",
                "POST /validate_data",
                "POST /export_ranking_data",
                "POST /upload/{filename}",
                "POST /heatmap"
            ]
        })),
    )
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    match HealthCheck::check(state.clone()).await {
        Ok(health) => {
            state.metrics().update_health_status(health.status.as_gauge());
            let code = match health.status {
                HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
                HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            };
            (code, Json(health)).into_response()
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let metrics = state.metrics();
    metrics.update_uptime(state.uptime());

    match metrics.gather_text() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn rank_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_payload(rejection),
    };

    let Some(table) = request.table else {
        return error_response(StatusCode::BAD_REQUEST, "Missing \"table\" data");
    };
    let algorithm = request
        .algorithm
        .unwrap_or_else(|| Algorithm::Default.as_str().to_string());

    match state.rank(table, &algorithm).await {
        Ok(outcome) => (StatusCode::OK, Json(json!({ "ranking": outcome.scores }))).into_response(),
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                error!("Rank request failed: {}", e);
            } else {
                warn!("Rank request rejected: {}", e);
            }
            error_response(status, e.to_string())
        }
    }
}

async fn validate_handler(payload: Result<Json<ValidateRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_payload(rejection),
    };

    let (Some(headers), Some(rows)) = (request.headers, request.rows) else {
        return error_response(StatusCode::BAD_REQUEST, "Headers and rows must be lists");
    };

    let headers: Vec<String> = headers
        .into_iter()
        .map(|header| match header {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect();

    let errors = validate_head_to_head(&headers, &rows);
    debug!(
        "Validated {} rows against {} headers: {} problems",
        rows.len(),
        headers.len(),
        errors.len()
    );

    (StatusCode::OK, Json(json!({ "errors": errors }))).into_response()
}

async fn export_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_payload(rejection),
    };

    let (table, ranking, names) = match (request.table, request.ranking, request.player_names) {
        (Some(table), Some(ranking), Some(names))
            if !table.is_empty() && !ranking.is_empty() && !names.is_empty() =>
        {
            (table, ranking, names)
        }
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing table, ranking, or playerNames data",
            )
        }
    };

    match export_csv(&table, &ranking, &names) {
        Ok(csv) => {
            state.record_export();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={}", EXPORT_FILENAME),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => {
            warn!("Export rejected: {}", e);
            error_response(error_status(&e), e.to_string())
        }
    }
}

async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No file content");
    }
    if let Err(e) = transfer_name(&filename) {
        return error_response(error_status(&e), e.to_string());
    }

    let result = state.heatmap().upload_csv(&filename, &body).await;
    state
        .metrics()
        .record_heatmap_transfer("upload", result.is_ok());

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": "CSV uploaded successfully",
                "filename": filename,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Upload of '{}' failed: {}", filename, e);
            error_response(error_status(&e), format!("Upload failed: {}", e))
        }
    }
}

async fn heatmap_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HeatmapRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_payload(rejection),
    };

    let Some(filename) = request.filename.filter(|name| !name.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing filename");
    };
    if let Err(e) = transfer_name(&filename) {
        return error_response(error_status(&e), e.to_string());
    }

    let result = state
        .heatmap()
        .request_heatmap(&filename, &request.color)
        .await;
    state
        .metrics()
        .record_heatmap_transfer("heatmap", result.is_ok());

    match result {
        Ok(image) => (StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], image).into_response(),
        Err(e) => {
            error!("Heatmap request for '{}' failed: {}", filename, e);
            error_response(
                error_status(&e),
                format!("Heatmap generation failed: {}", e),
            )
        }
    }
}
