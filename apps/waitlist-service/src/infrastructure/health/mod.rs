//! Health Check and Metrics Endpoint
//!
//! Health checks and Prometheus metrics, served on the main HTTP port.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns JSON health status
//! - `GET /healthz` - Kubernetes liveness probe (simple OK)
//! - `GET /readyz` - Kubernetes readiness probe
//! - `GET /metrics` - Prometheus metrics in text format

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::waitlist::WaitlistRegistry;
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Waitlist statistics.
    pub waitlist: WaitlistStatus,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Serving, but admin access is not configured.
    Degraded,
}

/// Waitlist statistics.
#[derive(Debug, Clone, Serialize)]
pub struct WaitlistStatus {
    /// Number of admitted signups.
    pub total_signups: usize,
    /// Whether the admin listing is enabled.
    pub admin_enabled: bool,
}

// =============================================================================
// Health State
// =============================================================================

/// Shared state for the health endpoints.
pub struct HealthState {
    version: String,
    started_at: Instant,
    registry: Arc<WaitlistRegistry>,
    admin_enabled: bool,
}

impl HealthState {
    /// Create new health state.
    #[must_use]
    pub fn new(version: String, registry: Arc<WaitlistRegistry>, admin_enabled: bool) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            registry,
            admin_enabled,
        }
    }
}

/// Health routes, mountable on any router whose state yields `Arc<HealthState>`.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<HealthState>: FromRef<S>,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(build_health_response(&state)))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler() -> impl IntoResponse {
    // The registry is in-memory; once the listener is up we are ready.
    (StatusCode::OK, "READY")
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

fn build_health_response(state: &HealthState) -> HealthResponse {
    HealthResponse {
        status: determine_health_status(state.admin_enabled),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        waitlist: WaitlistStatus {
            total_signups: state.registry.count(),
            admin_enabled: state.admin_enabled,
        },
    }
}

const fn determine_health_status(admin_enabled: bool) -> HealthStatus {
    if admin_enabled {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    }
}

// =============================================================================
// Tests
// =============================================================================
