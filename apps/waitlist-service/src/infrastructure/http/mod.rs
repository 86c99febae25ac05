//! HTTP/JSON API server.
//!
//! # Endpoints
//!
//! - `POST /api/waitlist/join` - Admit a resolved profile
//! - `POST /api/waitlist/enroll` - Resolve a fid through Neynar, then admit
//! - `GET /api/waitlist/all` - Every signup, newest first
//! - `GET /api/waitlist/stats` - Total count and newest signups
//! - `POST /api/neynar/user` - Profile lookup proxy
//! - `GET /api/admin/waitlist` - Admin listing (Bearer secret)
//! - Health and metrics routes from [`crate::infrastructure::health`]

mod admin;
mod error;
mod waitlist;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use admin::{AdminGate, AdminListResponse};
pub use error::{ApiError, ErrorBody};
pub use waitlist::{FidRequest, JoinRequest, JoinResponse};

use crate::application::services::JoinService;
use crate::infrastructure::health::{self, HealthState};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    join: JoinService,
    admin: AdminGate,
    recent_limit: usize,
    health: Arc<HealthState>,
}

impl AppState {
    /// Create handler state.
    #[must_use]
    pub fn new(join: JoinService, admin: AdminGate, recent_limit: usize, version: String) -> Self {
        let health = Arc::new(HealthState::new(
            version,
            Arc::clone(join.registry()),
            admin.is_enabled(),
        ));
        Self {
            join,
            admin,
            recent_limit,
            health,
        }
    }
}

impl FromRef<AppState> for Arc<HealthState> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.health)
    }
}

/// Create the Axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/waitlist/join", post(waitlist::join))
        .route("/api/waitlist/enroll", post(waitlist::enroll))
        .route("/api/waitlist/all", get(waitlist::list_all))
        .route("/api/waitlist/stats", get(waitlist::stats))
        .route("/api/neynar/user", post(waitlist::lookup_user))
        .route("/api/admin/waitlist", get(admin::admin_list))
        .merge(health::routes::<AppState>())
        .with_state(state)
}

// =============================================================================
// HTTP Server
// =============================================================================

/// HTTP server for the waitlist API.
pub struct HttpServer {
    addr: SocketAddr,
    router: Router,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(addr: SocketAddr, router: Router, cancel: CancellationToken) -> Self {
        Self {
            addr,
            router,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HttpServerError` if binding fails or the server hits a fatal error.
    pub async fn run(self) -> Result<(), HttpServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| HttpServerError::BindFailed(self.addr, e.to_string()))?;

        tracing::info!(addr = %self.addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HttpServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    /// Failed to bind.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}
