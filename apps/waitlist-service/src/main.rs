//! Waitlist Service Binary
//!
//! Starts the waitlist HTTP API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin waitlist-service
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `NEYNAR_API_KEY`: Neynar API key
//!
//! ## Optional
//! - `WAITLIST_ADMIN_SECRET`: Admin listing secret (admin route disabled if unset)
//! - `WAITLIST_HTTP_PORT`: HTTP port (default: 3000)
//! - `WAITLIST_BIND_ADDR`: Bind address (default: 0.0.0.0)
//! - `WAITLIST_RECENT_LIMIT`: Signups shown in stats (default: 5)
//! - `NEYNAR_BASE_URL`: Neynar API base URL (default: <https://api.neynar.com>)
//! - `NEYNAR_TIMEOUT_SECS`, `NEYNAR_MAX_ATTEMPTS`, `NEYNAR_INITIAL_BACKOFF_MS`,
//!   `NEYNAR_MAX_BACKOFF_SECS`: lookup client tuning
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: waitlist-service)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use waitlist_service::infrastructure::metrics::set_registry_size;
use waitlist_service::infrastructure::telemetry;
use waitlist_service::{
    AdminGate, AppState, HttpServer, JoinService, NeynarClient, ServiceConfig, WaitlistRegistry,
    create_router, init_metrics,
};

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Waitlist Service");

    let _metrics_handle = init_metrics();

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let registry = Arc::new(WaitlistRegistry::new());
    set_registry_size(registry.count());

    let profiles = Arc::new(
        NeynarClient::new(&config.neynar).context("failed to build Neynar client")?,
    );
    let join_service = JoinService::new(Arc::clone(&registry), profiles);

    let admin_gate = AdminGate::new(config.waitlist.admin_secret.as_ref());
    if !admin_gate.is_enabled() {
        tracing::warn!("WAITLIST_ADMIN_SECRET not set, admin listing disabled");
    }

    let state = AppState::new(
        join_service,
        admin_gate,
        config.waitlist.recent_limit,
        env!("CARGO_PKG_VERSION").to_string(),
    );

    let addr = SocketAddr::new(config.server.bind_addr, config.server.http_port);
    let server = HttpServer::new(addr, create_router(state), shutdown_token.clone());

    let mut server_handle = tokio::spawn(server.run());

    tracing::info!("Waitlist service ready");

    // The HTTP server is the whole service: if it exits, so do we.
    tokio::select! {
        joined = &mut server_handle => {
            shutdown_token.cancel();
            let result = joined.context("HTTP server task panicked")?;
            if let Err(e) = &result {
                tracing::error!(error = %e, "HTTP server error");
            }
            return result.context("HTTP server failed");
        }
        () = await_shutdown(shutdown_token.clone()) => {}
    }

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server_handle).await {
        Ok(Ok(Err(e))) => {
            tracing::error!(error = %e, "HTTP server error during shutdown");
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "HTTP server task panicked during shutdown");
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "HTTP server did not stop in time"
            );
        }
        Ok(Ok(Ok(()))) => {}
    }

    tracing::info!(signups = registry.count(), "Waitlist service stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    tracing::info!(
        bind_addr = %config.server.bind_addr,
        http_port = config.server.http_port,
        recent_limit = config.waitlist.recent_limit,
        admin_enabled = config.waitlist.admin_secret.is_some(),
        "Configuration loaded"
    );
    tracing::debug!(
        neynar_base_url = %config.neynar.base_url,
        neynar_timeout_secs = config.neynar.timeout.as_secs(),
        neynar_max_attempts = config.neynar.retry.max_attempts,
        "Neynar client settings"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
