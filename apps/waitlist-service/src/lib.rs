#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Waitlist Service - Farcaster Waitlist API
//!
//! An HTTP service that admits Farcaster identities into an in-memory,
//! deduplicated waitlist and answers signup stats and admin listings.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core waitlist rules
//!   - `waitlist`: Registry with admission, deduplication and recency queries
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: `ProfileLookupPort` for resolving Farcaster profiles
//!   - `services`: `JoinService` (lookup, then admit)
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `neynar`: Neynar user API client
//!   - `http`: Axum router and server
//!   - `config`: Environment configuration
//!   - `health`: Health and metrics endpoints
//!   - `metrics`: Prometheus instrumentation
//!   - `telemetry`: tracing + OpenTelemetry setup
//!
//! # Request Flow
//!
//! ```text
//!                       ┌──────────────┐      ┌──────────────────┐
//! POST /enroll ───────► │ JoinService  │─────►│ Neynar user API  │
//!                       │              │      └──────────────────┘
//! POST /join ─────────► │              │      ┌──────────────────┐
//!                       └──────┬───────┘      │ WaitlistRegistry │
//!                              └─────────────►│ (RwLock, memory) │
//! GET /all, /stats, /admin ──────────────────►└──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Waitlist rules with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::waitlist::{
    DEFAULT_RECENT_LIMIT, IdentityId, NewSignup, RegistryError, RegistryStats, SignupRecord,
    WaitlistRegistry,
};

// Application
pub use application::ports::{LookupError, Profile, ProfileLookupPort};
pub use application::services::{JoinError, JoinService};

// Infrastructure config
pub use infrastructure::config::{
    AdminSecret, ConfigError, NeynarSettings, RetrySettings, ServerSettings, ServiceConfig,
    WaitlistSettings,
};

// HTTP
pub use infrastructure::http::{
    AdminGate, AdminListResponse, ApiError, AppState, ErrorBody, FidRequest, HttpServer,
    HttpServerError, JoinRequest, JoinResponse, create_router,
};

// Neynar
pub use infrastructure::neynar::NeynarClient;

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
