//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus the HTTP surface.

/// Neynar profile lookup adapter.
pub mod neynar;

/// HTTP/JSON API server.
pub mod http;

/// Configuration loading.
pub mod config;

/// Health check and metrics endpoints.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
