//! Prometheus Metrics Module
//!
//! Exposes waitlist metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Signups**: admissions and rejections by reason
//! - **Registry**: current registry size
//! - **Profile lookups**: outcomes and latency of Neynar calls
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the HTTP server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::waitlist::RegistryError;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "waitlist_signups_total",
        "Total identities admitted to the waitlist"
    );
    describe_counter!(
        "waitlist_rejections_total",
        "Total admissions rejected, by reason"
    );
    describe_gauge!(
        "waitlist_registry_size",
        "Number of identities currently on the waitlist"
    );
    describe_counter!(
        "waitlist_profile_lookups_total",
        "Total Neynar profile lookups, by outcome"
    );
    describe_histogram!(
        "waitlist_profile_lookup_seconds",
        "Latency of Neynar profile lookups including retries"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Metric label for a rejected admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Missing or blank required field.
    InvalidInput,
    /// Identity already on the waitlist.
    Duplicate,
}

impl RejectionReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Duplicate => "duplicate",
        }
    }
}

impl From<&RegistryError> for RejectionReason {
    fn from(error: &RegistryError) -> Self {
        match error {
            RegistryError::InvalidInput { .. } => Self::InvalidInput,
            RegistryError::DuplicateRegistration { .. } => Self::Duplicate,
        }
    }
}

/// Record a successful admission and the new registry size.
pub fn record_signup(registry_size: usize) {
    counter!("waitlist_signups_total").increment(1);
    set_registry_size(registry_size);
}

/// Record a rejected admission.
pub fn record_rejection(reason: RejectionReason) {
    counter!("waitlist_rejections_total", "reason" => reason.as_str()).increment(1);
}

/// Update the registry size gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_registry_size(size: usize) {
    gauge!("waitlist_registry_size").set(size as f64);
}

/// Record a profile lookup outcome and its duration.
pub fn record_profile_lookup(outcome: &'static str, duration: Duration) {
    counter!("waitlist_profile_lookups_total", "outcome" => outcome).increment(1);
    histogram!("waitlist_profile_lookup_seconds").record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================
