//! Admin listing behind a shared secret.
//!
//! The presented secret and the configured one are both hashed with
//! SHA-256 and compared in constant time, so neither length nor content
//! leaks through timing.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::AppState;
use super::error::ApiError;
use crate::domain::waitlist::SignupRecord;
use crate::infrastructure::config::AdminSecret;

/// Shared-secret gate for admin routes.
#[derive(Clone, Default)]
pub struct AdminGate {
    digest: Option<[u8; 32]>,
}

impl AdminGate {
    /// Build a gate; `None` disables admin access entirely.
    #[must_use]
    pub fn new(secret: Option<&AdminSecret>) -> Self {
        Self {
            digest: secret.map(|s| sha256(s.expose())),
        }
    }

    /// Whether an admin secret is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    /// Check a presented secret.
    ///
    /// # Errors
    ///
    /// - `AdminDisabled` when no secret is configured
    /// - `Unauthorized` when the secret is missing or wrong
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), ApiError> {
        let Some(expected) = &self.digest else {
            return Err(ApiError::AdminDisabled);
        };
        let presented = presented.ok_or(ApiError::Unauthorized)?;

        if bool::from(sha256(presented).ct_eq(expected)) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn sha256(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Admin listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminListResponse {
    /// Number of signups.
    #[serde(rename = "totalUsers")]
    pub total_users: usize,
    /// All signups, newest first.
    pub entries: Vec<SignupRecord>,
}

/// `GET /api/admin/waitlist`
pub(super) async fn admin_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminListResponse>, ApiError> {
    state.admin.authorize(bearer_token(&headers)).map_err(|e| {
        tracing::warn!(error = %e, "Admin listing refused");
        e
    })?;

    let entries = state.join.registry().list_all();
    Ok(Json(AdminListResponse {
        total_users: entries.len(),
        entries,
    }))
}
