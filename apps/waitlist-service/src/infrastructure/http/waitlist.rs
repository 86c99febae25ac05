//! Waitlist and profile lookup endpoints.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use super::error::ApiError;
use crate::application::ports::Profile;
use crate::application::services::JoinError;
use crate::domain::waitlist::{IdentityId, NewSignup, RegistryStats, SignupRecord};
use crate::infrastructure::metrics::{RejectionReason, record_rejection, record_signup};

/// Body of `POST /api/waitlist/join`.
///
/// Every field is optional on the wire so that absent fields surface as
/// "Missing required fields" rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Farcaster identity.
    pub fid: Option<IdentityId>,
    /// Farcaster username.
    pub username: Option<String>,
    /// Display name.
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    /// Profile picture URL.
    #[serde(rename = "pfpUrl")]
    pub pfp_url: Option<String>,
}

impl From<JoinRequest> for NewSignup {
    fn from(req: JoinRequest) -> Self {
        Self {
            identity_id: req.fid.unwrap_or_default(),
            handle: req.username.unwrap_or_default(),
            display_name: req.display_name.unwrap_or_default(),
            avatar_url: req.pfp_url,
        }
    }
}

/// Body of requests that carry only a fid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FidRequest {
    /// Farcaster identity.
    pub fid: Option<IdentityId>,
}

/// Successful admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Always true.
    pub success: bool,
    /// The admitted record.
    pub entry: SignupRecord,
}

/// `POST /api/waitlist/join`
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub(super) async fn join(
    State(state): State<AppState>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JoinResponse>), ApiError> {
    let Json(req) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected join body");
        ApiError::InvalidBody
    })?;

    let result = state.join.join(req.into());
    respond_to_admission(&state, result)
}

/// `POST /api/waitlist/enroll`
///
/// Server-side join: resolves the profile for `fid`, then admits it.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub(super) async fn enroll(
    State(state): State<AppState>,
    body: Result<Json<FidRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JoinResponse>), ApiError> {
    let Json(req) = body.map_err(|_| ApiError::InvalidBody)?;

    let result = state.join.enroll(req.fid.unwrap_or_default()).await;
    respond_to_admission(&state, result)
}

fn respond_to_admission(
    state: &AppState,
    result: Result<SignupRecord, JoinError>,
) -> Result<(StatusCode, Json<JoinResponse>), ApiError> {
    match result {
        Ok(entry) => {
            record_signup(state.join.registry().count());
            Ok((
                StatusCode::CREATED,
                Json(JoinResponse {
                    success: true,
                    entry,
                }),
            ))
        }
        Err(JoinError::Registry(e)) => {
            tracing::info!(error = %e, "Waitlist admission rejected");
            record_rejection(RejectionReason::from(&e));
            Err(e.into())
        }
        Err(e @ JoinError::UpstreamLookupFailure(_)) => Err(e.into()),
    }
}

/// `GET /api/waitlist/all`
pub(super) async fn list_all(State(state): State<AppState>) -> Json<Vec<SignupRecord>> {
    Json(state.join.registry().list_all())
}

/// `GET /api/waitlist/stats`
pub(super) async fn stats(State(state): State<AppState>) -> Json<RegistryStats> {
    Json(state.join.registry().stats(state.recent_limit))
}

/// `POST /api/neynar/user`
pub(super) async fn lookup_user(
    State(state): State<AppState>,
    body: Result<Json<FidRequest>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(req) = body.map_err(|_| ApiError::InvalidBody)?;
    let fid = req.fid.filter(|fid| *fid != 0).ok_or(ApiError::FidRequired)?;

    let profile = state.join.lookup_profile(fid).await.map_err(|e| {
        tracing::warn!(fid, error = %e, "Profile lookup failed");
        ApiError::from(e)
    })?;

    Ok(Json(profile))
}
