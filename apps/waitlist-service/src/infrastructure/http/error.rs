//! API error responses.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::application::ports::LookupError;
use crate::application::services::JoinError;
use crate::domain::waitlist::RegistryError;

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error.
    pub error: String,
}

/// Errors surfaced by the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// `fid`, `username` or `displayName` missing.
    #[error("Missing required fields")]
    MissingFields,

    /// Identity already on the waitlist.
    #[error("Already registered")]
    AlreadyRegistered,

    /// Request body was not valid JSON for the endpoint.
    #[error("Invalid request body")]
    InvalidBody,

    /// Profile lookup called without a fid.
    #[error("FID is required")]
    FidRequired,

    /// Profile provider has no such user.
    #[error("User not found")]
    UserNotFound,

    /// Profile provider failed.
    #[error("Failed to fetch user data")]
    LookupFailed,

    /// Admin secret missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// No admin secret is configured.
    #[error("Admin access is not configured")]
    AdminDisabled,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields | Self::InvalidBody | Self::FidRequired => StatusCode::BAD_REQUEST,
            Self::AlreadyRegistered => StatusCode::CONFLICT,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::LookupFailed => StatusCode::BAD_GATEWAY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::AdminDisabled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::InvalidInput { .. } => Self::MissingFields,
            RegistryError::DuplicateRegistration { .. } => Self::AlreadyRegistered,
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::NotFound { .. } => Self::UserNotFound,
            _ => Self::LookupFailed,
        }
    }
}

impl From<JoinError> for ApiError {
    fn from(error: JoinError) -> Self {
        match error {
            JoinError::Registry(e) => e.into(),
            JoinError::UpstreamLookupFailure(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(ApiError::MissingFields, StatusCode::BAD_REQUEST ; "missing fields")]
    #[test_case(ApiError::AlreadyRegistered, StatusCode::CONFLICT ; "duplicate")]
    #[test_case(ApiError::UserNotFound, StatusCode::NOT_FOUND ; "not found")]
    #[test_case(ApiError::LookupFailed, StatusCode::BAD_GATEWAY ; "lookup failed")]
    #[test_case(ApiError::Unauthorized, StatusCode::UNAUTHORIZED ; "unauthorized")]
    #[test_case(ApiError::AdminDisabled, StatusCode::SERVICE_UNAVAILABLE ; "admin disabled")]
    fn status_codes(error: ApiError, expected: StatusCode) {
        assert_eq!(error.status(), expected);
    }

    #[test]
    fn registry_errors_map_distinctly() {
        assert_eq!(
            ApiError::from(RegistryError::InvalidInput { field: "fid" }),
            ApiError::MissingFields
        );
        assert_eq!(
            ApiError::from(RegistryError::DuplicateRegistration { identity_id: 1 }),
            ApiError::AlreadyRegistered
        );
    }

    #[test]
    fn lookup_errors_map_to_not_found_or_gateway() {
        assert_eq!(
            ApiError::from(LookupError::NotFound { fid: 1 }),
            ApiError::UserNotFound
        );
        assert_eq!(
            ApiError::from(LookupError::Transport("reset".into())),
            ApiError::LookupFailed
        );
        assert_eq!(
            ApiError::from(JoinError::UpstreamLookupFailure(LookupError::Decode(
                "eof".into()
            ))),
            ApiError::LookupFailed
        );
    }

    #[test]
    fn error_messages_match_wire_contract() {
        assert_eq!(ApiError::MissingFields.to_string(), "Missing required fields");
        assert_eq!(ApiError::AlreadyRegistered.to_string(), "Already registered");
        assert_eq!(ApiError::FidRequired.to_string(), "FID is required");
    }
}
