//! Port Interfaces
//!
//! Contracts that infrastructure adapters implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `ProfileLookupPort`: resolves a Farcaster identity to its public profile

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::waitlist::{IdentityId, NewSignup};

/// Public profile of a Farcaster user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Farcaster identity.
    pub fid: IdentityId,
    /// Farcaster username.
    pub username: String,
    /// Display name.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Profile picture URL.
    #[serde(rename = "pfpUrl")]
    pub pfp_url: String,
}

impl From<Profile> for NewSignup {
    fn from(profile: Profile) -> Self {
        Self::new(profile.fid, profile.username, profile.display_name)
            .with_avatar_url(profile.pfp_url)
    }
}

/// Profile lookup error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No user exists for the identity.
    #[error("user {fid} not found")]
    NotFound {
        /// The identity that was looked up.
        fid: IdentityId,
    },

    /// Network failure talking to the provider.
    #[error("profile lookup transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status.
    #[error("profile provider returned {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// Provider response could not be decoded.
    #[error("failed to decode profile response: {0}")]
    Decode(String),

    /// Retries were exhausted.
    #[error("profile lookup gave up after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Attempts made.
        attempts: u32,
    },
}

impl LookupError {
    /// Short label for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Transport(_) => "transport",
            Self::Upstream { .. } => "upstream",
            Self::Decode(_) => "decode",
            Self::MaxRetriesExceeded { .. } => "max_retries",
        }
    }
}

/// Port for resolving Farcaster profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileLookupPort: Send + Sync {
    /// Fetch the profile for an identity.
    async fn lookup(&self, fid: IdentityId) -> Result<Profile, LookupError>;
}
