//! Neynar API wire types.

use serde::Deserialize;

use crate::application::ports::Profile;
use crate::domain::waitlist::IdentityId;

/// Response of `GET /v2/farcaster/user/bulk`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUsersResponse {
    /// Users matching the requested fids.
    #[serde(default)]
    pub users: Vec<NeynarUser>,
}

/// A Farcaster user as returned by Neynar.
#[derive(Debug, Clone, Deserialize)]
pub struct NeynarUser {
    /// Farcaster identity.
    pub fid: IdentityId,
    /// Username.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Profile picture URL.
    #[serde(default)]
    pub pfp_url: Option<String>,
}

impl From<NeynarUser> for Profile {
    fn from(user: NeynarUser) -> Self {
        Self {
            fid: user.fid,
            username: user.username,
            display_name: user.display_name.unwrap_or_default(),
            pfp_url: user.pfp_url.unwrap_or_default(),
        }
    }
}

/// Error body returned by Neynar.
#[derive(Debug, Clone, Deserialize)]
pub struct NeynarErrorResponse {
    /// Error message.
    pub message: String,
}
