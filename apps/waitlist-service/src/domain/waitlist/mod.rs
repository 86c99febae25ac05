//! Waitlist Registry
//!
//! Domain types for admitting Farcaster identities into the waitlist and
//! answering aggregate queries over the admitted set.
//!
//! # Design
//!
//! The registry tracks:
//! - One record per identity (`fid`), keyed for O(1) duplicate checks
//! - An admission sequence number per record, assigned under the write lock
//! - A recency index (sequence → identity) walked newest-first on reads
//!
//! Admission validates input before taking the lock, then performs the
//! existence check and the insert under a single write lock. Readers share
//! the read lock and only ever see fully built records.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// =============================================================================
// Types
// =============================================================================

/// Farcaster identity (fid) issued by the identity provider.
pub type IdentityId = u64;

/// Number of records returned by the stats query.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// One admitted waitlist participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRecord {
    /// Farcaster identity.
    #[serde(rename = "fid")]
    pub identity_id: IdentityId,
    /// Farcaster username.
    #[serde(rename = "username")]
    pub handle: String,
    /// Human-readable display name.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Profile picture URL, empty when the user has none.
    #[serde(rename = "pfpUrl", default)]
    pub avatar_url: String,
    /// Admission time.
    #[serde(rename = "timestamp")]
    pub joined_at: DateTime<Utc>,
    /// Admission sequence number. Higher is newer. Only meaningful for
    /// records issued by a registry; never on the wire.
    #[serde(skip)]
    pub(crate) sequence: u64,
}

/// Input for a single admission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSignup {
    /// Farcaster identity.
    pub identity_id: IdentityId,
    /// Farcaster username.
    pub handle: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Optional profile picture URL.
    pub avatar_url: Option<String>,
}

impl NewSignup {
    /// Create an admission request without an avatar.
    #[must_use]
    pub fn new(
        identity_id: IdentityId,
        handle: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            identity_id,
            handle: handle.into(),
            display_name: display_name.into(),
            avatar_url: None,
        }
    }

    /// Set the avatar URL.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Check required fields.
    ///
    /// A zero identity counts as absent, as do blank handles and names.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidInput` naming the first missing field.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.identity_id == 0 {
            return Err(RegistryError::InvalidInput { field: "fid" });
        }
        if self.handle.trim().is_empty() {
            return Err(RegistryError::InvalidInput { field: "username" });
        }
        if self.display_name.trim().is_empty() {
            return Err(RegistryError::InvalidInput {
                field: "displayName",
            });
        }
        Ok(())
    }
}

/// Registry failures. Neither is fatal; the registry stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A required identity field was missing or blank.
    #[error("missing required field: {field}")]
    InvalidInput {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The identity has already been admitted.
    #[error("identity {identity_id} is already registered")]
    DuplicateRegistration {
        /// The duplicated identity.
        identity_id: IdentityId,
    },
}

/// Aggregate view: total size plus the newest records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Number of admitted records.
    #[serde(rename = "totalUsers")]
    pub total_count: usize,
    /// Newest records, newest first.
    #[serde(rename = "recentUsers")]
    pub recent_records: Vec<SignupRecord>,
}

// =============================================================================
// Registry State
// =============================================================================

#[derive(Debug, Default)]
struct RegistryState {
    /// Records keyed by identity.
    records: HashMap<IdentityId, SignupRecord>,
    /// Admission sequence → identity, iterated in reverse for recency.
    recency: BTreeMap<u64, IdentityId>,
    /// Next sequence number to hand out.
    next_sequence: u64,
    /// Most recent `joined_at`, so timestamps never run backwards.
    last_joined_at: Option<DateTime<Utc>>,
}

impl RegistryState {
    fn insert(&mut self, signup: NewSignup) -> Result<SignupRecord, RegistryError> {
        if self.records.contains_key(&signup.identity_id) {
            return Err(RegistryError::DuplicateRegistration {
                identity_id: signup.identity_id,
            });
        }

        let now = Utc::now();
        let joined_at = self.last_joined_at.map_or(now, |last| last.max(now));
        let sequence = self.next_sequence;

        let record = SignupRecord {
            identity_id: signup.identity_id,
            handle: signup.handle,
            display_name: signup.display_name,
            avatar_url: signup.avatar_url.unwrap_or_default(),
            joined_at,
            sequence,
        };

        self.next_sequence += 1;
        self.last_joined_at = Some(joined_at);
        self.recency.insert(sequence, record.identity_id);
        self.records.insert(record.identity_id, record.clone());

        Ok(record)
    }

    fn newest_first(&self) -> impl Iterator<Item = &SignupRecord> {
        self.recency
            .values()
            .rev()
            .filter_map(|id| self.records.get(id))
    }

    fn recent(&self, limit: usize) -> Vec<SignupRecord> {
        self.newest_first().take(limit).cloned().collect()
    }
}

// =============================================================================
// Waitlist Registry
// =============================================================================

/// In-memory, deduplicated, recency-ordered waitlist.
///
/// Shared across request handlers as `Arc<WaitlistRegistry>`.
///
/// # Example
///
/// ```rust
/// use waitlist_service::domain::waitlist::{NewSignup, RegistryError, WaitlistRegistry};
///
/// let registry = WaitlistRegistry::new();
///
/// registry.admit(NewSignup::new(100, "alice", "Alice A")).unwrap();
/// registry.admit(NewSignup::new(200, "bob", "Bob B")).unwrap();
///
/// // Newest first
/// let all = registry.list_all();
/// assert_eq!(all[0].handle, "bob");
/// assert_eq!(all[1].handle, "alice");
///
/// // Second admission of the same identity is rejected
/// let err = registry.admit(NewSignup::new(100, "alice", "Alice A")).unwrap_err();
/// assert_eq!(err, RegistryError::DuplicateRegistration { identity_id: 100 });
/// assert_eq!(registry.count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct WaitlistRegistry {
    state: RwLock<RegistryState>,
}

impl WaitlistRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new participant.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if a required field is missing (no lock is taken).
    /// - `DuplicateRegistration` if the identity is already admitted.
    pub fn admit(&self, signup: NewSignup) -> Result<SignupRecord, RegistryError> {
        signup.validate()?;
        self.state.write().insert(signup)
    }

    /// Number of admitted records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.state.read().records.len()
    }

    /// Every record, newest first.
    #[must_use]
    pub fn list_all(&self) -> Vec<SignupRecord> {
        let state = self.state.read();
        state.newest_first().cloned().collect()
    }

    /// The first `min(limit, count)` records of [`Self::list_all`].
    #[must_use]
    pub fn list_recent(&self, limit: usize) -> Vec<SignupRecord> {
        self.state.read().recent(limit)
    }

    /// Whether the identity has been admitted.
    #[must_use]
    pub fn is_registered(&self, identity_id: IdentityId) -> bool {
        self.state.read().records.contains_key(&identity_id)
    }

    /// Look up a single record.
    #[must_use]
    pub fn get(&self, identity_id: IdentityId) -> Option<SignupRecord> {
        self.state.read().records.get(&identity_id).cloned()
    }

    /// Total count and newest records, read under one lock.
    #[must_use]
    pub fn stats(&self, recent_limit: usize) -> RegistryStats {
        let state = self.state.read();
        RegistryStats {
            total_count: state.records.len(),
            recent_records: state.recent(recent_limit),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
