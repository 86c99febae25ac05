//! Join Waitlist Use Case

use std::sync::Arc;

use crate::application::ports::{LookupError, Profile, ProfileLookupPort};
use crate::domain::waitlist::{IdentityId, NewSignup, RegistryError, SignupRecord, WaitlistRegistry};

/// Failure of a join attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// Rejected by the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Profile lookup failed; the registry was not touched.
    #[error("upstream profile lookup failed: {0}")]
    UpstreamLookupFailure(#[from] LookupError),
}

/// Use case for joining the waitlist.
///
/// Wraps the registry together with the profile lookup port so handlers
/// share one entry point for admissions.
#[derive(Clone)]
pub struct JoinService {
    registry: Arc<WaitlistRegistry>,
    profiles: Arc<dyn ProfileLookupPort>,
}

impl JoinService {
    /// Create a new `JoinService`.
    pub fn new(registry: Arc<WaitlistRegistry>, profiles: Arc<dyn ProfileLookupPort>) -> Self {
        Self { registry, profiles }
    }

    /// The registry this service admits into.
    #[must_use]
    pub const fn registry(&self) -> &Arc<WaitlistRegistry> {
        &self.registry
    }

    /// Admit an identity whose profile the caller already resolved.
    ///
    /// # Errors
    ///
    /// Returns `JoinError::Registry` on invalid input or a duplicate.
    pub fn join(&self, signup: NewSignup) -> Result<SignupRecord, JoinError> {
        let record = self.registry.admit(signup)?;
        tracing::info!(
            fid = record.identity_id,
            username = %record.handle,
            total = self.registry.count(),
            "Waitlist signup admitted"
        );
        Ok(record)
    }

    /// Resolve the profile for `fid`.
    ///
    /// # Errors
    ///
    /// Returns the lookup failure unchanged.
    pub async fn lookup_profile(&self, fid: IdentityId) -> Result<Profile, LookupError> {
        self.profiles.lookup(fid).await
    }

    /// Resolve the profile for `fid`, then admit it.
    ///
    /// Already-registered identities are rejected before the lookup; the
    /// registry still re-checks under its lock.
    ///
    /// # Errors
    ///
    /// - `Registry(InvalidInput)` for a zero fid
    /// - `Registry(DuplicateRegistration)` if already admitted
    /// - `UpstreamLookupFailure` if the lookup fails
    pub async fn enroll(&self, fid: IdentityId) -> Result<SignupRecord, JoinError> {
        if fid == 0 {
            return Err(RegistryError::InvalidInput { field: "fid" }.into());
        }
        if self.registry.is_registered(fid) {
            return Err(RegistryError::DuplicateRegistration { identity_id: fid }.into());
        }

        let profile = self.profiles.lookup(fid).await.map_err(|e| {
            tracing::warn!(fid, error = %e, "Profile lookup failed, join aborted");
            e
        })?;

        // Trust the identity we were asked to enroll, not the one echoed back.
        let signup = NewSignup {
            identity_id: fid,
            ..NewSignup::from(profile)
        };

        self.join(signup)
    }
}
