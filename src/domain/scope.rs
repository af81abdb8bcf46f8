//! Provider scope
//!
//! Every store operation takes an explicit [`ProviderScope`] rather than
//! relying on ambient request state. Rows belonging to another provider are
//! filtered out at query scope, so from the caller's point of view they do
//! not exist (not-found, never forbidden).

use super::ids::ProviderId;

/// The tenancy boundary for a request
///
/// Wraps the authenticated provider's identifier. Constructing a scope is
/// the job of the authentication layer; the core trusts it as the filter
/// key for every read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderScope(ProviderId);

impl ProviderScope {
    /// Creates a scope for the given provider
    pub fn new(provider_id: ProviderId) -> Self {
        Self(provider_id)
    }

    /// Returns the provider this scope belongs to
    pub fn provider_id(&self) -> ProviderId {
        self.0
    }
}

impl From<ProviderId> for ProviderScope {
    fn from(id: ProviderId) -> Self {
        Self(id)
    }
}
