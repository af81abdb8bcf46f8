//! Store abstraction traits
//!
//! This module defines the traits the relational store implements. Every
//! tenant-owned operation takes an explicit [`ProviderScope`]; rows outside
//! the scope must behave exactly like rows that do not exist.
//!
//! Uniqueness ((provider, name) on definitions, (patient, custom_field) on
//! values) is the store's responsibility: implementations must enforce it at
//! the storage layer, not only via application pre-checks, so concurrent
//! writers cannot slip through the check-then-insert window.

use crate::domain::{
    CustomFieldDefinition, CustomFieldDraft, CustomFieldId, CustomFieldUpdate, CustomFieldValue,
    NewProvider, PatientAddress, PatientDraft, PatientId, PatientRecord, Provider,
    ProviderAccount, ProviderId, ProviderProfile, ProviderScope, Result,
};
use async_trait::async_trait;

/// Provider account persistence
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Create a provider account
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the username is already taken.
    async fn create_provider(&self, new: NewProvider) -> Result<Provider>;

    /// Look up an account (with password hash) by username
    ///
    /// Returns `Ok(None)` when the username is unknown; authentication
    /// failures are the caller's concern.
    async fn find_by_username(&self, username: &str) -> Result<Option<ProviderAccount>>;

    /// Fetch a provider by id
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the provider does not exist.
    async fn get_provider(&self, id: ProviderId) -> Result<Provider>;

    /// Update a provider's profile fields
    async fn update_profile(&self, id: ProviderId, profile: ProviderProfile) -> Result<Provider>;

    /// Replace a provider's password hash
    async fn update_password_hash(&self, id: ProviderId, password_hash: &str) -> Result<()>;

    /// Delete a provider and cascade to everything it owns
    async fn delete_provider(&self, id: ProviderId) -> Result<()>;
}

/// Custom field definition persistence, provider-scoped
#[async_trait]
pub trait CustomFieldStore: Send + Sync {
    /// Create a definition owned by the scope's provider
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the provider already has a definition with the
    /// same name.
    async fn create_custom_field(
        &self,
        scope: ProviderScope,
        draft: CustomFieldDraft,
    ) -> Result<CustomFieldDefinition>;

    /// List the scope's definitions, ordered by name
    async fn list_custom_fields(&self, scope: ProviderScope) -> Result<Vec<CustomFieldDefinition>>;

    /// Fetch one definition within the scope
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for definitions that do not exist or belong to
    /// another provider; callers cannot tell the two apart.
    async fn get_custom_field(
        &self,
        scope: ProviderScope,
        id: CustomFieldId,
    ) -> Result<CustomFieldDefinition>;

    /// Rename or re-describe a definition; the declared type never changes
    async fn update_custom_field(
        &self,
        scope: ProviderScope,
        id: CustomFieldId,
        update: CustomFieldUpdate,
    ) -> Result<CustomFieldDefinition>;

    /// Delete a definition and cascade to all values referencing it
    async fn delete_custom_field(&self, scope: ProviderScope, id: CustomFieldId) -> Result<()>;
}

/// Patient aggregate persistence, provider-scoped
///
/// Aggregate writes are transactional: either the patient and all submitted
/// children persist, or none of it does.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Create a patient with its addresses and custom field values in one
    /// transaction
    ///
    /// Values must already be validated against their definitions.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if two values target the same definition.
    async fn create_patient(
        &self,
        scope: ProviderScope,
        draft: PatientDraft,
        addresses: Vec<PatientAddress>,
        values: Vec<CustomFieldValue>,
    ) -> Result<PatientRecord>;

    /// List the scope's patients with their children, newest first
    async fn list_patients(&self, scope: ProviderScope) -> Result<Vec<PatientRecord>>;

    /// Fetch one patient aggregate within the scope
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for patients that do not exist or belong to
    /// another provider.
    async fn get_patient(&self, scope: ProviderScope, id: PatientId) -> Result<PatientRecord>;

    /// Update a patient's core fields and replace child collections
    ///
    /// A `Some` collection replaces the stored children wholesale (an empty
    /// vec deletes them all); `None` leaves the stored collection untouched.
    /// The whole update runs in one transaction, so any failure rolls back
    /// the deletions too.
    async fn update_patient(
        &self,
        scope: ProviderScope,
        id: PatientId,
        draft: PatientDraft,
        addresses: Option<Vec<PatientAddress>>,
        values: Option<Vec<CustomFieldValue>>,
    ) -> Result<PatientRecord>;

    /// Delete a patient and cascade to its children
    async fn delete_patient(&self, scope: ProviderScope, id: PatientId) -> Result<()>;
}
