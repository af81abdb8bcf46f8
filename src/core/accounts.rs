//! Provider account service
//!
//! Sign-up, authentication, profile maintenance, password changes, and
//! account deletion. Passwords are hashed with bcrypt; the plaintext never
//! leaves this module and is never logged.

use crate::adapters::store::ProviderStore;
use crate::domain::{
    CarebaseError, NewProvider, Provider, ProviderProfile, ProviderScope, Result, ValidationError,
};
use serde::Deserialize;
use std::sync::Arc;

/// Sign-up request payload
#[derive(Clone, Deserialize)]
pub struct SignUpRequest {
    /// Desired login name
    pub username: String,

    /// Initial password, plaintext
    pub password: String,

    /// First name
    #[serde(default)]
    pub first_name: String,

    /// Last name
    #[serde(default)]
    pub last_name: String,
}

/// Password change request payload
#[derive(Clone, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password, for re-authentication
    pub current_password: String,

    /// New password
    pub new_password: String,

    /// New password, retyped
    pub retyped_new_password: String,
}

/// Provider account operations
pub struct AccountService {
    store: Arc<dyn ProviderStore>,
    bcrypt_cost: u32,
    min_password_length: usize,
}

impl AccountService {
    /// Create a new account service
    pub fn new(store: Arc<dyn ProviderStore>, bcrypt_cost: u32, min_password_length: usize) -> Self {
        Self {
            store,
            bcrypt_cost,
            min_password_length,
        }
    }

    /// Register a new provider account
    ///
    /// # Errors
    ///
    /// Returns a field-scoped validation error for a bad username or a too
    /// short password, and `Conflict` if the username is taken.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Provider> {
        self.check_password_strength("password", &request.password)?;

        let new = NewProvider {
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash: self.hash_password(&request.password)?,
        };
        new.validate()?;

        let provider = self.store.create_provider(new).await?;
        tracing::info!(provider_id = %provider.id, "Provider account created");
        Ok(provider)
    }

    /// Verify credentials and return the authenticated provider
    ///
    /// # Errors
    ///
    /// Returns `Authentication` for an unknown username or a wrong password;
    /// the two cases are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Provider> {
        let account = self
            .store
            .find_by_username(username)
            .await?
            .ok_or_else(|| CarebaseError::Authentication("invalid credentials".to_string()))?;

        let matches = bcrypt::verify(password, &account.password_hash)
            .map_err(|e| CarebaseError::Other(format!("Password verification failed: {e}")))?;
        if !matches {
            return Err(CarebaseError::Authentication(
                "invalid credentials".to_string(),
            ));
        }

        Ok(account.provider)
    }

    /// Fetch the authenticated provider's own record
    pub async fn profile(&self, scope: ProviderScope) -> Result<Provider> {
        self.store.get_provider(scope.provider_id()).await
    }

    /// Update the authenticated provider's profile fields
    pub async fn update_profile(
        &self,
        scope: ProviderScope,
        profile: ProviderProfile,
    ) -> Result<Provider> {
        self.store.update_profile(scope.provider_id(), profile).await
    }

    /// Change the authenticated provider's password
    ///
    /// Requires the current password and a matching retype of the new one.
    ///
    /// # Errors
    ///
    /// Returns field-scoped validation errors for a wrong current password,
    /// a mismatched retype, or a too short new password.
    pub async fn change_password(
        &self,
        scope: ProviderScope,
        request: ChangePasswordRequest,
    ) -> Result<()> {
        if request.new_password != request.retyped_new_password {
            return Err(ValidationError::invalid(
                "retyped_new_password",
                "passwords do not match",
            )
            .into());
        }
        self.check_password_strength("new_password", &request.new_password)?;

        let provider = self.store.get_provider(scope.provider_id()).await?;
        let account = self
            .store
            .find_by_username(&provider.username)
            .await?
            .ok_or(CarebaseError::NotFound("provider"))?;

        let matches = bcrypt::verify(&request.current_password, &account.password_hash)
            .map_err(|e| CarebaseError::Other(format!("Password verification failed: {e}")))?;
        if !matches {
            return Err(
                ValidationError::invalid("current_password", "password is incorrect").into(),
            );
        }

        let hash = self.hash_password(&request.new_password)?;
        self.store
            .update_password_hash(scope.provider_id(), &hash)
            .await?;
        tracing::info!(provider_id = %scope.provider_id(), "Provider password changed");
        Ok(())
    }

    /// Delete the authenticated provider's account and everything it owns
    pub async fn delete_account(&self, scope: ProviderScope) -> Result<()> {
        self.store.delete_provider(scope.provider_id()).await
    }

    fn check_password_strength(&self, field: &str, password: &str) -> Result<()> {
        if password.len() < self.min_password_length {
            return Err(ValidationError::invalid(
                field,
                format!(
                    "must be at least {} characters",
                    self.min_password_length
                ),
            )
            .into());
        }
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost)
            .map_err(|e| CarebaseError::Other(format!("Password hashing failed: {e}")))
    }
}
