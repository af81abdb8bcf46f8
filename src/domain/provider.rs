//! Provider accounts
//!
//! A provider is the authenticated tenant owning patients and custom field
//! definitions. Password hashes stay out of the [`Provider`] entity; they
//! travel only in [`ProviderAccount`], which the store hands to the
//! authentication path.

use super::errors::ValidationError;
use super::ids::ProviderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a username
pub const MAX_USERNAME_LEN: usize = 150;

/// A provider account, without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// Storage-assigned identifier
    pub id: ProviderId,

    /// Login name, unique across all providers
    pub username: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

/// A provider together with its password hash
///
/// Only the authentication path sees this shape; it is never serialized.
#[derive(Debug, Clone)]
pub struct ProviderAccount {
    /// The provider entity
    pub provider: Provider,

    /// Bcrypt hash of the provider's password
    pub password_hash: String,
}

/// Input for creating a provider account
#[derive(Debug, Clone)]
pub struct NewProvider {
    /// Login name, unique across all providers
    pub username: String,

    /// First name (may be filled in later via profile update)
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Bcrypt hash of the initial password
    pub password_hash: String,
}

impl NewProvider {
    /// Validates the account fields before persistence
    ///
    /// # Errors
    ///
    /// Returns a field-scoped error for an empty or overlong username.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::required("username"));
        }
        if self.username.len() > MAX_USERNAME_LEN {
            return Err(ValidationError::invalid(
                "username",
                format!("must be at most {MAX_USERNAME_LEN} characters"),
            ));
        }
        Ok(())
    }
}

/// Profile fields a provider can update about itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_provider_validation() {
        let new = NewProvider {
            username: "drsmith".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$2b$12$hash".to_string(),
        };
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_new_provider_rejects_blank_username() {
        let new = NewProvider {
            username: " ".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$2b$12$hash".to_string(),
        };
        assert_eq!(new.validate().unwrap_err().field, "username");
    }

    #[test]
    fn test_new_provider_rejects_overlong_username() {
        let new = NewProvider {
            username: "u".repeat(MAX_USERNAME_LEN + 1),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$2b$12$hash".to_string(),
        };
        assert!(new.validate().is_err());
    }
}
