//! Custom field definitions
//!
//! A custom field definition is a provider-scoped, typed (TEXT or NUMBER)
//! named slot that can be attached to any of that provider's patients.
//! The `(provider, name)` pair is unique and the type is immutable once
//! created; changing it would orphan the invariant of existing values.

use super::errors::ValidationError;
use super::ids::{CustomFieldId, ProviderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a custom field name
pub const MAX_FIELD_NAME_LEN: usize = 100;

/// Declared type of a custom field
///
/// Determines which storage column a value populates: TEXT values live in
/// `text_value`, NUMBER values in `number_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomFieldType {
    /// Free-form text value
    Text,
    /// Fixed-point numeric value (15 digits, 2 fractional)
    Number,
}

impl CustomFieldType {
    /// Returns the canonical wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomFieldType::Text => "TEXT",
            CustomFieldType::Number => "NUMBER",
        }
    }

    /// Parses the storage representation
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than `TEXT` or `NUMBER`.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "TEXT" => Ok(CustomFieldType::Text),
            "NUMBER" => Ok(CustomFieldType::Number),
            other => Err(format!("unknown custom field type {other:?}")),
        }
    }
}

impl fmt::Display for CustomFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted custom field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldDefinition {
    /// Storage-assigned identifier
    pub id: CustomFieldId,

    /// Owning provider; definitions are never shared across providers
    pub provider_id: ProviderId,

    /// Display name, unique per provider
    pub name: String,

    /// Declared value type, immutable after creation
    pub field_type: CustomFieldType,

    /// Optional free-form description
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

/// Input for creating a custom field definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFieldDraft {
    /// Display name, unique per provider
    pub name: String,

    /// Declared value type
    pub field_type: CustomFieldType,

    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
}

impl CustomFieldDraft {
    /// Validates the draft before persistence
    ///
    /// # Errors
    ///
    /// Returns a field-scoped error if the name is empty or too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_field_name(&self.name)
    }
}

/// Input for updating a custom field definition
///
/// The declared type is deliberately absent: it cannot change once values
/// may reference the definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFieldUpdate {
    /// New display name
    pub name: String,

    /// New description (null clears it)
    #[serde(default)]
    pub description: Option<String>,
}

impl CustomFieldUpdate {
    /// Validates the update before persistence
    ///
    /// # Errors
    ///
    /// Returns a field-scoped error if the name is empty or too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_field_name(&self.name)
    }
}

fn validate_field_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::required("name"));
    }
    if name.len() > MAX_FIELD_NAME_LEN {
        return Err(ValidationError::invalid(
            "name",
            format!("must be at most {MAX_FIELD_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_round_trip() {
        assert_eq!(CustomFieldType::parse("TEXT").unwrap(), CustomFieldType::Text);
        assert_eq!(
            CustomFieldType::parse("NUMBER").unwrap(),
            CustomFieldType::Number
        );
        assert_eq!(CustomFieldType::Number.as_str(), "NUMBER");
        assert!(CustomFieldType::parse("DATE").is_err());
    }

    #[test]
    fn test_field_type_serde_uses_uppercase() {
        let json = serde_json::to_string(&CustomFieldType::Text).unwrap();
        assert_eq!(json, "\"TEXT\"");
        let back: CustomFieldType = serde_json::from_str("\"NUMBER\"").unwrap();
        assert_eq!(back, CustomFieldType::Number);
    }

    #[test]
    fn test_draft_validation() {
        let draft = CustomFieldDraft {
            name: "Referred By".to_string(),
            field_type: CustomFieldType::Text,
            description: None,
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_draft_rejects_blank_name() {
        let draft = CustomFieldDraft {
            name: "   ".to_string(),
            field_type: CustomFieldType::Number,
            description: None,
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_draft_rejects_overlong_name() {
        let draft = CustomFieldDraft {
            name: "x".repeat(MAX_FIELD_NAME_LEN + 1),
            field_type: CustomFieldType::Text,
            description: None,
        };
        assert!(draft.validate().is_err());
    }
}
