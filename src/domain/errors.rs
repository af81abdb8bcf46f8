//! Domain error types
//!
//! This module defines the error hierarchy for Carebase. All errors are
//! domain-specific and don't expose third-party types. The HTTP layer maps
//! each variant onto a status code; see `http::error`.

use thiserror::Error;

/// Main Carebase error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum CarebaseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Field-scoped validation failure; never partially applied
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Uniqueness conflict detected by a storage constraint (or the
    /// application-level fast path)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource missing, or outside the caller's provider scope.
    ///
    /// Out-of-scope resources are deliberately indistinguishable from
    /// nonexistent ones.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Credential verification failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// A validation failure scoped to a single input field
///
/// Carries the field name so callers can map the error directly onto a form
/// field. Aggregate writes fail as a whole on the first validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending input field (e.g. `text_value`)
    pub field: String,

    /// Why the field was rejected
    pub reason: ValidationReason,
}

impl ValidationError {
    /// A required field was missing or empty
    pub fn required(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::Required,
        }
    }

    /// A field that must stay unset was populated
    pub fn must_be_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::MustBeNull,
        }
    }

    /// A field held a malformed or out-of-range value
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::Invalid(message.into()),
        }
    }
}

/// Reason a field failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// The field is required but was absent (empty strings count as absent)
    Required,

    /// The field must be null for the referenced definition's type
    MustBeNull,

    /// The field value is malformed
    Invalid(String),
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationReason::Required => write!(f, "this field is required"),
            ValidationReason::MustBeNull => write!(f, "this field must be null"),
            ValidationReason::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CarebaseError {
    fn from(err: std::io::Error) -> Self {
        CarebaseError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CarebaseError {
    fn from(err: serde_json::Error) -> Self {
        CarebaseError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CarebaseError {
    fn from(err: toml::de::Error) -> Self {
        CarebaseError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CarebaseError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_not_found_display() {
        let err = CarebaseError::NotFound("patient");
        assert_eq!(err.to_string(), "patient not found");
    }

    #[test]
    fn test_validation_error_required() {
        let err = ValidationError::required("text_value");
        assert_eq!(err.field, "text_value");
        assert_eq!(err.reason, ValidationReason::Required);
        assert_eq!(err.to_string(), "text_value: this field is required");
    }

    #[test]
    fn test_validation_error_must_be_null() {
        let err = ValidationError::must_be_null("number_value");
        assert_eq!(err.to_string(), "number_value: this field must be null");
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: CarebaseError = ValidationError::invalid("status", "unknown status").into();
        assert!(matches!(err, CarebaseError::Validation(_)));
        assert_eq!(err.to_string(), "status: unknown status");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: CarebaseError = io_err.into();
        assert!(matches!(err, CarebaseError::Io(_)));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = CarebaseError::Conflict("duplicate".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
