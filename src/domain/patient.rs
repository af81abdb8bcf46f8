//! Patient aggregate
//!
//! A patient plus its owned addresses and custom field values form one
//! atomic unit of consistency: they are created together, replaced together
//! on update, and deleted together.

use super::address::PatientAddress;
use super::errors::ValidationError;
use super::ids::{PatientId, ProviderId};
use super::value::CustomFieldValue;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a patient name component
pub const MAX_NAME_LEN: usize = 100;

/// Lifecycle status of a patient
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatientStatus {
    /// Initial contact, not yet onboarded
    #[default]
    Inquiry,
    /// Onboarding in progress
    Onboarding,
    /// Receiving care
    Active,
    /// No longer a patient
    Churned,
}

impl PatientStatus {
    /// Returns the canonical wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Inquiry => "INQUIRY",
            PatientStatus::Onboarding => "ONBOARDING",
            PatientStatus::Active => "ACTIVE",
            PatientStatus::Churned => "CHURNED",
        }
    }

    /// Parses the storage representation
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "INQUIRY" => Ok(PatientStatus::Inquiry),
            "ONBOARDING" => Ok(PatientStatus::Onboarding),
            "ACTIVE" => Ok(PatientStatus::Active),
            "CHURNED" => Ok(PatientStatus::Churned),
            other => Err(format!("unknown patient status {other:?}")),
        }
    }

    /// All statuses, in lifecycle order
    pub const ALL: [PatientStatus; 4] = [
        PatientStatus::Inquiry,
        PatientStatus::Onboarding,
        PatientStatus::Active,
        PatientStatus::Churned,
    ];
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted patient (core fields only, without children)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Storage-assigned identifier
    pub id: PatientId,

    /// Owning provider
    pub provider_id: ProviderId,

    /// First name
    pub first_name: String,

    /// Optional middle name
    pub middle_name: Option<String>,

    /// Last name
    pub last_name: String,

    /// Date of birth
    pub date_of_birth: NaiveDate,

    /// Lifecycle status
    pub status: PatientStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Patient {
    /// Display name: "first \[middle\] last"
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// Core patient fields as submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDraft {
    /// First name
    pub first_name: String,

    /// Optional middle name
    #[serde(default)]
    pub middle_name: Option<String>,

    /// Last name
    pub last_name: String,

    /// Date of birth
    pub date_of_birth: NaiveDate,

    /// Lifecycle status; defaults to INQUIRY
    #[serde(default)]
    pub status: PatientStatus,
}

impl PatientDraft {
    /// Validates the core fields before persistence
    ///
    /// # Errors
    ///
    /// Returns a field-scoped error for empty or overlong name components.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        if let Some(middle) = &self.middle_name {
            if middle.len() > MAX_NAME_LEN {
                return Err(ValidationError::invalid(
                    "middle_name",
                    format!("must be at most {MAX_NAME_LEN} characters"),
                ));
            }
        }
        Ok(())
    }
}

fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(ValidationError::invalid(
            field,
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

/// The full patient aggregate: patient plus owned child collections
///
/// Both serialization views derive from this one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Core patient fields
    pub patient: Patient,

    /// Owned addresses (order irrelevant)
    pub addresses: Vec<PatientAddress>,

    /// Owned custom field values, at most one per definition
    pub custom_field_values: Vec<CustomFieldValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_patient(middle: Option<&str>) -> Patient {
        Patient {
            id: PatientId::new(1).unwrap(),
            provider_id: ProviderId::new(1).unwrap(),
            first_name: "Ada".to_string(),
            middle_name: middle.map(String::from),
            last_name: "Lovelace".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            status: PatientStatus::Active,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name_without_middle() {
        assert_eq!(sample_patient(None).full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_full_name_with_middle() {
        assert_eq!(sample_patient(Some("King")).full_name(), "Ada King Lovelace");
    }

    #[test]
    fn test_full_name_with_empty_middle() {
        assert_eq!(sample_patient(Some("")).full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_status_defaults_to_inquiry() {
        assert_eq!(PatientStatus::default(), PatientStatus::Inquiry);
    }

    #[test]
    fn test_status_round_trip() {
        for status in PatientStatus::ALL {
            assert_eq!(PatientStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(PatientStatus::parse("RETIRED").is_err());
    }

    #[test]
    fn test_draft_status_defaults_when_omitted() {
        let draft: PatientDraft = serde_json::from_str(
            r#"{"first_name":"Ada","last_name":"Lovelace","date_of_birth":"1815-12-10"}"#,
        )
        .unwrap();
        assert_eq!(draft.status, PatientStatus::Inquiry);
    }

    #[test]
    fn test_draft_validation_rejects_blank_names() {
        let draft = PatientDraft {
            first_name: String::new(),
            middle_name: None,
            last_name: "Lovelace".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            status: PatientStatus::Inquiry,
        };
        assert_eq!(draft.validate().unwrap_err().field, "first_name");
    }
}
