//! Patient addresses
//!
//! Addresses are child value objects of the patient aggregate: owned
//! exclusively by one patient, replaced wholesale on update, deleted with
//! the patient.

use super::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddressType {
    Home,
    Work,
}

impl AddressType {
    /// Returns the canonical wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Home => "HOME",
            AddressType::Work => "WORK",
        }
    }

    /// Parses the storage representation
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "HOME" => Ok(AddressType::Home),
            "WORK" => Ok(AddressType::Work),
            other => Err(format!("unknown address type {other:?}")),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported state codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UsState {
    Ca,
    Ny,
    Tx,
    Fl,
    Il,
    Ma,
    Wa,
}

impl UsState {
    /// All supported state codes
    pub const ALL: [UsState; 7] = [
        UsState::Ca,
        UsState::Ny,
        UsState::Tx,
        UsState::Fl,
        UsState::Il,
        UsState::Ma,
        UsState::Wa,
    ];

    /// Returns the two-letter code
    pub fn as_str(&self) -> &'static str {
        match self {
            UsState::Ca => "CA",
            UsState::Ny => "NY",
            UsState::Tx => "TX",
            UsState::Fl => "FL",
            UsState::Il => "IL",
            UsState::Ma => "MA",
            UsState::Wa => "WA",
        }
    }

    /// Parses a two-letter code
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "CA" => Ok(UsState::Ca),
            "NY" => Ok(UsState::Ny),
            "TX" => Ok(UsState::Tx),
            "FL" => Ok(UsState::Fl),
            "IL" => Ok(UsState::Il),
            "MA" => Ok(UsState::Ma),
            "WA" => Ok(UsState::Wa),
            other => Err(format!("unsupported state code {other:?}")),
        }
    }
}

impl fmt::Display for UsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An address attached to a patient
///
/// Compared by fields across updates; the replace-on-update policy means
/// storage ids are not stable and are not part of the domain shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientAddress {
    /// Kind of address
    pub address_type: AddressType,

    /// Street line
    pub street_address: String,

    /// City
    pub city: String,

    /// State code
    pub state: UsState,

    /// Postal code
    pub postal_code: String,

    /// Whether this is the patient's primary address
    #[serde(default)]
    pub is_primary: bool,

    /// Creation timestamp; filled in when omitted from a submission
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp; replace-on-update resets it together
    /// with `created_at`
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

impl PatientAddress {
    /// Single-line rendering for the list view
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street_address, self.city, self.state, self.postal_code
        )
    }

    /// Validates the address before persistence
    ///
    /// # Errors
    ///
    /// Returns a field-scoped error for empty required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.street_address.trim().is_empty() {
            return Err(ValidationError::required("street_address"));
        }
        if self.city.trim().is_empty() {
            return Err(ValidationError::required("city"));
        }
        if self.postal_code.trim().is_empty() {
            return Err(ValidationError::required("postal_code"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientAddress {
        PatientAddress {
            address_type: AddressType::Home,
            street_address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: UsState::Il,
            postal_code: "62704".to_string(),
            is_primary: true,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_address() {
        assert_eq!(sample().full_address(), "1 Main St, Springfield, IL 62704");
    }

    #[test]
    fn test_state_codes_round_trip() {
        for state in UsState::ALL {
            assert_eq!(UsState::parse(state.as_str()).unwrap(), state);
        }
        assert!(UsState::parse("ZZ").is_err());
    }

    #[test]
    fn test_address_type_serde() {
        let json = serde_json::to_string(&AddressType::Work).unwrap();
        assert_eq!(json, "\"WORK\"");
    }

    #[test]
    fn test_validation_requires_street() {
        let mut addr = sample();
        addr.street_address = "  ".to_string();
        assert_eq!(addr.validate().unwrap_err().field, "street_address");
    }

    #[test]
    fn test_validation_requires_postal_code() {
        let mut addr = sample();
        addr.postal_code = String::new();
        assert_eq!(addr.validate().unwrap_err().field, "postal_code");
    }

    #[test]
    fn test_submission_without_timestamps_gets_them() {
        // Create/update payloads never carry timestamps; deserialization
        // stamps them so every persisted address has both.
        let before = Utc::now();
        let addr: PatientAddress = serde_json::from_str(
            r#"{"address_type":"HOME","street_address":"1 Main St","city":"Springfield",
                "state":"IL","postal_code":"62704"}"#,
        )
        .unwrap();
        assert!(addr.created_at >= before);
        assert!(addr.modified_at >= before);

        let json = serde_json::to_value(&addr).unwrap();
        assert!(json["created_at"].is_string());
        assert!(json["modified_at"].is_string());
    }
}
