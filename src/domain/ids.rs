//! Domain identifier types
//!
//! Newtype wrappers around the storage-assigned numeric identifiers.
//! Each type prevents mixing identifiers of different entities and keeps
//! the storage representation (BIGSERIAL) out of call signatures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from a raw storage value
            ///
            /// # Errors
            ///
            /// Returns an error if the value is not positive. Storage-assigned
            /// identifiers start at 1.
            pub fn new(id: i64) -> Result<Self, String> {
                if id <= 0 {
                    return Err(format!(
                        "{} must be positive, got {}",
                        stringify!($name),
                        id
                    ));
                }
                Ok(Self(id))
            }

            /// Returns the raw numeric value
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id: i64 = s
                    .parse()
                    .map_err(|_| format!("invalid {}: {s:?}", stringify!($name)))?;
                Self::new(id)
            }
        }
    };
}

numeric_id! {
    /// Identifier of a provider (the authenticated tenant owning patients
    /// and custom field definitions)
    ProviderId
}

numeric_id! {
    /// Identifier of a patient
    PatientId
}

numeric_id! {
    /// Identifier of a custom field definition
    CustomFieldId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_creation() {
        let id = ProviderId::new(42).unwrap();
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn test_non_positive_id_fails() {
        assert!(ProviderId::new(0).is_err());
        assert!(PatientId::new(-1).is_err());
    }

    #[test]
    fn test_id_display() {
        let id = PatientId::new(7).unwrap();
        assert_eq!(format!("{}", id), "7");
    }

    #[test]
    fn test_id_from_str() {
        let id: CustomFieldId = "12".parse().unwrap();
        assert_eq!(id.as_i64(), 12);
        assert!("abc".parse::<CustomFieldId>().is_err());
        assert!("0".parse::<CustomFieldId>().is_err());
    }

    #[test]
    fn test_id_serialization_is_transparent() {
        let id = CustomFieldId::new(3).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "3");
        let back: CustomFieldId = serde_json::from_str("3").unwrap();
        assert_eq!(back, id);
    }
}
