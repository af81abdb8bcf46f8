//! Domain models and types for Carebase.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ProviderId`], [`PatientId`],
//!   [`CustomFieldId`])
//! - **Entities and value objects** ([`Provider`], [`Patient`],
//!   [`PatientAddress`], [`CustomFieldDefinition`], [`CustomFieldValue`])
//! - **The tagged value variant** ([`FieldValue`]) with its write-time
//!   validation of the discriminated two-column storage
//! - **Explicit tenancy** ([`ProviderScope`])
//! - **Error types** ([`CarebaseError`], field-scoped [`ValidationError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so different entity ids cannot be
//! mixed:
//!
//! ```rust
//! use carebase::domain::{PatientId, CustomFieldId};
//!
//! # fn example() -> Result<(), String> {
//! let patient_id = PatientId::new(1)?;
//! let field_id = CustomFieldId::new(1)?;
//! // let wrong: PatientId = field_id;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # The value invariant
//!
//! A [`FieldValue`] can only be obtained through validation against the
//! referenced definition's declared type, so holding one means exactly one
//! storage column is populated and it is the right one:
//!
//! ```rust
//! use carebase::domain::{CustomFieldType, FieldValue};
//!
//! let value = FieldValue::validate(
//!     CustomFieldType::Text,
//!     Some("Dr. Smith".to_string()),
//!     None,
//! ).unwrap();
//! assert_eq!(value.columns(), (Some("Dr. Smith"), None));
//! ```

pub mod address;
pub mod custom_field;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod provider;
pub mod result;
pub mod scope;
pub mod value;

// Re-export commonly used types for convenience
pub use address::{AddressType, PatientAddress, UsState};
pub use custom_field::{
    CustomFieldDefinition, CustomFieldDraft, CustomFieldType, CustomFieldUpdate,
};
pub use errors::{CarebaseError, ValidationError, ValidationReason};
pub use ids::{CustomFieldId, PatientId, ProviderId};
pub use patient::{Patient, PatientDraft, PatientRecord, PatientStatus};
pub use provider::{NewProvider, Provider, ProviderAccount, ProviderProfile};
pub use result::Result;
pub use scope::ProviderScope;
pub use value::{CustomFieldValue, FieldValue, ValueSubmission};
