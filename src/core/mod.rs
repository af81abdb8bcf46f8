//! Core services
//!
//! The services own the business rules: credential handling, scope-checked
//! access to definitions and patients, and validation of submitted values
//! against their definitions. They talk to storage only through the store
//! traits, so they run unchanged against PostgreSQL or the in-memory store.

pub mod accounts;
pub mod custom_fields;
pub mod patients;

pub use accounts::{AccountService, ChangePasswordRequest, SignUpRequest};
pub use custom_fields::CustomFieldService;
pub use patients::PatientService;
