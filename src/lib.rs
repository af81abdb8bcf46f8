// Carebase - Multi-tenant patient record backend
// Copyright (c) 2026 Carebase Contributors
// Licensed under the MIT License

//! # Carebase - Multi-tenant patient record backend
//!
//! Carebase is an HTTP API for provider practices to manage their patients,
//! patient addresses, and provider-defined custom fields. Every record
//! belongs to exactly one provider; a provider can never observe another
//! provider's data, not even its existence.
//!
//! ## Architecture
//!
//! Carebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`http`] - Axum router, authentication, and serialization views
//! - [`core`] - Business logic (accounts, custom fields, patients)
//! - [`adapters`] - Storage integrations (PostgreSQL, in-memory)
//! - [`domain`] - Core domain types and validation rules
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Custom fields
//!
//! Providers declare their own patient attributes as typed definitions
//! (`TEXT` or `NUMBER`). A patient's value for a definition is validated
//! against the declared type at write time and carried in-process as a
//! tagged [`domain::FieldValue`]:
//!
//! ```rust
//! use carebase::domain::{CustomFieldType, FieldValue};
//! use rust_decimal::Decimal;
//!
//! let value = FieldValue::validate(
//!     CustomFieldType::Number,
//!     None,
//!     Some(Decimal::new(1250, 2)),
//! )?;
//! assert_eq!(value.render(), serde_json::json!("12.5"));
//! # Ok::<(), carebase::domain::ValidationError>(())
//! ```
//!
//! ## Tenant scoping
//!
//! Every read and write takes an explicit [`domain::ProviderScope`]. A
//! lookup outside the caller's scope fails as `NotFound`, exactly like a
//! record that does not exist:
//!
//! ```rust,no_run
//! use carebase::domain::{PatientId, ProviderId, ProviderScope};
//! # async fn example(patients: carebase::core::PatientService) -> carebase::domain::Result<()> {
//! let scope = ProviderScope::new(ProviderId::new(1).unwrap());
//! let record = patients.get(scope, PatientId::new(42).unwrap()).await?;
//! println!("{}", record.patient.full_name());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Carebase uses the [`domain::CarebaseError`] type for all errors:
//!
//! ```rust,no_run
//! use carebase::domain::CarebaseError;
//!
//! fn example() -> Result<(), CarebaseError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = carebase::config::load_config("carebase.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Carebase uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting server");
//! warn!(patient_id = 42, "Patient has no primary address");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod logging;
