//! Store abstraction layer
//!
//! This module provides trait-based abstraction for the relational store,
//! allowing the services to run against PostgreSQL in production and an
//! in-memory implementation in tests.

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{CustomFieldStore, PatientStore, ProviderStore};
