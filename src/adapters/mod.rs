//! Storage adapters for Carebase.
//!
//! The services talk to storage through the traits in [`store`]:
//!
//! - [`store`] - Trait-based store abstraction plus an in-memory backend
//! - [`postgres`] - PostgreSQL implementation (pooled, transactional)
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing without a live database. The store layer uses
//! trait-based abstraction so the services never see a concrete backend.

pub mod postgres;
pub mod store;
