//! PostgreSQL adapter
//!
//! Pooled client plus the store trait implementations backed by the
//! relational schema in `migrations/`.

pub mod client;
pub mod store;

pub use client::PostgresClient;
pub use store::PostgresStore;
