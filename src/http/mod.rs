//! HTTP API
//!
//! Axum router, per-request Basic authentication, the two patient
//! serialization views, and the domain-error-to-status mapping. Handlers
//! stay thin: extract, call a service, serialize.

pub mod auth;
pub mod error;
pub mod views;

mod custom_fields;
mod patients;
mod users;

use crate::core::{AccountService, CustomFieldService, PatientService};
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Provider account operations
    pub accounts: Arc<AccountService>,

    /// Custom field definition operations
    pub custom_fields: Arc<CustomFieldService>,

    /// Patient aggregate operations
    pub patients: Arc<PatientService>,
}

/// Builds the application router
///
/// `cors_allowed_origins` lists the origins allowed by CORS; an empty list
/// allows any origin (development only).
pub fn router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let cors = if cors_allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::sign_up))
        .route("/users/me", get(users::me).put(users::update_me))
        .route("/users/change-password", post(users::change_password))
        .route("/users/delete-account", delete(users::delete_account))
        .route(
            "/custom-fields",
            get(custom_fields::list).post(custom_fields::create),
        )
        .route(
            "/custom-fields/:id",
            get(custom_fields::get)
                .put(custom_fields::update)
                .delete(custom_fields::delete),
        )
        .route("/patients", get(patients::list).post(patients::create))
        .route(
            "/patients/:id",
            get(patients::get)
                .put(patients::update)
                .delete(patients::delete),
        )
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint, unauthenticated
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
