//! HTTP error mapping
//!
//! Translates the domain error taxonomy onto status codes and JSON bodies:
//!
//! - `Validation` becomes `400` with the message keyed to the offending
//!   field, `{"<field>": ["<message>"]}`
//! - `Conflict` becomes `400` with a `detail` body
//! - `NotFound` becomes `404`; out-of-scope rows took this path earlier, so
//!   a caller probing foreign ids learns nothing
//! - `Authentication` becomes `401` with a `WWW-Authenticate` challenge
//! - everything else becomes an opaque `500`, with the cause logged
//!   server-side only

use crate::domain::CarebaseError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error wrapper carrying a domain error into an HTTP response
pub struct ApiError(pub CarebaseError);

impl From<CarebaseError> for ApiError {
    fn from(err: CarebaseError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            CarebaseError::Validation(err) => {
                let body = json!({ err.field: [err.reason.to_string()] });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            CarebaseError::Conflict(detail) => {
                let body = json!({ "detail": detail });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            CarebaseError::NotFound(what) => {
                let body = json!({ "detail": format!("{what} not found") });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            CarebaseError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"carebase\"")],
                Json(json!({ "detail": "invalid credentials" })),
            )
                .into_response(),
            other => {
                tracing::error!(error = %other, "Request failed");
                let body = json!({ "detail": "internal server error" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
