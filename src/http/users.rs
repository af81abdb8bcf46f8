//! Provider account handlers
//!
//! `POST /users` is the only route reachable without credentials; everything
//! else authenticates per request via [`AuthenticatedProvider`].

use crate::core::{ChangePasswordRequest, SignUpRequest};
use crate::domain::{Provider, ProviderProfile};
use crate::http::auth::AuthenticatedProvider;
use crate::http::error::ApiError;
use crate::http::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

/// `POST /users` - register a provider account
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Provider>), ApiError> {
    let provider = state.accounts.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(provider)))
}

/// `GET /users/me` - the authenticated provider's own record
pub async fn me(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
) -> Result<Json<Provider>, ApiError> {
    let provider = state.accounts.profile(auth.scope()).await?;
    Ok(Json(provider))
}

/// `PUT /users/me` - update profile fields
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Json(profile): Json<ProviderProfile>,
) -> Result<Json<Provider>, ApiError> {
    let provider = state.accounts.update_profile(auth.scope(), profile).await?;
    Ok(Json(provider))
}

/// `POST /users/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state.accounts.change_password(auth.scope(), request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /users/delete-account` - delete the account and everything it owns
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
) -> Result<StatusCode, ApiError> {
    state.accounts.delete_account(auth.scope()).await?;
    Ok(StatusCode::NO_CONTENT)
}
