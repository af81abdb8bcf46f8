//! Custom field definition handlers

use crate::domain::{CustomFieldDefinition, CustomFieldDraft, CustomFieldId, CustomFieldUpdate};
use crate::http::auth::AuthenticatedProvider;
use crate::http::error::ApiError;
use crate::http::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

/// Non-positive path ids can never exist, so they answer like any other
/// missing row.
fn field_id(raw: i64) -> Result<CustomFieldId, ApiError> {
    CustomFieldId::new(raw).map_err(|_| ApiError(crate::domain::CarebaseError::NotFound("custom field")))
}

/// `POST /custom-fields`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Json(draft): Json<CustomFieldDraft>,
) -> Result<(StatusCode, Json<CustomFieldDefinition>), ApiError> {
    let definition = state.custom_fields.create(auth.scope(), draft).await?;
    Ok((StatusCode::CREATED, Json(definition)))
}

/// `GET /custom-fields`
pub async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
) -> Result<Json<Vec<CustomFieldDefinition>>, ApiError> {
    let definitions = state.custom_fields.list(auth.scope()).await?;
    Ok(Json(definitions))
}

/// `GET /custom-fields/:id`
pub async fn get(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Path(id): Path<i64>,
) -> Result<Json<CustomFieldDefinition>, ApiError> {
    let definition = state.custom_fields.get(auth.scope(), field_id(id)?).await?;
    Ok(Json(definition))
}

/// `PUT /custom-fields/:id`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Path(id): Path<i64>,
    Json(update): Json<CustomFieldUpdate>,
) -> Result<Json<CustomFieldDefinition>, ApiError> {
    let definition = state
        .custom_fields
        .update(auth.scope(), field_id(id)?, update)
        .await?;
    Ok(Json(definition))
}

/// `DELETE /custom-fields/:id`
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.custom_fields.delete(auth.scope(), field_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
