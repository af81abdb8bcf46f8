//! Patient aggregate handlers
//!
//! Create and update accept the aggregate in one payload: core fields plus
//! nested addresses and two-column value submissions. The list route answers
//! with the flat view, everything else with the detail view.

use crate::domain::{
    CarebaseError, PatientAddress, PatientDraft, PatientId, PatientStatus, ValueSubmission,
};
use crate::http::auth::AuthenticatedProvider;
use crate::http::error::ApiError;
use crate::http::views::{PatientDetailView, PatientListView};
use crate::http::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

/// Create payload: core fields plus both child collections
///
/// Addresses are required on create; values default to none.
#[derive(Debug, Deserialize)]
pub struct PatientCreatePayload {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub status: PatientStatus,
    pub addresses: Vec<PatientAddress>,
    #[serde(default)]
    pub custom_field_values: Vec<ValueSubmission>,
}

/// Update payload: an omitted child collection is left untouched, a present
/// one (empty included) replaces the stored collection wholesale
#[derive(Debug, Deserialize)]
pub struct PatientUpdatePayload {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub status: PatientStatus,
    #[serde(default)]
    pub addresses: Option<Vec<PatientAddress>>,
    #[serde(default)]
    pub custom_field_values: Option<Vec<ValueSubmission>>,
}

fn patient_id(raw: i64) -> Result<PatientId, ApiError> {
    PatientId::new(raw).map_err(|_| ApiError(CarebaseError::NotFound("patient")))
}

/// `POST /patients`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Json(payload): Json<PatientCreatePayload>,
) -> Result<(StatusCode, Json<PatientDetailView>), ApiError> {
    let draft = PatientDraft {
        first_name: payload.first_name,
        middle_name: payload.middle_name,
        last_name: payload.last_name,
        date_of_birth: payload.date_of_birth,
        status: payload.status,
    };
    let record = state
        .patients
        .create(
            auth.scope(),
            draft,
            payload.addresses,
            payload.custom_field_values,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(PatientDetailView::from(&record))))
}

/// `GET /patients` - flat list view
pub async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
) -> Result<Json<Vec<PatientListView>>, ApiError> {
    let scope = auth.scope();
    let records = state.patients.list(scope).await?;
    let definitions = state.custom_fields.list(scope).await?;
    let views = records
        .iter()
        .map(|r| PatientListView::build(r, &definitions))
        .collect();
    Ok(Json(views))
}

/// `GET /patients/:id` - detail view
pub async fn get(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Path(id): Path<i64>,
) -> Result<Json<PatientDetailView>, ApiError> {
    let record = state.patients.get(auth.scope(), patient_id(id)?).await?;
    Ok(Json(PatientDetailView::from(&record)))
}

/// `PUT /patients/:id`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Path(id): Path<i64>,
    Json(payload): Json<PatientUpdatePayload>,
) -> Result<Json<PatientDetailView>, ApiError> {
    let draft = PatientDraft {
        first_name: payload.first_name,
        middle_name: payload.middle_name,
        last_name: payload.last_name,
        date_of_birth: payload.date_of_birth,
        status: payload.status,
    };
    let record = state
        .patients
        .update(
            auth.scope(),
            patient_id(id)?,
            draft,
            payload.addresses,
            payload.custom_field_values,
        )
        .await?;
    Ok(Json(PatientDetailView::from(&record)))
}

/// `DELETE /patients/:id`
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedProvider,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.patients.delete(auth.scope(), patient_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
