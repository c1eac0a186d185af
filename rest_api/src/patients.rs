//! Patient record handlers. Every operation is scoped to the requesting
//! account; a foreign id is indistinguishable from a missing one.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use models::medical::PatientPayload;

use crate::auth::AuthUser;
use crate::{ApiError, ApiJson, AppState};

// Handler for POST /api/patients
pub async fn create_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<PatientPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new = payload.validate_new()?;
    let patient = state.store.create_patient(user.id, &new).await?;
    info!(owner = user.id, patient = patient.id, "patient record created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Patient created successfully",
            "patient": patient,
        })),
    ))
}

// Handler for GET /api/patients
pub async fn list_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let patients = state.store.list_patients(user.id).await?;
    Ok(Json(json!({
        "count": patients.len(),
        "patients": patients,
    })))
}

// Handler for GET /api/patients/{id}
pub async fn get_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let patient = state.store.get_patient(user.id, id).await?;
    Ok(Json(json!(patient)))
}

// Handler for PUT /api/patients/{id}
pub async fn update_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<PatientPayload>,
) -> Result<Json<Value>, ApiError> {
    let patch = payload.validate_patch()?;
    let patient = state.store.update_patient(user.id, id, &patch).await?;
    info!(owner = user.id, patient = patient.id, "patient record updated");

    Ok(Json(json!({
        "message": "Patient updated successfully",
        "patient": patient,
    })))
}

// Handler for DELETE /api/patients/{id}
pub async fn delete_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_patient(user.id, id).await?;
    info!(owner = user.id, patient = id, "patient record deleted");

    Ok(Json(json!({ "message": "Patient deleted successfully" })))
}
