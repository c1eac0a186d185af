//! Patient-doctor assignment handlers: link, list, per-patient list, and
//! unlink.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use models::medical::AssignmentPayload;

use crate::auth::AuthUser;
use crate::{ApiError, ApiJson, AppState};

// Handler for POST /api/mappings
pub async fn assign_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<AssignmentPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let link = payload.validate()?;
    let mapping = state.store.create_assignment(user.id, &link).await?;
    info!(
        owner = user.id,
        patient = mapping.patient_id,
        doctor = mapping.doctor_id,
        "doctor assigned to patient"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Doctor assigned to patient successfully",
            "mapping": mapping,
        })),
    ))
}

// Handler for GET /api/mappings
pub async fn list_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let mappings = state.store.list_assignments(user.id).await?;
    Ok(Json(json!({
        "count": mappings.len(),
        "mappings": mappings,
    })))
}

// Handler for GET /api/mappings/{patient_id}
pub async fn patient_mappings_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    // Ownership check first, so a foreign patient id 404s before any list
    // is attempted.
    let patient = state.store.get_patient(user.id, patient_id).await?;
    let doctors = state
        .store
        .assignments_for_patient(user.id, patient_id)
        .await?;

    Ok(Json(json!({
        "patient": patient.name,
        "doctors_count": doctors.len(),
        "doctors": doctors,
    })))
}

// Handler for DELETE /api/mappings/{id}
pub async fn unassign_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_assignment(user.id, id).await?;
    info!(owner = user.id, mapping = id, "doctor removed from patient");

    Ok(Json(json!({ "message": "Doctor removed from patient successfully" })))
}
