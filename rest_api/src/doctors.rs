//! Doctor record handlers; the same account-scoped shape as the patient
//! routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use models::medical::DoctorPayload;

use crate::auth::AuthUser;
use crate::{ApiError, ApiJson, AppState};

// Handler for POST /api/doctors
pub async fn create_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<DoctorPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new = payload.validate_new()?;
    let doctor = state.store.create_doctor(user.id, &new).await?;
    info!(owner = user.id, doctor = doctor.id, "doctor record created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Doctor created successfully",
            "doctor": doctor,
        })),
    ))
}

// Handler for GET /api/doctors
pub async fn list_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let doctors = state.store.list_doctors(user.id).await?;
    Ok(Json(json!({
        "count": doctors.len(),
        "doctors": doctors,
    })))
}

// Handler for GET /api/doctors/{id}
pub async fn get_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let doctor = state.store.get_doctor(user.id, id).await?;
    Ok(Json(json!(doctor)))
}

// Handler for PUT /api/doctors/{id}
pub async fn update_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<DoctorPayload>,
) -> Result<Json<Value>, ApiError> {
    let patch = payload.validate_patch()?;
    let doctor = state.store.update_doctor(user.id, id, &patch).await?;
    info!(owner = user.id, doctor = doctor.id, "doctor record updated");

    Ok(Json(json!({
        "message": "Doctor updated successfully",
        "doctor": doctor,
    })))
}

// Handler for DELETE /api/doctors/{id}
pub async fn delete_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_doctor(user.id, id).await?;
    info!(owner = user.id, doctor = id, "doctor record deleted");

    Ok(Json(json!({ "message": "Doctor deleted successfully" })))
}
