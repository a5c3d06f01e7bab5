use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, PatientError};
use crate::services::PatientService;

fn map_patient_error(e: PatientError) -> AppError {
    match e {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::EmailAlreadyExists { email } => {
            AppError::Conflict(format!("Patient with email {} already exists", email))
        }
        PatientError::ValidationError(msg) => AppError::BadRequest(msg),
        PatientError::DatabaseError(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .create_patient(&user.id, request)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    // Patients can only read their own record
    let is_own_record = user_id == user.id;
    let is_admin = user.role.as_deref() == Some("admin");

    if !is_own_record && !is_admin {
        return Err(AppError::Auth(
            "Not authorized to view this patient".to_string(),
        ));
    }

    let service = PatientService::new(&config);

    let patient = service
        .get_patient_by_user(&user_id)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}
