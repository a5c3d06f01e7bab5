// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use doctor_cell::DoctorDirectory;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AppointmentError, AppointmentMode, SubmitAppointmentRequest};
use crate::services::form::ModeResolver;
use crate::services::submission::{AppointmentSubmissionService, SubmissionGuard};

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::UnknownMode(mode) => {
            AppError::BadRequest(format!("Unknown appointment mode: {}", mode))
        }
        AppointmentError::Validation(fields) => AppError::Validation(fields),
        AppointmentError::SubmissionInFlight => {
            AppError::Conflict("Submission already in progress".to_string())
        }
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::Unauthorized => {
            AppError::Auth("Not authorized to access this appointment".to_string())
        }
        AppointmentError::DatabaseError(msg) => AppError::ExternalService(msg),
    }
}

/// What the client renders for a mode: status label, field set, submit label.
#[axum::debug_handler]
pub async fn get_form_plan(
    Path(mode): Path<String>,
) -> Result<Json<Value>, AppError> {
    let mode: AppointmentMode = mode.parse().map_err(map_appointment_error)?;

    let plan = ModeResolver::new().form_plan(mode);

    Ok(Json(json!(plan)))
}

#[axum::debug_handler]
pub async fn submit_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Extension(directory): Extension<Arc<DoctorDirectory>>,
    Extension(guard): Extension<Arc<SubmissionGuard>>,
    Json(request): Json<SubmitAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentSubmissionService::new(&config, directory, guard);

    let response = service
        .submit(&user.id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": response.appointment,
        "redirect_to": response.redirect_to,
        "message": "Appointment submitted successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Extension(directory): Extension<Arc<DoctorDirectory>>,
    Extension(guard): Extension<Arc<SubmissionGuard>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentSubmissionService::new(&config, directory, guard);

    let appointment = service
        .get_appointment(&appointment_id)
        .await
        .map_err(map_appointment_error)?;

    // Only the booking user or an admin can view
    let is_own = appointment.user_id == user.id;
    let is_admin = user.role.as_deref() == Some("admin");

    if !is_own && !is_admin {
        return Err(AppError::Auth(
            "Not authorized to view this appointment".to_string(),
        ));
    }

    Ok(Json(json!(appointment)))
}
