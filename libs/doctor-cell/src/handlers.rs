use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::services::directory::DoctorDirectory;

/// List the physicians the booking form can offer.
#[axum::debug_handler]
pub async fn list_doctors(
    Extension(directory): Extension<Arc<DoctorDirectory>>,
) -> Result<Json<Value>, AppError> {
    let doctors = directory.list();

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}
