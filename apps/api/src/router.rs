use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::services::submission::SubmissionGuard;
use doctor_cell::router::doctor_routes;
use doctor_cell::DoctorDirectory;
use patient_cell::router::patient_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    // Injected collaborators shared by every form submission
    let directory = Arc::new(DoctorDirectory::seeded());
    let guard = Arc::new(SubmissionGuard::new());

    Router::new()
        .route("/", get(|| async { "Clinic Booking API is running!" }))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .layer(Extension(directory))
        .layer(Extension(guard))
}
