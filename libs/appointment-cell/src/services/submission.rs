// libs/appointment-cell/src/services/submission.rs
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use doctor_cell::DoctorDirectory;
use shared_config::AppConfig;
use shared_database::documents::DocumentClient;
use shared_models::error::FieldError;

use crate::models::{
    Appointment, AppointmentError, AppointmentMode, AppointmentStatus, SubmitAppointmentRequest,
    SubmitAppointmentResponse,
};
use crate::services::validation::AppointmentValidator;

// ==============================================================================
// SUBMISSION GUARD
// ==============================================================================

/// Admits one in-flight submission per form mount. The client sends a fresh
/// `submission_id` when the form mounts; a duplicate submit while the first
/// is still running is rejected before any store traffic.
pub struct SubmissionGuard {
    in_flight: Mutex<HashSet<Uuid>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Move a submission from idle to submitting. `None` if it is already
    /// submitting. The returned ticket releases the slot when dropped,
    /// success and failure alike.
    pub fn begin(&self, submission_id: Uuid) -> Option<SubmissionTicket<'_>> {
        let mut in_flight = self.in_flight.lock().expect("submission guard poisoned");
        if !in_flight.insert(submission_id) {
            return None;
        }
        Some(SubmissionTicket {
            guard: self,
            submission_id,
        })
    }

    fn release(&self, submission_id: Uuid) {
        let mut in_flight = self.in_flight.lock().expect("submission guard poisoned");
        in_flight.remove(&submission_id);
    }
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SubmissionTicket<'a> {
    guard: &'a SubmissionGuard,
    submission_id: Uuid,
}

impl Drop for SubmissionTicket<'_> {
    fn drop(&mut self) {
        self.guard.release(self.submission_id);
    }
}

// ==============================================================================
// SUBMISSION SERVICE
// ==============================================================================

pub struct AppointmentSubmissionService {
    client: DocumentClient,
    collection_id: String,
    validator: AppointmentValidator,
    guard: Arc<SubmissionGuard>,
}

impl AppointmentSubmissionService {
    pub fn new(
        config: &AppConfig,
        directory: Arc<DoctorDirectory>,
        guard: Arc<SubmissionGuard>,
    ) -> Self {
        Self {
            client: DocumentClient::new(config),
            collection_id: config.appointment_collection_id.clone(),
            validator: AppointmentValidator::new(directory),
            guard,
        }
    }

    /// Run one submission through the mode machine: admit, validate, then
    /// dispatch on mode. Exactly one store write happens per admitted valid
    /// submission.
    pub async fn submit(
        &self,
        user_id: &str,
        request: SubmitAppointmentRequest,
    ) -> Result<SubmitAppointmentResponse, AppointmentError> {
        info!(
            "Submitting {} appointment form for user {}",
            request.mode, user_id
        );

        let _ticket = self
            .guard
            .begin(request.submission_id)
            .ok_or(AppointmentError::SubmissionInFlight)?;

        self.validator
            .validate(request.mode, &request.draft, Utc::now())
            .map_err(AppointmentError::Validation)?;

        match request.mode {
            AppointmentMode::Create => self.create_appointment(user_id, &request).await,
            AppointmentMode::Cancel | AppointmentMode::Schedule => {
                self.update_appointment(user_id, &request).await
            }
        }
    }

    async fn create_appointment(
        &self,
        user_id: &str,
        request: &SubmitAppointmentRequest,
    ) -> Result<SubmitAppointmentResponse, AppointmentError> {
        let patient_id = request
            .patient_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                warn!("Create submission without a patient record for user {}", user_id);
                AppointmentError::Validation(vec![FieldError::new(
                    "patient_id",
                    "A registered patient is required",
                )])
            })?;

        let draft = &request.draft;
        let appointment_data = json!({
            "user_id": user_id,
            "patient_id": patient_id,
            "primary_physician": draft.primary_physician,
            "schedule": draft.schedule,
            "reason": draft.reason,
            "note": draft.note,
            "status": AppointmentStatus::from(request.mode),
        });

        let appointment: Appointment = self
            .client
            .create_document(&self.collection_id, appointment_data)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!(
            "Appointment {} created for patient {}",
            appointment.id, patient_id
        );

        let redirect_to = Some(success_redirect(user_id, &appointment.id));
        Ok(SubmitAppointmentResponse {
            appointment,
            redirect_to,
        })
    }

    async fn update_appointment(
        &self,
        user_id: &str,
        request: &SubmitAppointmentRequest,
    ) -> Result<SubmitAppointmentResponse, AppointmentError> {
        let appointment_id = request
            .appointment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppointmentError::Validation(vec![FieldError::new(
                    "appointment_id",
                    "An existing appointment is required",
                )])
            })?;

        let current = self.get_appointment(appointment_id).await?;
        if current.user_id != user_id {
            return Err(AppointmentError::Unauthorized);
        }

        let status = AppointmentStatus::from(request.mode);
        let mut update_data = Map::new();
        update_data.insert("status".to_string(), json!(status));

        match request.mode {
            AppointmentMode::Cancel => {
                update_data.insert(
                    "cancellation_reason".to_string(),
                    json!(request.draft.cancellation_reason),
                );
            }
            AppointmentMode::Schedule => {
                if let Some(physician) = &request.draft.primary_physician {
                    update_data.insert("primary_physician".to_string(), json!(physician));
                }
                if let Some(schedule) = request.draft.schedule {
                    update_data.insert("schedule".to_string(), json!(schedule));
                }
                if let Some(reason) = &request.draft.reason {
                    update_data.insert("reason".to_string(), json!(reason));
                }
                if let Some(note) = &request.draft.note {
                    update_data.insert("note".to_string(), json!(note));
                }
            }
            AppointmentMode::Create => unreachable!("create handled separately"),
        }

        let appointment: Appointment = self
            .client
            .update_document(&self.collection_id, appointment_id, Value::Object(update_data))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!("Appointment {} moved to {}", appointment.id, status);

        Ok(SubmitAppointmentResponse {
            appointment,
            redirect_to: None,
        })
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Appointment, AppointmentError> {
        let found: Option<Appointment> = self
            .client
            .find_document(&self.collection_id, appointment_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        found.ok_or(AppointmentError::NotFound)
    }
}

/// Success route the client navigates to after a created appointment.
pub fn success_redirect(user_id: &str, appointment_id: &str) -> String {
    format!(
        "/patients/{}/new-appointment/success?appointmentId={}",
        user_id,
        urlencoding::encode(appointment_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_admits_one_submission_at_a_time() {
        let guard = SubmissionGuard::new();
        let id = Uuid::new_v4();

        let ticket = guard.begin(id).expect("first submit admitted");
        assert!(guard.begin(id).is_none());

        drop(ticket);
        assert!(guard.begin(id).is_some());
    }

    #[test]
    fn guard_tracks_submissions_independently() {
        let guard = SubmissionGuard::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let _a = guard.begin(first).unwrap();
        assert!(guard.begin(second).is_some());
    }

    #[test]
    fn success_redirect_carries_the_appointment_id() {
        let url = success_redirect("user-1", "appt-42");
        assert_eq!(
            url,
            "/patients/user-1/new-appointment/success?appointmentId=appt-42"
        );
    }
}
