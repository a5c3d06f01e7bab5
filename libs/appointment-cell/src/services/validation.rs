// libs/appointment-cell/src/services/validation.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use doctor_cell::DoctorDirectory;
use shared_models::error::FieldError;

use crate::models::{AppointmentDraft, AppointmentMode};

const TEXT_MIN: usize = 2;
const TEXT_MAX: usize = 500;

/// Per-mode draft validation. Runs entirely in-process; a failing draft never
/// reaches the document store.
pub struct AppointmentValidator {
    directory: Arc<DoctorDirectory>,
}

impl AppointmentValidator {
    pub fn new(directory: Arc<DoctorDirectory>) -> Self {
        Self { directory }
    }

    pub fn validate(
        &self,
        mode: AppointmentMode,
        draft: &AppointmentDraft,
        now: DateTime<Utc>,
    ) -> Result<(), Vec<FieldError>> {
        debug!("Validating {} draft", mode);

        let mut errors = Vec::new();

        match mode {
            AppointmentMode::Create | AppointmentMode::Schedule => {
                self.check_physician(draft, &mut errors);
                self.check_schedule(draft, now, &mut errors);
                check_text_bounds("reason", draft.reason.as_deref(), &mut errors);
                check_text_bounds("note", draft.note.as_deref(), &mut errors);
            }
            AppointmentMode::Cancel => {
                match non_empty(draft.cancellation_reason.as_deref()) {
                    Some(reason) => {
                        check_text_bounds("cancellation_reason", Some(reason), &mut errors)
                    }
                    None => errors.push(FieldError::new(
                        "cancellation_reason",
                        "Reason for cancellation is required",
                    )),
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check_physician(&self, draft: &AppointmentDraft, errors: &mut Vec<FieldError>) {
        match non_empty(draft.primary_physician.as_deref()) {
            Some(name) if !self.directory.contains(name) => {
                errors.push(FieldError::new(
                    "primary_physician",
                    "Selected doctor is not available",
                ));
            }
            Some(_) => {}
            None => errors.push(FieldError::new(
                "primary_physician",
                "Select at least one doctor",
            )),
        }
    }

    fn check_schedule(
        &self,
        draft: &AppointmentDraft,
        now: DateTime<Utc>,
        errors: &mut Vec<FieldError>,
    ) {
        match draft.schedule {
            Some(schedule) if schedule <= now => errors.push(FieldError::new(
                "schedule",
                "Appointment must be scheduled for a future time",
            )),
            Some(_) => {}
            None => errors.push(FieldError::new(
                "schedule",
                "Expected appointment date is required",
            )),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_text_bounds(field: &str, value: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(text) = non_empty(value) {
        let length = text.chars().count();
        if length < TEXT_MIN {
            errors.push(FieldError::new(
                field,
                &format!("Must be at least {} characters", TEXT_MIN),
            ));
        } else if length > TEXT_MAX {
            errors.push(FieldError::new(
                field,
                &format!("Must be at most {} characters", TEXT_MAX),
            ));
        }
    }
}
