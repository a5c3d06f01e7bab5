// libs/appointment-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::FieldError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Appointment record as stored in the document database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    pub patient_id: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
}

/// The form's three operating modes. Closed set; anything else is rejected
/// during parsing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentMode {
    Create,
    Cancel,
    Schedule,
}

impl fmt::Display for AppointmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentMode::Create => write!(f, "create"),
            AppointmentMode::Cancel => write!(f, "cancel"),
            AppointmentMode::Schedule => write!(f, "schedule"),
        }
    }
}

impl FromStr for AppointmentMode {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AppointmentMode::Create),
            "cancel" => Ok(AppointmentMode::Cancel),
            "schedule" => Ok(AppointmentMode::Schedule),
            other => Err(AppointmentError::UnknownMode(other.to_string())),
        }
    }
}

/// Appointment status. Derived from the submission mode; no request type
/// carries a status, so it is never client-settable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Cancelled,
}

impl From<AppointmentMode> for AppointmentStatus {
    fn from(mode: AppointmentMode) -> Self {
        match mode {
            AppointmentMode::Create => AppointmentStatus::Pending,
            AppointmentMode::Cancel => AppointmentStatus::Cancelled,
            AppointmentMode::Schedule => AppointmentStatus::Scheduled,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Raw form values. Constructed fresh per submission; which fields matter is
/// decided by the mode during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub primary_physician: Option<String>,
    pub schedule: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAppointmentRequest {
    pub mode: AppointmentMode,
    /// One per form mount. Used to admit a single in-flight submission.
    pub submission_id: Uuid,
    pub patient_id: Option<String>,
    /// Target of a cancel/schedule submission.
    pub appointment_id: Option<String>,
    #[serde(flatten)]
    pub draft: AppointmentDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAppointmentResponse {
    pub appointment: Appointment,
    /// Success route for a created appointment; absent for other modes.
    pub redirect_to: Option<String>,
}

// ==============================================================================
// FORM PLAN MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Select,
    DatePicker,
    Textarea,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
}

impl FormField {
    pub fn new(name: &str, label: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required,
            placeholder: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }
}

/// What the client renders for a given mode: derived status, the ordered
/// field set, and the submit-button label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormPlan {
    pub mode: AppointmentMode,
    pub status: AppointmentStatus,
    pub submit_label: String,
    pub fields: Vec<FormField>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Unknown appointment mode: {0}")]
    UnknownMode(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("A submission for this form is already in flight")]
    SubmissionInFlight,

    #[error("Appointment not found")]
    NotFound,

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
