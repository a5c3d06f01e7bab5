use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::documents::{query_equal, DocumentClient, DocumentList};

use crate::models::{CreatePatientRequest, Patient, PatientError};

pub struct PatientService {
    client: DocumentClient,
    collection_id: String,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: DocumentClient::new(config),
            collection_id: config.patient_collection_id.clone(),
        }
    }

    /// Create the patient record for a user. One record per user; one record
    /// per email address.
    pub async fn create_patient(
        &self,
        user_id: &str,
        request: CreatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient record for user: {}", user_id);

        if request.name.trim().is_empty() {
            return Err(PatientError::ValidationError("Name is required".to_string()));
        }
        if request.email.trim().is_empty() {
            return Err(PatientError::ValidationError("Email is required".to_string()));
        }
        if request.phone.trim().is_empty() {
            return Err(PatientError::ValidationError("Phone number is required".to_string()));
        }

        let existing: DocumentList<Patient> = self
            .client
            .list_documents(&self.collection_id, &[query_equal("email", &request.email)])
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if existing.total > 0 {
            return Err(PatientError::EmailAlreadyExists {
                email: request.email,
            });
        }

        let patient_data = json!({
            "user_id": user_id,
            "name": request.name,
            "email": request.email,
            "phone": request.phone,
            "birth_date": request.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            "gender": request.gender,
            "address": request.address,
            "occupation": request.occupation,
            "emergency_contact_name": request.emergency_contact_name,
            "emergency_contact_number": request.emergency_contact_number,
            "primary_physician": request.primary_physician,
            "insurance_provider": request.insurance_provider,
            "insurance_policy_number": request.insurance_policy_number,
            "allergies": request.allergies,
            "current_medication": request.current_medication,
            "family_medical_history": request.family_medical_history,
            "past_medical_history": request.past_medical_history,
            "identification_type": request.identification_type,
            "identification_number": request.identification_number,
            "privacy_consent": request.privacy_consent,
        });

        let patient: Patient = self
            .client
            .create_document(&self.collection_id, patient_data)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        debug!("Patient record created with ID: {}", patient.id);
        Ok(patient)
    }

    /// Look up the patient record bound to a user identifier.
    pub async fn get_patient_by_user(&self, user_id: &str) -> Result<Patient, PatientError> {
        debug!("Fetching patient record for user: {}", user_id);

        let result: DocumentList<Patient> = self
            .client
            .list_documents(&self.collection_id, &[query_equal("user_id", user_id)])
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        result
            .documents
            .into_iter()
            .next()
            .ok_or(PatientError::NotFound)
    }
}
