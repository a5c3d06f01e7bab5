use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub docstore_endpoint: String,
    pub docstore_project_id: String,
    pub docstore_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            docstore_endpoint: "http://localhost:4000/v1".to_string(),
            docstore_project_id: "test-project".to_string(),
            docstore_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            docstore_endpoint: endpoint.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            docstore_endpoint: self.docstore_endpoint.clone(),
            docstore_project_id: self.docstore_project_id.clone(),
            docstore_api_key: self.docstore_api_key.clone(),
            docstore_database_id: "clinic".to_string(),
            patient_collection_id: "patients".to_string(),
            appointment_collection_id: "appointments".to_string(),
            jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned document-store payloads for wiremock-backed tests.
pub struct MockDocumentResponses;

impl MockDocumentResponses {
    pub fn patient_document(patient_id: &str, user_id: &str, name: &str) -> serde_json::Value {
        json!({
            "$id": patient_id,
            "user_id": user_id,
            "name": name,
            "email": "patient@example.com",
            "phone": "+353871234567",
            "birth_date": "1990-01-01",
            "gender": "other",
            "address": "1 Test Street",
            "occupation": null,
            "emergency_contact_name": null,
            "emergency_contact_number": null,
            "primary_physician": null,
            "insurance_provider": null,
            "insurance_policy_number": null,
            "allergies": null,
            "current_medication": null,
            "family_medical_history": null,
            "past_medical_history": null,
            "identification_type": null,
            "identification_number": null,
            "privacy_consent": true
        })
    }

    pub fn appointment_document(
        appointment_id: &str,
        user_id: &str,
        patient_id: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "$id": appointment_id,
            "user_id": user_id,
            "patient_id": patient_id,
            "primary_physician": "John Green",
            "schedule": "2026-12-25T10:00:00Z",
            "reason": "Annual check-up",
            "note": null,
            "status": status,
            "cancellation_reason": null
        })
    }

    pub fn document_list(documents: Vec<serde_json::Value>) -> serde_json::Value {
        json!({
            "total": documents.len(),
            "documents": documents
        })
    }

    pub fn error_response(message: &str, code: u16) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::validate_token;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.docstore_project_id, "test-project");
        assert_eq!(app_config.appointment_collection_id, "appointments");
        assert!(!app_config.jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::patient("pat@example.com");
        assert_eq!(user.email, "pat@example.com");
        assert_eq!(user.role, "patient");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_roundtrip() {
        let test_user = TestUser::default();
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&test_user, secret, Some(1));

        assert_eq!(token.split('.').count(), 3);

        let user = validate_token(&token, secret).expect("token should validate");
        assert_eq!(user.id, test_user.id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let test_user = TestUser::default();
        let secret = "test-secret";
        let token = JwtTestUtils::create_expired_token(&test_user, secret);

        assert!(validate_token(&token, secret).is_err());
    }
}
