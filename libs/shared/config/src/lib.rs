use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub docstore_endpoint: String,
    pub docstore_project_id: String,
    pub docstore_api_key: String,
    pub docstore_database_id: String,
    pub patient_collection_id: String,
    pub appointment_collection_id: String,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            docstore_endpoint: env::var("DOCSTORE_ENDPOINT")
                .unwrap_or_else(|_| {
                    warn!("DOCSTORE_ENDPOINT not set, using empty value");
                    String::new()
                }),
            docstore_project_id: env::var("DOCSTORE_PROJECT_ID")
                .unwrap_or_else(|_| {
                    warn!("DOCSTORE_PROJECT_ID not set, using empty value");
                    String::new()
                }),
            docstore_api_key: env::var("DOCSTORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("DOCSTORE_API_KEY not set, using empty value");
                    String::new()
                }),
            docstore_database_id: env::var("DOCSTORE_DATABASE_ID")
                .unwrap_or_else(|_| {
                    warn!("DOCSTORE_DATABASE_ID not set, using default");
                    "clinic".to_string()
                }),
            patient_collection_id: env::var("PATIENT_COLLECTION_ID")
                .unwrap_or_else(|_| {
                    warn!("PATIENT_COLLECTION_ID not set, using default");
                    "patients".to_string()
                }),
            appointment_collection_id: env::var("APPOINTMENT_COLLECTION_ID")
                .unwrap_or_else(|_| {
                    warn!("APPOINTMENT_COLLECTION_ID not set, using default");
                    "appointments".to_string()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.docstore_endpoint.is_empty()
            && !self.docstore_project_id.is_empty()
            && !self.docstore_api_key.is_empty()
            && !self.jwt_secret.is_empty()
    }
}
