use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers::*;
use appointment_cell::models::*;
use appointment_cell::services::submission::{AppointmentSubmissionService, SubmissionGuard};
use assert_matches::assert_matches;
use doctor_cell::DoctorDirectory;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockDocumentResponses, TestConfig, TestUser};

const APPOINTMENTS_PATH: &str = "/databases/clinic/collections/appointments/documents";

fn test_setup(mock_server: &MockServer) -> (Arc<AppConfig>, Arc<DoctorDirectory>, Arc<SubmissionGuard>) {
    let config = TestConfig::with_endpoint(&mock_server.uri()).to_arc();
    let directory = Arc::new(DoctorDirectory::seeded());
    let guard = Arc::new(SubmissionGuard::new());
    (config, directory, guard)
}

fn patient_user() -> (User, Extension<User>) {
    let user = TestUser::patient("patient@example.com").to_user();
    (user.clone(), Extension(user))
}

fn create_request(patient_id: Option<&str>) -> SubmitAppointmentRequest {
    SubmitAppointmentRequest {
        mode: AppointmentMode::Create,
        submission_id: Uuid::new_v4(),
        patient_id: patient_id.map(str::to_string),
        appointment_id: None,
        draft: AppointmentDraft {
            primary_physician: Some("John Green".to_string()),
            schedule: Some(Utc::now() + Duration::days(3)),
            reason: Some("Annual check-up".to_string()),
            note: None,
            cancellation_reason: None,
        },
    }
}

#[tokio::test]
async fn create_submission_creates_document_and_redirects() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (user, user_ext) = patient_user();

    Mock::given(method("POST"))
        .and(path(APPOINTMENTS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockDocumentResponses::appointment_document("appt-1", &user.id, "pat-1", "pending"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = submit_appointment(
        State(config),
        user_ext,
        Extension(directory),
        Extension(guard),
        Json(create_request(Some("pat-1"))),
    )
    .await;

    let Json(body) = result.expect("create submission should succeed");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["appointment"]["status"], json!("pending"));
    assert_eq!(
        body["redirect_to"],
        json!(format!(
            "/patients/{}/new-appointment/success?appointmentId=appt-1",
            user.id
        ))
    );
}

#[tokio::test]
async fn cancel_submission_never_invokes_the_create_operation() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (user, user_ext) = patient_user();

    // The create operation must stay untouched by a cancel submission
    Mock::given(method("POST"))
        .and(path(APPOINTMENTS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/appt-9", APPOINTMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockDocumentResponses::appointment_document("appt-9", &user.id, "pat-1", "pending"),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/appt-9", APPOINTMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockDocumentResponses::appointment_document("appt-9", &user.id, "pat-1", "cancelled"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = SubmitAppointmentRequest {
        mode: AppointmentMode::Cancel,
        submission_id: Uuid::new_v4(),
        patient_id: None,
        appointment_id: Some("appt-9".to_string()),
        draft: AppointmentDraft {
            cancellation_reason: Some("Feeling better".to_string()),
            ..AppointmentDraft::default()
        },
    };

    let result = submit_appointment(
        State(config),
        user_ext,
        Extension(directory),
        Extension(guard),
        Json(request),
    )
    .await;

    let Json(body) = result.expect("cancel submission should succeed");
    assert_eq!(body["appointment"]["status"], json!("cancelled"));
    assert_eq!(body["redirect_to"], json!(null));
}

#[tokio::test]
async fn create_without_patient_never_reaches_the_store() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (_user, user_ext) = patient_user();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    for patient_id in [None, Some("")] {
        let result = submit_appointment(
            State(config.clone()),
            user_ext.clone(),
            Extension(directory.clone()),
            Extension(guard.clone()),
            Json(create_request(patient_id)),
        )
        .await;

        let err = result.expect_err("create without a patient must be rejected");
        assert_matches!(err, AppError::Validation(fields) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "patient_id");
        });
    }
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_store() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (_user, user_ext) = patient_user();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let request = SubmitAppointmentRequest {
        mode: AppointmentMode::Create,
        submission_id: Uuid::new_v4(),
        patient_id: Some("pat-1".to_string()),
        appointment_id: None,
        draft: AppointmentDraft::default(),
    };

    let result = submit_appointment(
        State(config),
        user_ext,
        Extension(directory),
        Extension(guard),
        Json(request),
    )
    .await;

    let err = result.expect_err("empty draft must be rejected");
    assert_matches!(err, AppError::Validation(fields) => {
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["primary_physician", "schedule"]);
    });
}

#[tokio::test]
async fn failed_create_allows_a_manual_retry() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (user, _user_ext) = patient_user();

    Mock::given(method("POST"))
        .and(path(APPOINTMENTS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockDocumentResponses::error_response("store unavailable", 500),
        ))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(APPOINTMENTS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockDocumentResponses::appointment_document("appt-2", &user.id, "pat-1", "pending"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service =
        AppointmentSubmissionService::new(&config, directory.clone(), guard.clone());

    let request = create_request(Some("pat-1"));

    let first = service.submit(&user.id, request.clone()).await;
    assert_matches!(first, Err(AppointmentError::DatabaseError(_)));

    // Same form instance retries after the failure
    let second = service.submit(&user.id, request).await;
    let response = second.expect("retry should succeed once the store recovers");
    assert_eq!(response.appointment.id, "appt-2");
}

#[tokio::test]
async fn duplicate_submission_results_in_exactly_one_store_call() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (user, _user_ext) = patient_user();

    Mock::given(method("POST"))
        .and(path(APPOINTMENTS_PATH))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(MockDocumentResponses::appointment_document(
                    "appt-3", &user.id, "pat-1", "pending",
                ))
                .set_delay(std::time::Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Two concurrent requests from the same form instance share one
    // submission id and one guard
    let request = create_request(Some("pat-1"));
    let service_a =
        AppointmentSubmissionService::new(&config, directory.clone(), guard.clone());
    let service_b =
        AppointmentSubmissionService::new(&config, directory.clone(), guard.clone());

    let (first, second) = futures::join!(
        service_a.submit(&user.id, request.clone()),
        service_b.submit(&user.id, request.clone()),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(AppointmentError::SubmissionInFlight))));
}

#[tokio::test]
async fn schedule_submission_patches_the_target_appointment() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (user, user_ext) = patient_user();

    Mock::given(method("GET"))
        .and(path(format!("{}/appt-5", APPOINTMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockDocumentResponses::appointment_document("appt-5", &user.id, "pat-1", "pending"),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/appt-5", APPOINTMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockDocumentResponses::appointment_document("appt-5", &user.id, "pat-1", "scheduled"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = SubmitAppointmentRequest {
        mode: AppointmentMode::Schedule,
        submission_id: Uuid::new_v4(),
        patient_id: None,
        appointment_id: Some("appt-5".to_string()),
        draft: AppointmentDraft {
            primary_physician: Some("Jane Powell".to_string()),
            schedule: Some(Utc::now() + Duration::days(5)),
            ..AppointmentDraft::default()
        },
    };

    let result = submit_appointment(
        State(config),
        user_ext,
        Extension(directory),
        Extension(guard),
        Json(request),
    )
    .await;

    let Json(body) = result.expect("schedule submission should succeed");
    assert_eq!(body["appointment"]["status"], json!("scheduled"));
}

#[tokio::test]
async fn cancel_of_another_users_appointment_is_rejected() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (_user, user_ext) = patient_user();

    Mock::given(method("GET"))
        .and(path(format!("{}/appt-7", APPOINTMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockDocumentResponses::appointment_document(
                "appt-7",
                "someone-else",
                "pat-2",
                "pending",
            ),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let request = SubmitAppointmentRequest {
        mode: AppointmentMode::Cancel,
        submission_id: Uuid::new_v4(),
        patient_id: None,
        appointment_id: Some("appt-7".to_string()),
        draft: AppointmentDraft {
            cancellation_reason: Some("Feeling better".to_string()),
            ..AppointmentDraft::default()
        },
    };

    let result = submit_appointment(
        State(config),
        user_ext,
        Extension(directory),
        Extension(guard),
        Json(request),
    )
    .await;

    assert_matches!(result.expect_err("foreign appointment"), AppError::Auth(_));
}

#[tokio::test]
async fn form_plan_reflects_the_mode() {
    for (mode, status, required) in [
        ("create", "pending", vec!["primary_physician", "schedule"]),
        ("schedule", "scheduled", vec!["primary_physician", "schedule"]),
        ("cancel", "cancelled", vec!["cancellation_reason"]),
    ] {
        let Json(body) = get_form_plan(Path(mode.to_string()))
            .await
            .expect("known mode");

        assert_eq!(body["status"], json!(status));
        let required_fields: Vec<String> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|f| f["required"] == json!(true))
            .map(|f| f["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(required_fields, required);
    }
}

#[tokio::test]
async fn unknown_form_mode_is_a_bad_request() {
    let result = get_form_plan(Path("follow-up".to_string())).await;
    assert_matches!(result.expect_err("unknown mode"), AppError::BadRequest(_));
}

#[test]
fn unknown_mode_is_rejected_during_deserialization() {
    let raw = json!({
        "mode": "followup",
        "submission_id": Uuid::new_v4(),
        "patient_id": "pat-1",
        "primary_physician": "John Green",
        "schedule": "2026-12-25T10:00:00Z"
    });

    assert!(serde_json::from_value::<SubmitAppointmentRequest>(raw).is_err());
}

#[tokio::test]
async fn get_appointment_maps_missing_documents_to_not_found() {
    let mock_server = MockServer::start().await;
    let (config, directory, guard) = test_setup(&mock_server);
    let (_user, user_ext) = patient_user();

    Mock::given(method("GET"))
        .and(path(format!("{}/missing", APPOINTMENTS_PATH)))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            MockDocumentResponses::error_response("Document not found", 404),
        ))
        .mount(&mock_server)
        .await;

    let result = get_appointment(
        State(config),
        user_ext,
        Extension(directory),
        Extension(guard),
        Path("missing".to_string()),
    )
    .await;

    assert_matches!(result.expect_err("missing document"), AppError::NotFound(_));
}
