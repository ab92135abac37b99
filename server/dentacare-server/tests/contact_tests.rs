//! Inquiry intake, classification and forward-only status

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{id_of, TestApp};

#[tokio::test]
async fn test_phone_match_classifies_submitter() {
    let app = TestApp::new();
    app.create_patient(json!({ "name": "Meera", "contact": "+91 98450 12345" })).await;

    let (status, known) = app
        .post(
            "/api/contacts",
            json!({ "name": "Meera", "phone": "9845012345", "message": "Follow-up please" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(known["data"]["patientType"], "prev");
    assert_eq!(known["data"]["status"], "Unread");

    let (_, stranger) = app
        .post(
            "/api/contacts",
            json!({ "name": "Tom", "phone": "5551234567", "message": "First visit" }),
        )
        .await;
    assert_eq!(stranger["data"]["patientType"], "new");
}

#[tokio::test]
async fn test_status_never_moves_backwards() {
    let app = TestApp::new();
    let patient_id = app.create_patient(json!({ "name": "Lina" })).await;
    let (_, contact) = app
        .post(
            "/api/contacts",
            json!({ "name": "Lina", "phone": "4445556666", "message": "Braces consult" }),
        )
        .await;
    let contact_id = id_of(&contact["data"]);

    let (status, read) = app.put(&format!("/api/contacts/{contact_id}/read"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["data"]["status"], "Read");

    app.create_appointment(json!({
        "patientId": patient_id,
        "date": "2026-05-02",
        "time": "15:00",
        "contactId": contact_id,
    }))
    .await;

    let (_, after) = app.put(&format!("/api/contacts/{contact_id}/read"), json!({})).await;
    assert_eq!(after["data"]["status"], "Scheduled");
    assert!(after["data"]["appointmentId"].is_string());
}

#[tokio::test]
async fn test_invalid_submissions_are_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/contacts", json!({ "name": "", "phone": "12", "message": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_1001");

    let (status, _) = app
        .post(
            "/api/appointments",
            json!({
                "patientId": app.create_patient(json!({ "name": "Z" })).await,
                "date": "2026-05-02",
                "time": "15:00",
                "contactId": uuid::Uuid::new_v4(),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
