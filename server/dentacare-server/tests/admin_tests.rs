//! Admin password, dashboard sessions and the endpoints they guard

mod common;

use axum::http::{Method, StatusCode};
use dentacare_server::{store::ClinicStore, ServerSettings};
use serde_json::json;

use common::{id_of, test_settings, TestApp};

#[tokio::test]
async fn test_seeded_password_initializes_and_wrong_password_is_rejected() {
    let app = TestApp::new();
    let (_, status) = app.get("/api/config/verify-password").await;
    assert_eq!(status["data"]["configured"], true);
    assert_eq!(status["data"]["valid"], false);

    let (code, wrong) = app
        .post("/api/config/verify-password", json!({ "password": "guess" }))
        .await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["error_code"], "SESSION_2003");

    let (code, first) = app
        .post("/api/config/verify-password", json!({ "password": "clinic-secret" }))
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(first["data"]["initialized"], true);
    let token = first["data"]["session"]["token"].as_str().unwrap().to_string();

    let (code, again) = app
        .post("/api/config/verify-password", json!({ "password": "clinic-secret" }))
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(again["data"]["initialized"], false);

    let (_, status) = app
        .send(Method::GET, "/api/config/verify-password", None, Some(&token))
        .await;
    assert_eq!(status["data"]["configured"], true);
    assert_eq!(status["data"]["valid"], true);
}

#[tokio::test]
async fn test_unlock_refused_when_no_password_is_configured() {
    let app = TestApp::with_settings(ServerSettings::default());
    let (_, status) = app.get("/api/config/verify-password").await;
    assert_eq!(status["data"]["configured"], false);

    let (code, body) = app
        .post("/api/config/verify-password", json!({ "password": "first-caller" }))
        .await;
    assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error_code"], "SESSION_2004");
    assert!(app.store.get_config("admin_password").await.unwrap().is_none());

    let (_, status) = app.get("/api/config/verify-password").await;
    assert_eq!(status["data"]["configured"], false);
}

#[tokio::test]
async fn test_patient_delete_requires_session_and_cascades() {
    let app = TestApp::new();
    let patient_id = app.create_patient(json!({ "name": "Omar" })).await;
    app.create_appointment(json!({
        "patientId": patient_id,
        "date": "2026-03-14",
        "time": "10:30",
        "paymentStatus": "Paid",
        "amount": 700,
    }))
    .await;

    let uri = format!("/api/patients/{patient_id}");
    let (code, body) = app.delete(&uri).await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "SESSION_2001");

    let token = app.admin_session("clinic-secret").await;
    let (code, body) = app.send(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(code, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["appointmentsDeleted"], 1);
    assert_eq!(body["data"]["recordsDeleted"], 1);
    assert!(app.store.list_records(Some(patient_id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_session_is_refused() {
    let app = TestApp::with_settings(ServerSettings {
        admin_session_ttl_minutes: 0,
        ..test_settings()
    });
    let token = app.admin_session("clinic-secret").await;

    let (code, body) = app
        .send(Method::POST, "/api/handover", Some(json!({ "title": "x" })), Some(&token))
        .await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "SESSION_2002");
}

#[tokio::test]
async fn test_rotation_revokes_existing_sessions() {
    let app = TestApp::new();
    let old = app.admin_session("clinic-secret").await;

    let (code, rotated) = app
        .send(
            Method::PUT,
            "/api/config/admin-password",
            Some(json!({ "newPassword": "new-secret" })),
            Some(&old),
        )
        .await;
    assert_eq!(code, StatusCode::OK, "{rotated}");
    let fresh = rotated["data"]["token"].as_str().unwrap().to_string();

    let (code, _) = app
        .send(Method::POST, "/api/handover", Some(json!({ "a": 1 })), Some(&old))
        .await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    let (code, _) = app
        .send(Method::POST, "/api/handover", Some(json!({ "a": 1 })), Some(&fresh))
        .await;
    assert_eq!(code, StatusCode::CREATED);

    let (code, _) = app
        .post("/api/config/verify-password", json!({ "password": "clinic-secret" }))
        .await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    app.admin_session("new-secret").await;
}

#[tokio::test]
async fn test_handover_versions() {
    let app = TestApp::new();
    let (code, _) = app.get("/api/handover/latest").await;
    assert_eq!(code, StatusCode::NOT_FOUND);

    let token = app.admin_session("clinic-secret").await;
    for title in ["Spring", "Summer"] {
        let (code, _) = app
            .send(Method::POST, "/api/handover", Some(json!({ "title": title })), Some(&token))
            .await;
        assert_eq!(code, StatusCode::CREATED);
    }
    let (code, _) = app
        .send(Method::POST, "/api/handover", Some(json!(["not", "an", "object"])), Some(&token))
        .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);

    let (_, latest) = app.get("/api/handover/latest").await;
    assert_eq!(latest["data"]["version"], 2);
    assert_eq!(latest["data"]["payload"]["title"], "Summer");

    let (_, first) = app.get("/api/handover/1").await;
    assert_eq!(first["data"]["payload"]["title"], "Spring");
}

#[tokio::test]
async fn test_treatment_record_crud() {
    let app = TestApp::new();
    let patient_id = app.create_patient(json!({ "name": "Noor" })).await;

    let (code, created) = app
        .post(
            "/api/treatment-records",
            json!({
                "patientId": patient_id,
                "treatmentName": "Root Canal Treatment",
                "date": "2026-02-10",
                "cost": 4500,
                "prescription": "Lignocaine block\nAmoxicillin 500mg TDS",
            }),
        )
        .await;
    assert_eq!(code, StatusCode::CREATED, "{created}");
    let record_id = id_of(&created["data"]);
    let lines = created["data"]["prescriptionLines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);

    let (_, updated) = app
        .put(&format!("/api/treatment-records/{record_id}"), json!({ "cost": 5000 }))
        .await;
    assert_eq!(updated["data"]["cost"], 5000.0);

    let (_, listed) = app.get(&format!("/api/treatment-records?patientId={patient_id}")).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let (code, _) = app.delete(&format!("/api/treatment-records/{record_id}")).await;
    assert_eq!(code, StatusCode::OK);
    let (code, _) = app.get(&format!("/api/treatment-records/{record_id}")).await;
    assert_eq!(code, StatusCode::NOT_FOUND);

    let (_, catalog) = app.get("/api/treatments").await;
    assert!(!catalog["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_and_docs() {
    let app = TestApp::new();
    let (code, body) = app.get("/health").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");

    let (code, doc) = app.get("/api-docs/openapi.json").await;
    assert_eq!(code, StatusCode::OK);
    assert!(doc["paths"]["/api/appointments"].is_object());
}
