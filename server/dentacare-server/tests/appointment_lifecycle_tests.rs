//! Appointment lifecycle over HTTP: payment-driven treatment records,
//! reschedule notifications and explicit resends.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use dentacare_server::{store::ClinicStore, ServerSettings};
use email_service::AppointmentEmailKind;
use serde_json::json;
use uuid::Uuid;

use common::{id_of, test_settings, TestApp};

async fn patient_with_email(app: &TestApp, email: Option<&str>) -> Uuid {
    app.create_patient(json!({
        "name": "Priya Shah",
        "contact": "9876500000",
        "email": email,
    }))
    .await
}

#[tokio::test]
async fn test_paid_update_generates_and_revert_removes_record() {
    let app = TestApp::new();
    let patient_id = patient_with_email(&app, None).await;

    let created = app
        .create_appointment(json!({
            "patientId": patient_id,
            "date": "2026-03-14",
            "time": "10:30",
            "reason": "Cleaning",
        }))
        .await;
    let appointment_id = id_of(&created["appointment"]);
    assert_eq!(created["appointment"]["paymentStatus"], "None");
    assert!(app.store.records_for_appointment(appointment_id).await.unwrap().is_empty());

    let (status, updated) = app
        .put(
            &format!("/api/appointments/{appointment_id}"),
            json!({ "paymentStatus": "Paid", "amount": 500 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!(updated["data"]["appointment"]["markedPaidAt"].is_string());

    let records = app.store.records_for_appointment(appointment_id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cost, 500.0);
    assert_eq!(records[0].patient_id, patient_id);

    // Paying twice must not produce a second record
    app.put(
        &format!("/api/appointments/{appointment_id}"),
        json!({ "paymentStatus": "Paid" }),
    )
    .await;
    assert_eq!(app.store.records_for_appointment(appointment_id).await.unwrap().len(), 1);

    let (status, reverted) = app
        .put(
            &format!("/api/appointments/{appointment_id}"),
            json!({ "paymentStatus": "Pending" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reverted["data"]["appointment"]["markedPaidAt"].is_null());
    assert!(app.store.records_for_appointment(appointment_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_amount_change_refreshes_generated_record() {
    let app = TestApp::new();
    let patient_id = patient_with_email(&app, None).await;
    let created = app
        .create_appointment(json!({
            "patientId": patient_id,
            "date": "2026-03-14",
            "time": "09:00",
            "reason": "Filling",
            "paymentStatus": "Paid",
            "amount": 1200,
        }))
        .await;
    let appointment_id = id_of(&created["appointment"]);
    assert_eq!(app.store.records_for_appointment(appointment_id).await.unwrap()[0].cost, 1200.0);

    app.put(&format!("/api/appointments/{appointment_id}"), json!({ "amount": 1500 }))
        .await;
    let records = app.store.records_for_appointment(appointment_id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cost, 1500.0);
}

#[tokio::test]
async fn test_completed_status_stamps_completion_time() {
    let app = TestApp::new();
    let patient_id = patient_with_email(&app, None).await;
    let created = app
        .create_appointment(json!({ "patientId": patient_id, "date": "2026-03-14", "time": "11:00" }))
        .await;
    let uri = format!("/api/appointments/{}", id_of(&created["appointment"]));

    let (_, done) = app.put(&uri, json!({ "status": "Completed" })).await;
    let completed_at = done["data"]["appointment"]["completedAt"].clone();
    assert!(completed_at.is_string());

    let (_, again) = app.put(&uri, json!({ "status": "Completed", "isTicked": true })).await;
    assert_eq!(again["data"]["appointment"]["completedAt"], completed_at);

    let (_, reopened) = app.put(&uri, json!({ "status": "Operating" })).await;
    assert!(reopened["data"]["appointment"]["completedAt"].is_null());
    assert_eq!(reopened["data"]["appointment"]["isTicked"], true);
}

#[tokio::test]
async fn test_reschedule_emails_patient_and_marks_contact() {
    let app = TestApp::new();
    let patient_id = patient_with_email(&app, Some("p@x.com")).await;

    let (status, contact) = app
        .post(
            "/api/contacts",
            json!({ "name": "Priya Shah", "phone": "9876500000", "message": "Need a cleaning" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let contact_id = id_of(&contact["data"]);

    let created = app
        .create_appointment(json!({
            "patientId": patient_id,
            "date": "2026-03-14",
            "time": "10:30",
            "reason": "Cleaning",
            "contactId": contact_id,
        }))
        .await;
    assert_eq!(created["emailSentTo"], "p@x.com");
    assert!(app.wait_for_email_sent(contact_id, true).await);

    let stored = app.store.get_contact(contact_id).await.unwrap().unwrap();
    assert_eq!(stored.appointment_id, Some(id_of(&created["appointment"])));

    let (status, updated) = app
        .put(
            &format!("/api/appointments/{}", id_of(&created["appointment"])),
            json!({ "date": "2026-03-15", "time": "16:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["emailSentTo"], "p@x.com");
    assert!(app.wait_for_email_sent(contact_id, true).await);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].kind, AppointmentEmailKind::Scheduled);
    assert_eq!(sent[1].kind, AppointmentEmailKind::Rescheduled);
    assert_eq!(sent[1].time, "16:00");
}

#[tokio::test]
async fn test_failed_background_send_leaves_contact_unsent() {
    let app = TestApp::with_failing_mailer();
    let patient_id = patient_with_email(&app, Some("p@x.com")).await;
    let (_, contact) = app
        .post(
            "/api/contacts",
            json!({ "name": "Priya", "phone": "9876500000", "message": "Hello" }),
        )
        .await;
    let contact_id = id_of(&contact["data"]);

    let created = app
        .create_appointment(json!({
            "patientId": patient_id,
            "date": "2026-03-14",
            "time": "10:30",
            "contactId": contact_id,
        }))
        .await;
    // The create itself succeeds regardless of the mail outcome
    assert_eq!(created["emailSentTo"], "p@x.com");
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!app.store.get_contact(contact_id).await.unwrap().unwrap().email_sent);
}

#[tokio::test]
async fn test_failed_reschedule_email_resets_contact_flag() {
    let app = TestApp::with_failing_mailer();
    let patient_id = patient_with_email(&app, Some("p@x.com")).await;
    let (_, contact) = app
        .post(
            "/api/contacts",
            json!({ "name": "Priya", "phone": "9876500000", "message": "Hello" }),
        )
        .await;
    let contact_id = id_of(&contact["data"]);
    let created = app
        .create_appointment(json!({
            "patientId": patient_id,
            "date": "2026-03-14",
            "time": "10:30",
            "contactId": contact_id,
        }))
        .await;

    // The original confirmation went out before the relay started failing
    assert!(app.store.set_contact_email_sent(contact_id, true).await.unwrap());

    let (status, updated) = app
        .put(
            &format!("/api/appointments/{}", id_of(&created["appointment"])),
            json!({ "time": "15:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["emailSentTo"], "p@x.com");
    assert!(!app.store.get_contact(contact_id).await.unwrap().unwrap().email_sent);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!app.store.get_contact(contact_id).await.unwrap().unwrap().email_sent);
}

#[tokio::test]
async fn test_resend_reports_missing_address_and_delivery_failure() {
    let app = TestApp::new();
    let no_email = patient_with_email(&app, None).await;
    let created = app
        .create_appointment(json!({ "patientId": no_email, "date": "2026-03-14", "time": "10:30" }))
        .await;
    assert!(created.get("emailSentTo").is_none());

    let (status, body) = app
        .send(
            axum::http::Method::POST,
            &format!("/api/appointments/{}/resend", id_of(&created["appointment"])),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let failing = TestApp::with_failing_mailer();
    let patient_id = patient_with_email(&failing, Some("p@x.com")).await;
    let created = failing
        .create_appointment(json!({ "patientId": patient_id, "date": "2026-03-14", "time": "10:30" }))
        .await;
    let (status, body) = failing
        .post(
            &format!("/api/appointments/{}/resend", id_of(&created["appointment"])),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_code"], "NOTIFY_5001");
}

#[tokio::test]
async fn test_resend_succeeds_with_message_id() {
    let app = TestApp::new();
    let patient_id = patient_with_email(&app, Some("p@x.com")).await;
    let created = app
        .create_appointment(json!({ "patientId": patient_id, "date": "2026-03-14", "time": "10:30" }))
        .await;

    let (status, body) = app
        .post(
            &format!("/api/appointments/{}/resend", id_of(&created["appointment"])),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["emailSentTo"], "p@x.com");
    assert!(body["data"]["messageId"].as_str().unwrap().starts_with("msg-"));
}

#[tokio::test]
async fn test_delete_keeps_generated_record() {
    let app = TestApp::new();
    let patient_id = patient_with_email(&app, None).await;
    let created = app
        .create_appointment(json!({
            "patientId": patient_id,
            "date": "2026-03-14",
            "time": "10:30",
            "paymentStatus": "Paid",
            "amount": 300,
        }))
        .await;
    let appointment_id = id_of(&created["appointment"]);

    let (status, body) = app.delete(&format!("/api/appointments/{appointment_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, _) = app.get(&format!("/api/appointments/{appointment_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.records_for_appointment(appointment_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let app = TestApp::new();
    let (status, _) = app
        .post(
            "/api/appointments",
            json!({ "patientId": Uuid::new_v4(), "date": "2026-03-14", "time": "10:30" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let patient_id = patient_with_email(&app, None).await;
    let (status, body) = app
        .post(
            "/api/appointments",
            json!({ "patientId": patient_id, "date": "2026-03-14", "time": "25:99" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_1001");
}

#[tokio::test]
async fn test_past_scheduled_appointment_reads_as_delayed() {
    let app = TestApp::new();
    let patient_id = patient_with_email(&app, None).await;
    let created = app
        .create_appointment(json!({ "patientId": patient_id, "date": "2020-01-01", "time": "08:00" }))
        .await;
    assert_eq!(created["appointment"]["status"], "Scheduled");
    assert_eq!(created["appointment"]["displayStatus"], "Delayed");

    let (_, stats) = app.get("/api/appointments/stats").await;
    assert_eq!(stats["data"]["delayed"], 1);
    assert_eq!(stats["data"]["scheduled"], 1);
}

#[tokio::test]
async fn test_delay_follows_clinic_wall_clock() {
    let app = TestApp::with_settings(ServerSettings {
        clinic_utc_offset_minutes: 330,
        ..test_settings()
    });
    let patient_id = patient_with_email(&app, None).await;

    // An hour ago at the clinic, still hours ahead if read as UTC
    let slot = Utc::now() + Duration::minutes(330 - 60);
    let created = app
        .create_appointment(json!({
            "patientId": patient_id,
            "date": slot.format("%Y-%m-%d").to_string(),
            "time": slot.format("%H:%M").to_string(),
        }))
        .await;
    assert_eq!(created["appointment"]["displayStatus"], "Delayed");

    let (_, stats) = app
        .get(&format!("/api/appointments/stats?date={}", slot.format("%Y-%m-%d")))
        .await;
    assert_eq!(stats["data"]["delayed"], 1);
    assert_eq!(stats["data"]["today"], 1);
}

#[tokio::test]
async fn test_patient_listing_and_unknown_patient() {
    let app = TestApp::new();
    let patient_id = patient_with_email(&app, None).await;
    app.create_appointment(json!({ "patientId": patient_id, "date": "2026-03-14", "time": "10:30" }))
        .await;
    app.create_appointment(json!({ "patientId": patient_id, "date": "2026-03-13", "time": "10:30" }))
        .await;

    let (status, body) = app.get(&format!("/api/appointments/patient/{patient_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["date"], "2026-03-13");

    let (status, _) = app
        .get(&format!("/api/appointments/patient/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
