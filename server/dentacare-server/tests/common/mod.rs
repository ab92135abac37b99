//! Shared harness for the HTTP-level tests: an in-memory app with a
//! mailer that records or fails every send.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use email_service::{AppointmentEmail, AppointmentEmailKind, AppointmentMailer, EmailError, EmailResult};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use dentacare_server::{
    create_app,
    middleware::ADMIN_SESSION_HEADER,
    store::{ClinicStore, InMemoryStore},
    DentaCareServer, ServerSettings,
};

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub patient_name: String,
    pub kind: AppointmentEmailKind,
    pub time: String,
}

/// Accepts every send and remembers it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl AppointmentMailer for RecordingMailer {
    async fn send_appointment_email(
        &self,
        to_address: &str,
        patient_name: &str,
        appointment: &AppointmentEmail,
    ) -> EmailResult<String> {
        let mut sent = self.sent.lock();
        sent.push(SentEmail {
            to: to_address.to_string(),
            patient_name: patient_name.to_string(),
            kind: appointment.status,
            time: appointment.time.clone(),
        });
        Ok(format!("msg-{}", sent.len()))
    }
}

/// Rejects every send, like an unreachable SMTP relay
pub struct FailingMailer;

#[async_trait]
impl AppointmentMailer for FailingMailer {
    async fn send_appointment_email(&self, _: &str, _: &str, _: &AppointmentEmail) -> EmailResult<String> {
        Err(EmailError::SendFailed("connection refused".to_string()))
    }
}

pub const ADMIN_PASSWORD: &str = "clinic-secret";

/// Defaults with the admin password seeded
pub fn test_settings() -> ServerSettings {
    ServerSettings {
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        ..ServerSettings::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: ServerSettings) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let (router, store) = build(settings, mailer.clone());
        Self { router, store, mailer }
    }

    /// App whose mailer always fails; `mailer` stays empty
    pub fn with_failing_mailer() -> Self {
        let (router, store) = build(test_settings(), Arc::new(FailingMailer));
        Self {
            router,
            store,
            mailer: Arc::new(RecordingMailer::default()),
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>, session: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = session {
            builder = builder.header(ADMIN_SESSION_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None, None).await
    }

    /// Unlock the dashboard and return the session token
    pub async fn admin_session(&self, password: &str) -> String {
        let (status, body) = self
            .post("/api/config/verify-password", json!({ "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK, "unlock failed: {body}");
        body["data"]["session"]["token"].as_str().unwrap().to_string()
    }

    /// Admin intake; returns the new patient's id
    pub async fn create_patient(&self, body: Value) -> Uuid {
        let (status, body) = self.post("/api/patients", body).await;
        assert_eq!(status, StatusCode::CREATED, "patient create failed: {body}");
        id_of(&body["data"])
    }

    pub async fn create_appointment(&self, body: Value) -> Value {
        let (status, body) = self.post("/api/appointments", body).await;
        assert_eq!(status, StatusCode::CREATED, "appointment create failed: {body}");
        body["data"].clone()
    }

    /// Poll until the background send has written back to the contact
    pub async fn wait_for_email_sent(&self, contact_id: Uuid, expected: bool) -> bool {
        for _ in 0..100 {
            let contact = self.store.get_contact(contact_id).await.unwrap().unwrap();
            if contact.email_sent == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

fn build(settings: ServerSettings, mailer: Arc<dyn AppointmentMailer>) -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let server = DentaCareServer::new(settings, store.clone(), mailer);
    (create_app(server), store)
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}
