//! Appointment email dispatch
//!
//! Create and reschedule send in a detached task once the appointment is
//! committed; the outcome is written back to the linked contact's
//! `email_sent` flag. Resend awaits delivery and reports failures.

use email_service::{AppointmentEmail, AppointmentEmailKind, AppointmentMailer};
use logger_redacted::mask_email;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Appointment, Patient};
use crate::store::ClinicStore;

/// One email to send, plus the contact whose flag tracks it
#[derive(Debug, Clone)]
pub struct EmailJob {
    pub to: String,
    pub patient_name: String,
    pub email: AppointmentEmail,
    pub contact_id: Option<Uuid>,
}

impl EmailJob {
    /// `None` when the patient has no email on file
    pub fn for_appointment(
        appointment: &Appointment,
        patient: &Patient,
        kind: AppointmentEmailKind,
        contact_id: Option<Uuid>,
    ) -> Option<Self> {
        let to = patient.email.clone().filter(|e| !e.is_empty())?;
        Some(Self {
            to,
            patient_name: patient.name.clone(),
            email: AppointmentEmail {
                date: appointment.date,
                time: appointment.time.format("%H:%M").to_string(),
                reason: appointment.reason.clone(),
                status: kind,
            },
            contact_id,
        })
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    mailer: Arc<dyn AppointmentMailer>,
    store: Arc<dyn ClinicStore>,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn AppointmentMailer>, store: Arc<dyn ClinicStore>) -> Self {
        Self { mailer, store }
    }

    /// Fire-and-forget send. Failures are logged and never reach the caller.
    pub fn spawn_appointment_email(&self, job: EmailJob) -> JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            match mailer
                .send_appointment_email(&job.to, &job.patient_name, &job.email)
                .await
            {
                Ok(message_id) => {
                    info!(
                        to = %mask_email(&job.to),
                        kind = %job.email.status,
                        message_id = %message_id,
                        "Appointment email delivered"
                    );
                    if let Some(contact_id) = job.contact_id {
                        mark_contact_sent(store.as_ref(), contact_id).await;
                    }
                }
                Err(e) => {
                    warn!(
                        to = %mask_email(&job.to),
                        kind = %job.email.status,
                        error = %e,
                        "Appointment email failed; contact stays unsent"
                    );
                }
            }
        })
    }

    /// Awaited send used by explicit resends
    pub async fn send_now(&self, job: &EmailJob) -> ApiResult<String> {
        let message_id = self
            .mailer
            .send_appointment_email(&job.to, &job.patient_name, &job.email)
            .await
            .map_err(|e| ApiError::email_delivery(e.to_string()))?;

        info!(to = %mask_email(&job.to), message_id = %message_id, "Appointment email resent");
        if let Some(contact_id) = job.contact_id {
            mark_contact_sent(self.store.as_ref(), contact_id).await;
        }
        Ok(message_id)
    }
}

async fn mark_contact_sent(store: &dyn ClinicStore, contact_id: Uuid) {
    match store.set_contact_email_sent(contact_id, true).await {
        Ok(true) => debug!(contact_id = %contact_id, "Contact marked email_sent"),
        Ok(false) => warn!(contact_id = %contact_id, "Contact vanished before email_sent could be recorded"),
        Err(e) => warn!(contact_id = %contact_id, error = %e, "Failed to record email_sent"),
    }
}
