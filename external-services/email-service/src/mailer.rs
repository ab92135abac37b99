// Contract between the appointment workflow and whatever delivers mail
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EmailResult;

/// Which appointment event the email announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentEmailKind {
    /// New booking confirmation (also used for explicit resends)
    Scheduled,
    /// Date or time changed
    Rescheduled,
}

impl fmt::Display for AppointmentEmailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentEmailKind::Scheduled => write!(f, "Scheduled"),
            AppointmentEmailKind::Rescheduled => write!(f, "Rescheduled"),
        }
    }
}

/// Appointment details rendered into the email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentEmail {
    pub date: NaiveDate,
    /// `HH:MM`, as shown to the patient
    pub time: String,
    pub reason: String,
    pub status: AppointmentEmailKind,
}

/// Sends appointment notifications; returns the provider message id
#[async_trait]
pub trait AppointmentMailer: Send + Sync {
    async fn send_appointment_email(
        &self,
        to_address: &str,
        patient_name: &str,
        appointment: &AppointmentEmail,
    ) -> EmailResult<String>;
}
