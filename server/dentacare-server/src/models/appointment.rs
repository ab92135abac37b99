//! Appointment record and its derived-state rules

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Stored lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "appointment_status")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Operating,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "payment_status")]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "None")]
    #[sqlx(rename = "None")]
    Unpaid,
    Pending,
    Paid,
}

/// Status shown to staff; `Delayed` is computed, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DisplayStatus {
    Scheduled,
    Delayed,
    Operating,
    Completed,
    Cancelled,
}

/// `HH:MM` wire format for appointment times
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:30")]
    pub time: NaiveTime,
    pub patient_id: Uuid,
    /// Treatment names joined by `, `, optionally followed by `(note)`
    pub reason: String,
    pub status: AppointmentStatus,
    /// Queue-completion flag, independent of `status`
    pub is_ticked: bool,
    pub amount: f64,
    pub payment_status: PaymentStatus,
    pub marked_paid_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Inquiry this appointment was converted from
    pub contact_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(patient_id: Uuid, date: NaiveDate, time: NaiveTime, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            time,
            patient_id,
            reason: reason.into(),
            status: AppointmentStatus::Scheduled,
            is_ticked: false,
            amount: 0.0,
            payment_status: PaymentStatus::Unpaid,
            marked_paid_at: None,
            completed_at: None,
            contact_id: None,
            created_at: Utc::now(),
        }
    }

    /// Set the payment status and keep `marked_paid_at` in step with it.
    /// Re-applying `Paid` keeps the original instant.
    pub fn apply_payment_status(&mut self, status: PaymentStatus, now: DateTime<Utc>) {
        self.marked_paid_at = match status {
            PaymentStatus::Paid => self
                .marked_paid_at
                .filter(|_| self.payment_status == PaymentStatus::Paid)
                .or(Some(now)),
            _ => None,
        };
        self.payment_status = status;
    }

    /// Set the lifecycle status and keep `completed_at` in step with it
    pub fn apply_status(&mut self, status: AppointmentStatus, now: DateTime<Utc>) {
        self.completed_at = match status {
            AppointmentStatus::Completed => self
                .completed_at
                .filter(|_| self.status == AppointmentStatus::Completed)
                .or(Some(now)),
            _ => None,
        };
        self.status = status;
    }

    /// Start instant; `date` and `time` are wall-clock values at the clinic
    pub fn starts_at(&self, clinic_offset: FixedOffset) -> DateTime<Utc> {
        let local = NaiveDateTime::new(self.date, self.time);
        let offset = Duration::seconds(i64::from(clinic_offset.local_minus_utc()));
        local.checked_sub_signed(offset).unwrap_or(local).and_utc()
    }

    pub fn display_status(&self, now: DateTime<Utc>, clinic_offset: FixedOffset) -> DisplayStatus {
        match self.status {
            AppointmentStatus::Scheduled if now > self.starts_at(clinic_offset) => DisplayStatus::Delayed,
            AppointmentStatus::Scheduled => DisplayStatus::Scheduled,
            AppointmentStatus::Operating => DisplayStatus::Operating,
            AppointmentStatus::Completed => DisplayStatus::Completed,
            AppointmentStatus::Cancelled => DisplayStatus::Cancelled,
        }
    }

    /// Whether the schedule view still shows this appointment; paid visits
    /// drop off once `window` has elapsed since payment
    pub fn visible_in_schedule(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match (self.payment_status, self.marked_paid_at) {
            (PaymentStatus::Paid, Some(paid_at)) => now - paid_at <= window,
            _ => true,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// Appointment as returned by the API, with its computed display status
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub display_status: DisplayStatus,
}

impl AppointmentView {
    pub fn at(appointment: Appointment, now: DateTime<Utc>, clinic_offset: FixedOffset) -> Self {
        let display_status = appointment.display_status(now, clinic_offset);
        Self { appointment, display_status }
    }
}

/// Parsed form of the free-text `reason` field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppointmentReason {
    pub treatments: Vec<String>,
    pub note: Option<String>,
}

impl AppointmentReason {
    /// `"Cleaning, Filling (bring x-ray)"` becomes treatments
    /// `["Cleaning", "Filling"]` and note `"bring x-ray"`
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (list, note) = match (raw.ends_with(')'), raw.rfind('(')) {
            (true, Some(open)) => {
                let note = raw
                    .get(open + 1..raw.len() - 1)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                (raw.get(..open).unwrap_or_default(), note)
            }
            _ => (raw, None),
        };

        let treatments = list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Self { treatments, note }
    }

    pub fn treatment_label(&self) -> String {
        if self.treatments.is_empty() {
            "General Visit".to_string()
        } else {
            self.treatments.join(", ")
        }
    }
}
