use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Appointment, AppointmentReason};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Set only for records generated from a paid appointment; unique when present
    pub appointment_id: Option<Uuid>,
    pub treatment_name: String,
    pub date: NaiveDate,
    pub cost: f64,
    pub notes: String,
    /// Line-oriented free text
    pub prescription: String,
    pub created_at: DateTime<Utc>,
}

impl TreatmentRecord {
    /// Record generated when an appointment is marked paid
    pub fn for_paid_appointment(appointment: &Appointment) -> Self {
        let reason = AppointmentReason::parse(&appointment.reason);
        let mut notes = format!(
            "Auto-generated on payment. Visit: {} at {}. Reason: {}. Amount paid: {:.2}.",
            appointment.date.format("%Y-%m-%d"),
            appointment.time.format("%H:%M"),
            reason.treatment_label(),
            appointment.amount,
        );
        if let Some(note) = &reason.note {
            notes.push_str(&format!(" Note: {note}."));
        }

        Self {
            id: Uuid::new_v4(),
            patient_id: appointment.patient_id,
            appointment_id: Some(appointment.id),
            treatment_name: reason.treatment_label(),
            date: appointment.date,
            cost: appointment.amount,
            notes,
            prescription: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// Where a prescription line is administered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PrescriptionKind {
    InClinic,
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionLine {
    pub text: String,
    pub kind: PrescriptionKind,
}

/// Treatment record as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecordView {
    #[serde(flatten)]
    pub record: TreatmentRecord,
    pub prescription_lines: Vec<PrescriptionLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_generated_record_summarizes_appointment() {
        let mut appt = Appointment::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            "Scaling & Polishing, Tooth Filling (upper left)",
        );
        appt.amount = 2200.0;

        let record = TreatmentRecord::for_paid_appointment(&appt);
        assert_eq!(record.appointment_id, Some(appt.id));
        assert_eq!(record.treatment_name, "Scaling & Polishing, Tooth Filling");
        assert_eq!(record.cost, 2200.0);
        assert!(record.notes.contains("2200.00"));
        assert!(record.notes.contains("upper left"));
    }
}
