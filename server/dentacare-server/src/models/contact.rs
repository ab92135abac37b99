use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Inquiry progress. Variants are ordered; status only ever moves forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "contact_status")]
pub enum ContactStatus {
    #[default]
    Unread,
    Read,
    Scheduled,
}

/// Whether the submitter's phone matched an existing patient
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "patient_type", rename_all = "lowercase")]
pub enum PatientType {
    #[default]
    New,
    Prev,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub patient_type: PatientType,
    pub appointment_id: Option<Uuid>,
    /// Outcome of the latest confirmation email attempt
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    /// Move to `target` if it is ahead of the current status
    pub fn advance(&mut self, target: ContactStatus) -> bool {
        if target > self.status {
            self.status = target;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            id: Uuid::new_v4(),
            name: "Ravi".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            message: "Tooth ache".to_string(),
            status: ContactStatus::Unread,
            patient_type: PatientType::New,
            appointment_id: None,
            email_sent: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_only_moves_forward() {
        let mut c = contact();
        assert!(c.advance(ContactStatus::Read));
        assert!(c.advance(ContactStatus::Scheduled));
        assert!(!c.advance(ContactStatus::Read));
        assert_eq!(c.status, ContactStatus::Scheduled);
    }

    #[test]
    fn test_patient_type_wire_format() {
        assert_eq!(serde_json::to_value(PatientType::Prev).unwrap(), "prev");
        assert_eq!(serde_json::to_value(PatientType::New).unwrap(), "new");
    }
}
