//! Persistence seam for the clinic's document collections
//!
//! Handlers and services only see [`ClinicStore`]. [`InMemoryStore`] backs
//! development runs and tests; [`PgStore`] backs production deployments.
//! Operations that touch more than one collection (patient merge, patient
//! delete) are atomic in both implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, ConfigEntry, Contact, HandoverTemp, Patient, TreatmentRecord, User,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] database_layer::DatabaseError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Database(database_layer::DatabaseError::SqlxError(error))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Criteria for orphan patients (no owning login). A patient matches when
/// ANY provided criterion matches.
#[derive(Debug, Clone, Default)]
pub struct OrphanQuery {
    /// Exact match against the stored lower-case email
    pub email: Option<String>,
    /// Case-insensitive exact name match
    pub name: Option<String>,
    /// Trailing digits of the contact number
    pub phone_suffix: Option<String>,
}

impl OrphanQuery {
    pub fn matches(&self, patient: &Patient) -> bool {
        if !patient.is_orphan() {
            return false;
        }
        let by_email = matches!(
            (&self.email, &patient.email),
            (Some(wanted), Some(have)) if !wanted.is_empty() && wanted == have
        );
        let by_name = self.name.as_deref().is_some_and(|n| patient.name_matches(n));
        let by_phone = match (&self.phone_suffix, patient.contact_suffix()) {
            (Some(wanted), Some(have)) => !wanted.is_empty() && *wanted == have,
            _ => false,
        };
        by_email || by_name || by_phone
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub patient_id: Option<Uuid>,
}

impl AppointmentFilter {
    pub fn for_patient(patient_id: Uuid) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.date.map_or(true, |d| appointment.date == d)
            && self.status.map_or(true, |s| appointment.status == s)
            && self.patient_id.map_or(true, |p| appointment.patient_id == p)
    }
}

/// Free-text search and paging over patients
#[derive(Debug, Clone, Default)]
pub struct PatientQuery {
    /// Matches name (case-insensitive), contact digits or email
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

impl PatientQuery {
    pub fn matches(&self, patient: &Patient) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        patient.name.to_lowercase().contains(&term)
            || patient.email.as_deref().is_some_and(|e| e.contains(&term))
            || patient.contact.value().is_some_and(|c| c.contains(&term))
    }
}

/// What a merge repointed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub appointments_moved: u64,
    pub records_moved: u64,
}

/// What a patient delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CascadeOutcome {
    pub appointments_deleted: u64,
    pub records_deleted: u64,
}

#[async_trait]
pub trait ClinicStore: Send + Sync {
    // ---- patients ----
    async fn insert_patient(&self, patient: &Patient) -> StoreResult<()>;
    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>>;
    /// Replace an existing patient
    async fn update_patient(&self, patient: &Patient) -> StoreResult<()>;
    /// Newest first, with the total count before paging
    async fn list_patients(&self, query: &PatientQuery) -> StoreResult<(Vec<Patient>, u64)>;
    async fn find_patient_by_user(&self, user_id: Uuid) -> StoreResult<Option<Patient>>;
    /// Oldest first, so adoption is deterministic
    async fn find_orphans(&self, query: &OrphanQuery) -> StoreResult<Vec<Patient>>;
    async fn find_patients_by_phone_suffix(&self, suffix: &str) -> StoreResult<Vec<Patient>>;
    /// Repoint every appointment and record from `orphan` to `primary`, then
    /// delete `orphan`, in one atomic step
    async fn merge_patients(&self, primary: Uuid, orphan: Uuid) -> StoreResult<MergeOutcome>;
    /// Delete a patient together with their appointments and records
    async fn delete_patient_cascade(&self, id: Uuid) -> StoreResult<CascadeOutcome>;

    // ---- users ----
    async fn get_user_by_google_id(&self, google_id: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;

    // ---- appointments ----
    async fn insert_appointment(&self, appointment: &Appointment) -> StoreResult<()>;
    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>>;
    async fn update_appointment(&self, appointment: &Appointment) -> StoreResult<()>;
    async fn delete_appointment(&self, id: Uuid) -> StoreResult<bool>;
    /// Ordered by date then time
    async fn list_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>>;

    // ---- treatment records ----
    async fn insert_record(&self, record: &TreatmentRecord) -> StoreResult<()>;
    /// Insert unless a record already exists for the same appointment;
    /// returns whether a row was written
    async fn insert_record_if_absent(&self, record: &TreatmentRecord) -> StoreResult<bool>;
    async fn get_record(&self, id: Uuid) -> StoreResult<Option<TreatmentRecord>>;
    async fn update_record(&self, record: &TreatmentRecord) -> StoreResult<()>;
    async fn delete_record(&self, id: Uuid) -> StoreResult<bool>;
    async fn delete_records_for_appointment(&self, appointment_id: Uuid) -> StoreResult<u64>;
    /// Newest treatment date first
    async fn list_records(&self, patient_id: Option<Uuid>) -> StoreResult<Vec<TreatmentRecord>>;
    async fn records_for_appointment(&self, appointment_id: Uuid) -> StoreResult<Vec<TreatmentRecord>>;

    // ---- contacts ----
    async fn insert_contact(&self, contact: &Contact) -> StoreResult<()>;
    async fn get_contact(&self, id: Uuid) -> StoreResult<Option<Contact>>;
    async fn update_contact(&self, contact: &Contact) -> StoreResult<()>;
    /// Returns false when the contact no longer exists
    async fn set_contact_email_sent(&self, id: Uuid, sent: bool) -> StoreResult<bool>;
    /// Newest first
    async fn list_contacts(&self) -> StoreResult<Vec<Contact>>;

    // ---- config ----
    async fn get_config(&self, key: &str) -> StoreResult<Option<ConfigEntry>>;
    async fn set_config(&self, key: &str, value: &str) -> StoreResult<ConfigEntry>;

    // ---- handover ----
    /// Store `payload` as the next version
    async fn insert_handover(&self, payload: serde_json::Value) -> StoreResult<HandoverTemp>;
    async fn latest_handover(&self) -> StoreResult<Option<HandoverTemp>>;
    async fn get_handover(&self, version: i64) -> StoreResult<Option<HandoverTemp>>;

    /// Backend reachability for health checks
    async fn is_healthy(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldState;

    #[test]
    fn test_orphan_query_any_criterion() {
        let mut patient = Patient::new("Meera Iyer");
        patient.contact = FieldState::Value("+91 99999 99999".to_string());

        let by_phone = OrphanQuery {
            phone_suffix: Some("9999999999".to_string()),
            ..OrphanQuery::default()
        };
        assert!(by_phone.matches(&patient));

        let by_name = OrphanQuery {
            name: Some("meera iyer".to_string()),
            ..OrphanQuery::default()
        };
        assert!(by_name.matches(&patient));

        patient.user_id = Some(Uuid::new_v4());
        assert!(!by_name.matches(&patient));
    }

    #[test]
    fn test_patient_query_search() {
        let mut patient = Patient::new("Kiran Shah");
        patient.email = Some("kiran@example.com".to_string());
        let query = PatientQuery {
            search: Some("KIRAN".to_string()),
            ..PatientQuery::default()
        };
        assert!(query.matches(&patient));
        let miss = PatientQuery {
            search: Some("zzz".to_string()),
            ..PatientQuery::default()
        };
        assert!(!miss.matches(&patient));
    }
}
