// In-process store used for development runs and tests
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    AppointmentFilter, CascadeOutcome, ClinicStore, MergeOutcome, OrphanQuery, PatientQuery, StoreError,
    StoreResult,
};
use crate::models::{Appointment, ConfigEntry, Contact, HandoverTemp, Patient, TreatmentRecord, User};

#[derive(Default)]
struct Collections {
    patients: HashMap<Uuid, Patient>,
    users: HashMap<Uuid, User>,
    appointments: HashMap<Uuid, Appointment>,
    records: HashMap<Uuid, TreatmentRecord>,
    contacts: HashMap<Uuid, Contact>,
    config: HashMap<String, ConfigEntry>,
    handovers: Vec<HandoverTemp>,
}

/// All collections behind a single lock; multi-collection operations
/// happen under one write guard.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace<T>(map: &mut HashMap<Uuid, T>, id: Uuid, value: &T, entity: &'static str) -> StoreResult<()>
where
    T: Clone,
{
    match map.get_mut(&id) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(StoreError::not_found(entity, id)),
    }
}

#[async_trait]
impl ClinicStore for InMemoryStore {
    async fn insert_patient(&self, patient: &Patient) -> StoreResult<()> {
        self.inner.write().patients.insert(patient.id, patient.clone());
        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(self.inner.read().patients.get(&id).cloned())
    }

    async fn update_patient(&self, patient: &Patient) -> StoreResult<()> {
        let mut inner = self.inner.write();
        replace(&mut inner.patients, patient.id, patient, "Patient")
    }

    async fn list_patients(&self, query: &PatientQuery) -> StoreResult<(Vec<Patient>, u64)> {
        let inner = self.inner.read();
        let mut matched: Vec<Patient> = inner.patients.values().filter(|p| query.matches(p)).cloned().collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn find_patient_by_user(&self, user_id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(self
            .inner
            .read()
            .patients
            .values()
            .find(|p| p.user_id == Some(user_id))
            .cloned())
    }

    async fn find_orphans(&self, query: &OrphanQuery) -> StoreResult<Vec<Patient>> {
        let inner = self.inner.read();
        let mut orphans: Vec<Patient> = inner.patients.values().filter(|p| query.matches(p)).cloned().collect();
        orphans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(orphans)
    }

    async fn find_patients_by_phone_suffix(&self, suffix: &str) -> StoreResult<Vec<Patient>> {
        Ok(self
            .inner
            .read()
            .patients
            .values()
            .filter(|p| p.contact_suffix().as_deref() == Some(suffix))
            .cloned()
            .collect())
    }

    async fn merge_patients(&self, primary: Uuid, orphan: Uuid) -> StoreResult<MergeOutcome> {
        let mut inner = self.inner.write();
        if !inner.patients.contains_key(&primary) {
            return Err(StoreError::not_found("Patient", primary));
        }
        if !inner.patients.contains_key(&orphan) {
            return Err(StoreError::not_found("Patient", orphan));
        }
        if primary == orphan {
            return Err(StoreError::Conflict("cannot merge a patient into itself".to_string()));
        }

        let mut outcome = MergeOutcome::default();
        for appointment in inner.appointments.values_mut().filter(|a| a.patient_id == orphan) {
            appointment.patient_id = primary;
            outcome.appointments_moved += 1;
        }
        for record in inner.records.values_mut().filter(|r| r.patient_id == orphan) {
            record.patient_id = primary;
            outcome.records_moved += 1;
        }
        for user in inner.users.values_mut().filter(|u| u.patient_id == Some(orphan)) {
            user.patient_id = Some(primary);
        }
        inner.patients.remove(&orphan);
        Ok(outcome)
    }

    async fn delete_patient_cascade(&self, id: Uuid) -> StoreResult<CascadeOutcome> {
        let mut inner = self.inner.write();
        if inner.patients.remove(&id).is_none() {
            return Err(StoreError::not_found("Patient", id));
        }

        let appointments_before = inner.appointments.len();
        inner.appointments.retain(|_, a| a.patient_id != id);
        let records_before = inner.records.len();
        inner.records.retain(|_, r| r.patient_id != id);
        for user in inner.users.values_mut().filter(|u| u.patient_id == Some(id)) {
            user.patient_id = None;
        }

        Ok(CascadeOutcome {
            appointments_deleted: (appointments_before - inner.appointments.len()) as u64,
            records_deleted: (records_before - inner.records.len()) as u64,
        })
    }

    async fn get_user_by_google_id(&self, google_id: &str) -> StoreResult<Option<User>> {
        Ok(self
            .inner
            .read()
            .users
            .values()
            .find(|u| u.google_id == google_id)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.users.values().any(|u| u.google_id == user.google_id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.google_id)));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.inner.write();
        replace(&mut inner.users, user.id, user, "User")
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        self.inner
            .write()
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        Ok(self.inner.read().appointments.get(&id).cloned())
    }

    async fn update_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        let mut inner = self.inner.write();
        replace(&mut inner.appointments, appointment.id, appointment, "Appointment")
    }

    async fn delete_appointment(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().appointments.remove(&id).is_some())
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let inner = self.inner.read();
        let mut list: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        list.sort_by(|a, b| (a.date, a.time, a.created_at).cmp(&(b.date, b.time, b.created_at)));
        Ok(list)
    }

    async fn insert_record(&self, record: &TreatmentRecord) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if let Some(appointment_id) = record.appointment_id {
            if inner.records.values().any(|r| r.appointment_id == Some(appointment_id)) {
                return Err(StoreError::Conflict(format!(
                    "appointment {appointment_id} already has a treatment record"
                )));
            }
        }
        inner.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn insert_record_if_absent(&self, record: &TreatmentRecord) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        let exists = record
            .appointment_id
            .is_some_and(|id| inner.records.values().any(|r| r.appointment_id == Some(id)));
        if exists {
            return Ok(false);
        }
        inner.records.insert(record.id, record.clone());
        Ok(true)
    }

    async fn get_record(&self, id: Uuid) -> StoreResult<Option<TreatmentRecord>> {
        Ok(self.inner.read().records.get(&id).cloned())
    }

    async fn update_record(&self, record: &TreatmentRecord) -> StoreResult<()> {
        let mut inner = self.inner.write();
        replace(&mut inner.records, record.id, record, "TreatmentRecord")
    }

    async fn delete_record(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().records.remove(&id).is_some())
    }

    async fn delete_records_for_appointment(&self, appointment_id: Uuid) -> StoreResult<u64> {
        let mut inner = self.inner.write();
        let before = inner.records.len();
        inner.records.retain(|_, r| r.appointment_id != Some(appointment_id));
        Ok((before - inner.records.len()) as u64)
    }

    async fn list_records(&self, patient_id: Option<Uuid>) -> StoreResult<Vec<TreatmentRecord>> {
        let inner = self.inner.read();
        let mut list: Vec<TreatmentRecord> = inner
            .records
            .values()
            .filter(|r| patient_id.map_or(true, |p| r.patient_id == p))
            .cloned()
            .collect();
        list.sort_by(|a, b| (b.date, b.created_at).cmp(&(a.date, a.created_at)));
        Ok(list)
    }

    async fn records_for_appointment(&self, appointment_id: Uuid) -> StoreResult<Vec<TreatmentRecord>> {
        Ok(self
            .inner
            .read()
            .records
            .values()
            .filter(|r| r.appointment_id == Some(appointment_id))
            .cloned()
            .collect())
    }

    async fn insert_contact(&self, contact: &Contact) -> StoreResult<()> {
        self.inner.write().contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn get_contact(&self, id: Uuid) -> StoreResult<Option<Contact>> {
        Ok(self.inner.read().contacts.get(&id).cloned())
    }

    async fn update_contact(&self, contact: &Contact) -> StoreResult<()> {
        let mut inner = self.inner.write();
        replace(&mut inner.contacts, contact.id, contact, "Contact")
    }

    async fn set_contact_email_sent(&self, id: Uuid, sent: bool) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        Ok(match inner.contacts.get_mut(&id) {
            Some(contact) => {
                contact.email_sent = sent;
                true
            }
            None => false,
        })
    }

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        let inner = self.inner.read();
        let mut list: Vec<Contact> = inner.contacts.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn get_config(&self, key: &str) -> StoreResult<Option<ConfigEntry>> {
        Ok(self.inner.read().config.get(key).cloned())
    }

    async fn set_config(&self, key: &str, value: &str) -> StoreResult<ConfigEntry> {
        let entry = ConfigEntry {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        };
        self.inner.write().config.insert(key.to_string(), entry.clone());
        Ok(entry)
    }

    async fn insert_handover(&self, payload: serde_json::Value) -> StoreResult<HandoverTemp> {
        let mut inner = self.inner.write();
        let version = inner.handovers.last().map_or(1, |h| h.version + 1);
        let handover = HandoverTemp {
            version,
            payload,
            created_at: Utc::now(),
        };
        inner.handovers.push(handover.clone());
        Ok(handover)
    }

    async fn latest_handover(&self) -> StoreResult<Option<HandoverTemp>> {
        Ok(self.inner.read().handovers.last().cloned())
    }

    async fn get_handover(&self, version: i64) -> StoreResult<Option<HandoverTemp>> {
        Ok(self
            .inner
            .read()
            .handovers
            .iter()
            .find(|h| h.version == version)
            .cloned())
    }

    async fn is_healthy(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn appointment_for(patient_id: Uuid) -> Appointment {
        Appointment::new(
            patient_id,
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            "Checkup",
        )
    }

    #[tokio::test]
    async fn test_merge_repoints_everything() {
        let store = InMemoryStore::new();
        let primary = Patient::new("Asha");
        let orphan = Patient::new("asha");
        store.insert_patient(&primary).await.unwrap();
        store.insert_patient(&orphan).await.unwrap();

        let appt = appointment_for(orphan.id);
        store.insert_appointment(&appt).await.unwrap();
        let record = TreatmentRecord::for_paid_appointment(&appt);
        store.insert_record(&record).await.unwrap();

        let outcome = store.merge_patients(primary.id, orphan.id).await.unwrap();
        assert_eq!(outcome.appointments_moved, 1);
        assert_eq!(outcome.records_moved, 1);
        assert!(store.get_patient(orphan.id).await.unwrap().is_none());
        assert_eq!(store.get_appointment(appt.id).await.unwrap().unwrap().patient_id, primary.id);
    }

    #[tokio::test]
    async fn test_merge_missing_orphan_changes_nothing() {
        let store = InMemoryStore::new();
        let primary = Patient::new("Asha");
        store.insert_patient(&primary).await.unwrap();
        let result = store.merge_patients(primary.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.get_patient(primary.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_insert_is_idempotent_per_appointment() {
        let store = InMemoryStore::new();
        let appt = appointment_for(Uuid::new_v4());
        let first = TreatmentRecord::for_paid_appointment(&appt);
        let second = TreatmentRecord::for_paid_appointment(&appt);
        assert!(store.insert_record_if_absent(&first).await.unwrap());
        assert!(!store.insert_record_if_absent(&second).await.unwrap());
        assert_eq!(store.records_for_appointment(appt.id).await.unwrap().len(), 1);
        assert_eq!(store.delete_records_for_appointment(appt.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cascade_delete() {
        let store = InMemoryStore::new();
        let patient = Patient::new("Dev");
        store.insert_patient(&patient).await.unwrap();
        store.insert_appointment(&appointment_for(patient.id)).await.unwrap();
        store.insert_appointment(&appointment_for(Uuid::new_v4())).await.unwrap();

        let outcome = store.delete_patient_cascade(patient.id).await.unwrap();
        assert_eq!(outcome.appointments_deleted, 1);
        assert_eq!(store.list_appointments(&AppointmentFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_handover_versions_increase() {
        let store = InMemoryStore::new();
        let v1 = store.insert_handover(serde_json::json!({"logo": "a.png"})).await.unwrap();
        let v2 = store.insert_handover(serde_json::json!({"logo": "b.png"})).await.unwrap();
        assert_eq!((v1.version, v2.version), (1, 2));
        assert_eq!(store.latest_handover().await.unwrap().unwrap().version, 2);
        assert_eq!(store.get_handover(1).await.unwrap().unwrap().payload["logo"], "a.png");
    }
}
