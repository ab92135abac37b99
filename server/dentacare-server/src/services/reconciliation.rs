//! Patient identity reconciliation
//!
//! Binds a login to exactly one patient record. Orphans (patients with no
//! owning login) that match the user's email, name, or phone are adopted or
//! merged into the bound patient. Each merge is one atomic store operation.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{normalize_email, phone_suffix, FieldState, Patient, User};
use crate::store::{ClinicStore, OrphanQuery};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// The patient the user is bound to afterwards
    pub patient: Patient,
    /// Patients folded into `patient` and deleted
    pub merged: Vec<Uuid>,
    /// Whether `patient` was created by this run
    pub created: bool,
}

#[derive(Clone)]
pub struct ReconciliationService {
    store: Arc<dyn ClinicStore>,
}

impl ReconciliationService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Bind `user` to a single patient. `phone` widens orphan matching to the
    /// trailing digits of a contact number. Persists `user.patient_id`.
    pub async fn reconcile(&self, user: &mut User, phone: Option<&str>) -> ApiResult<ReconcileOutcome> {
        let current = self.current_patient(user).await?;
        let phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or(user.contact.as_deref());

        let query = OrphanQuery {
            email: normalize_email(&user.email),
            name: Some(user.name.clone()).filter(|n| !n.trim().is_empty()),
            phone_suffix: phone.and_then(phone_suffix),
        };
        let mut orphans: Vec<Patient> = self
            .store
            .find_orphans(&query)
            .await?
            .into_iter()
            .filter(|o| current.as_ref().map_or(true, |c| c.id != o.id))
            .collect();

        let mut merged = Vec::new();
        let adopt = !orphans.is_empty() && current.as_ref().map_or(true, |c| !c.added_by_admin);

        let mut primary = if adopt {
            let mut adopted = orphans.remove(0);
            adopted.user_id = Some(user.id);
            if let Some(previous) = &current {
                backfill_from(&mut adopted, previous);
            }
            backfill_identity(&mut adopted, user, phone);
            self.store.update_patient(&adopted).await?;
            info!(patient_id = %adopted.id, user_id = %user.id, "Adopted orphan patient");

            if let Some(previous) = current {
                self.merge_into(adopted.id, previous.id, &mut merged).await?;
            }
            Some(adopted)
        } else {
            current
        };

        let mut created = false;
        let patient = match primary.take() {
            Some(mut patient) => {
                for orphan in &orphans {
                    self.merge_into(patient.id, orphan.id, &mut merged).await?;
                }
                if backfill_identity(&mut patient, user, phone) {
                    self.store.update_patient(&patient).await?;
                }
                patient
            }
            None => {
                let mut patient = Patient::new(user.name.clone());
                patient.user_id = Some(user.id);
                backfill_identity(&mut patient, user, phone);
                self.store.insert_patient(&patient).await?;
                info!(patient_id = %patient.id, user_id = %user.id, "Created patient for new login");
                created = true;
                patient
            }
        };

        if user.patient_id != Some(patient.id) {
            user.patient_id = Some(patient.id);
            self.store.update_user(user).await?;
        }

        // Merges may have moved records; return the stored state
        let patient = self.store.get_patient(patient.id).await?.unwrap_or(patient);
        Ok(ReconcileOutcome {
            patient,
            merged,
            created,
        })
    }

    async fn current_patient(&self, user: &User) -> ApiResult<Option<Patient>> {
        if let Some(id) = user.patient_id {
            if let Some(patient) = self.store.get_patient(id).await? {
                return Ok(Some(patient));
            }
            debug!(user_id = %user.id, patient_id = %id, "Bound patient no longer exists");
        }
        Ok(self.store.find_patient_by_user(user.id).await?)
    }

    async fn merge_into(&self, primary: Uuid, orphan: Uuid, merged: &mut Vec<Uuid>) -> ApiResult<()> {
        let outcome = self.store.merge_patients(primary, orphan).await?;
        info!(
            primary = %primary,
            orphan = %orphan,
            appointments_moved = outcome.appointments_moved,
            records_moved = outcome.records_moved,
            "Merged duplicate patient"
        );
        merged.push(orphan);
        Ok(())
    }
}

/// Fill contact and email from the login when the patient has none.
/// Returns whether anything changed.
fn backfill_identity(patient: &mut Patient, user: &User, phone: Option<&str>) -> bool {
    let mut changed = false;
    if !patient.contact.has_value() {
        if let Some(phone) = phone.filter(|p| !p.trim().is_empty()) {
            patient.contact = FieldState::Value(phone.trim().to_string());
            changed = true;
        }
    }
    if patient.email.is_none() {
        if let Some(email) = normalize_email(&user.email) {
            patient.email = Some(email);
            changed = true;
        }
    }
    changed
}

/// Carry details over from a placeholder patient that is about to be merged away
fn backfill_from(target: &mut Patient, source: &Patient) {
    if !target.contact.has_value() && source.contact.has_value() {
        target.contact = source.contact.clone();
    }
    if target.email.is_none() {
        target.email = source.email.clone();
    }
    if target.age.is_none() {
        target.age = source.age;
    }
    if !target.gender.has_value() && source.gender.has_value() {
        target.gender = source.gender.clone();
    }
    if !target.address.has_value() && source.address.has_value() {
        target.address = source.address.clone();
    }
}
