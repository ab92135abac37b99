//! Staff-facing patient management

use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    deserialize_present, normalize_email, Appointment, AppointmentStatus, FieldState, Patient, TreatmentRecord,
};
use crate::store::{AppointmentFilter, CascadeOutcome, ClinicStore, PatientQuery};
use crate::validation::{looks_like_email, RequestValidation};
use crate::{validate_field, validate_length, validate_range, validate_required};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: String,
    pub age: Option<i32>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub gender: FieldState,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub contact: FieldState,
    pub email: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub address: FieldState,
    #[serde(default)]
    pub medical_history: Vec<String>,
}

impl RequestValidation for CreatePatientRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Name is required");
        validate_length!(self.name, 1, 120, "Name must be at most 120 characters");
        if let Some(age) = &self.age {
            validate_range!(age, 0, 150, "Age must be between 0 and 150");
        }
        validate_optional_email(self.email.as_deref())
    }
}

/// Partial update. `gender`, `contact` and `address` accept the tri-state
/// wire encoding, so `null` clears them while an absent key leaves them be.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub gender: Option<FieldState>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub contact: Option<FieldState>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub address: Option<FieldState>,
    pub medical_history: Option<Vec<String>>,
}

impl RequestValidation for UpdatePatientRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            validate_required!(name, "Name must not be empty");
        }
        if let Some(age) = &self.age {
            validate_range!(age, 0, 150, "Age must be between 0 and 150");
        }
        validate_optional_email(self.email.as_deref())
    }
}

fn validate_optional_email(email: Option<&str>) -> Result<(), ApiError> {
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        validate_field!(email, looks_like_email(email), "Invalid email format");
    }
    Ok(())
}

/// Patient row for the dashboard list
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    #[serde(flatten)]
    pub patient: Patient,
    pub last_treatment: Option<TreatmentRecord>,
    pub next_appointment: Option<Appointment>,
}

#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn ClinicStore>,
    clinic_offset: FixedOffset,
}

impl PatientService {
    pub fn new(store: Arc<dyn ClinicStore>, clinic_offset: FixedOffset) -> Self {
        Self { store, clinic_offset }
    }

    /// Admin intake
    pub async fn create(&self, request: CreatePatientRequest) -> ApiResult<Patient> {
        request.validate()?;
        let mut patient = Patient::new(request.name);
        patient.age = request.age;
        patient.gender = request.gender;
        patient.contact = request.contact;
        patient.email = request.email.as_deref().and_then(normalize_email);
        patient.address = request.address;
        patient.medical_history = clean_history(request.medical_history);
        patient.added_by_admin = true;

        self.store.insert_patient(&patient).await?;
        info!(patient_id = %patient.id, "Patient created by staff");
        Ok(patient)
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<Patient> {
        self.store
            .get_patient(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Patient"))
    }

    /// One page of patients with their latest treatment and next upcoming
    /// appointment, plus the unpaged total
    pub async fn list(&self, query: &PatientQuery) -> ApiResult<(Vec<PatientSummary>, u64)> {
        let (patients, total) = self.store.list_patients(query).await?;
        let now = Utc::now();

        let mut summaries = Vec::with_capacity(patients.len());
        for patient in patients {
            let last_treatment = self.store.list_records(Some(patient.id)).await?.into_iter().next();
            let next_appointment = self
                .store
                .list_appointments(&AppointmentFilter {
                    status: Some(AppointmentStatus::Scheduled),
                    ..AppointmentFilter::for_patient(patient.id)
                })
                .await?
                .into_iter()
                .find(|a| a.starts_at(self.clinic_offset) >= now);
            summaries.push(PatientSummary {
                patient,
                last_treatment,
                next_appointment,
            });
        }
        Ok((summaries, total))
    }

    pub async fn update(&self, id: Uuid, patch: UpdatePatientRequest) -> ApiResult<Patient> {
        patch.validate()?;
        let mut patient = self.get(id).await?;

        if let Some(name) = patch.name {
            patient.name = name.trim().to_string();
        }
        if let Some(age) = patch.age {
            patient.age = Some(age);
        }
        if let Some(gender) = patch.gender {
            patient.gender = gender;
        }
        if let Some(contact) = patch.contact {
            patient.contact = contact;
        }
        if let Some(email) = patch.email {
            patient.email = normalize_email(&email);
        }
        if let Some(address) = patch.address {
            patient.address = address;
        }
        if let Some(history) = patch.medical_history {
            patient.medical_history = clean_history(history);
        }

        self.store.update_patient(&patient).await?;
        Ok(patient)
    }

    /// Removes the patient with every appointment and treatment record
    pub async fn delete(&self, id: Uuid) -> ApiResult<CascadeOutcome> {
        let outcome = self.store.delete_patient_cascade(id).await?;
        info!(
            patient_id = %id,
            appointments_deleted = outcome.appointments_deleted,
            records_deleted = outcome.records_deleted,
            "Patient deleted"
        );
        Ok(outcome)
    }
}

fn clean_history(history: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for tag in history {
        let tag = tag.trim();
        if !tag.is_empty() && !cleaned.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}
