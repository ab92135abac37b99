//! Treatment records entered by staff or generated on payment

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::prescriptions;
use crate::error::{ApiError, ApiResult};
use crate::models::{TreatmentRecord, TreatmentRecordView};
use crate::store::ClinicStore;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatmentRecordRequest {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub treatment_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub prescription: String,
}

impl RequestValidation for CreateTreatmentRecordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.treatment_name, "Treatment name is required");
        validate_field!(self.cost, self.cost.is_finite() && self.cost >= 0.0, "Cost must be a non-negative number");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTreatmentRecordRequest {
    pub treatment_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub prescription: Option<String>,
}

impl RequestValidation for UpdateTreatmentRecordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.treatment_name {
            validate_required!(name, "Treatment name must not be empty");
        }
        if let Some(cost) = self.cost {
            validate_field!(cost, cost.is_finite() && cost >= 0.0, "Cost must be a non-negative number");
        }
        Ok(())
    }
}

/// Attach classified prescription lines
pub fn view(record: TreatmentRecord) -> TreatmentRecordView {
    let prescription_lines = prescriptions::classify(&record.prescription);
    TreatmentRecordView {
        record,
        prescription_lines,
    }
}

#[derive(Clone)]
pub struct TreatmentRecordService {
    store: Arc<dyn ClinicStore>,
}

impl TreatmentRecordService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, patient_id: Option<Uuid>) -> ApiResult<Vec<TreatmentRecordView>> {
        let records = self.store.list_records(patient_id).await?;
        Ok(records.into_iter().map(view).collect())
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<TreatmentRecordView> {
        self.load(id).await.map(view)
    }

    /// A record that names an appointment conflicts with any other record for it
    pub async fn create(&self, request: CreateTreatmentRecordRequest) -> ApiResult<TreatmentRecordView> {
        request.validate()?;
        if self.store.get_patient(request.patient_id).await?.is_none() {
            return Err(ApiError::not_found("Patient"));
        }

        let record = TreatmentRecord {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            appointment_id: request.appointment_id,
            treatment_name: request.treatment_name.trim().to_string(),
            date: request.date,
            cost: request.cost,
            notes: request.notes,
            prescription: request.prescription,
            created_at: Utc::now(),
        };
        self.store.insert_record(&record).await?;
        info!(record_id = %record.id, patient_id = %record.patient_id, "Treatment record created");
        Ok(view(record))
    }

    pub async fn update(&self, id: Uuid, patch: UpdateTreatmentRecordRequest) -> ApiResult<TreatmentRecordView> {
        patch.validate()?;
        let mut record = self.load(id).await?;
        if let Some(name) = patch.treatment_name {
            record.treatment_name = name.trim().to_string();
        }
        if let Some(date) = patch.date {
            record.date = date;
        }
        if let Some(cost) = patch.cost {
            record.cost = cost;
        }
        if let Some(notes) = patch.notes {
            record.notes = notes;
        }
        if let Some(prescription) = patch.prescription {
            record.prescription = prescription;
        }
        self.store.update_record(&record).await?;
        Ok(view(record))
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        if self.store.delete_record(id).await? {
            Ok(())
        } else {
            Err(ApiError::not_found("Treatment record"))
        }
    }

    async fn load(&self, id: Uuid) -> ApiResult<TreatmentRecord> {
        self.store
            .get_record(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Treatment record"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Patient, PrescriptionKind};
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_create_and_classify() {
        let store = Arc::new(InMemoryStore::new());
        let patient = Patient::new("Omar");
        store.insert_patient(&patient).await.unwrap();
        let svc = TreatmentRecordService::new(store);

        let created = svc
            .create(CreateTreatmentRecordRequest {
                patient_id: patient.id,
                appointment_id: None,
                treatment_name: "Tooth Extraction".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
                cost: 800.0,
                notes: String::new(),
                prescription: "Lignocaine block\nIbuprofen 400mg SOS".to_string(),
            })
            .await
            .unwrap();

        let kinds: Vec<_> = created.prescription_lines.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![PrescriptionKind::InClinic, PrescriptionKind::Home]);
        assert_eq!(svc.list(Some(patient.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_patient_rejected() {
        let svc = TreatmentRecordService::new(Arc::new(InMemoryStore::new()));
        let result = svc
            .create(CreateTreatmentRecordRequest {
                patient_id: Uuid::new_v4(),
                appointment_id: None,
                treatment_name: "Consultation".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
                cost: 0.0,
                notes: String::new(),
                prescription: String::new(),
            })
            .await;
        assert!(matches!(result, Err(ApiError::NotFound { .. })));
    }
}
