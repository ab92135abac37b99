//! Inquiry intake and its progress towards a scheduled appointment

use chrono::Utc;
use logger_redacted::mask_phone;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{normalize_email, phone_suffix, Contact, ContactStatus, FieldState, PatientType};
use crate::store::ClinicStore;
use crate::validation::{looks_like_email, looks_like_phone, RequestValidation};
use crate::{validate_field, validate_length, validate_required};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitContactRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub message: String,
    /// OAuth id of a signed-in submitter
    pub google_id: Option<String>,
}

impl RequestValidation for SubmitContactRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Name is required");
        validate_length!(self.name, 1, 120, "Name must be at most 120 characters");
        validate_field!(self.phone, looks_like_phone(&self.phone), "A valid phone number is required");
        validate_required!(self.message, "Message is required");
        validate_length!(self.message, 1, 4000, "Message must be at most 4000 characters");
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate_field!(email, looks_like_email(email), "Invalid email format");
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ClinicStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, request: SubmitContactRequest) -> ApiResult<Contact> {
        request.validate()?;

        let suffix = phone_suffix(&request.phone);
        let patient_type = match &suffix {
            Some(s) if !self.store.find_patients_by_phone_suffix(s).await?.is_empty() => PatientType::Prev,
            _ => PatientType::New,
        };

        let contact = Contact {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            phone: request.phone.trim().to_string(),
            email: request.email.as_deref().and_then(normalize_email),
            message: request.message.trim().to_string(),
            status: ContactStatus::Unread,
            patient_type,
            appointment_id: None,
            email_sent: false,
            created_at: Utc::now(),
        };
        self.store.insert_contact(&contact).await?;

        if let Some(google_id) = request.google_id.as_deref() {
            self.backfill_submitter_contact(google_id, &contact.phone).await?;
        }

        info!(
            contact_id = %contact.id,
            phone = %mask_phone(&contact.phone),
            patient_type = ?contact.patient_type,
            "Contact submitted"
        );
        Ok(contact)
    }

    /// Give a signed-in submitter's patient the phone they just typed, if
    /// their record has none yet. `google_id` is client-asserted like every
    /// other `/api/auth` call, so this only ever fills an empty field.
    async fn backfill_submitter_contact(&self, google_id: &str, phone: &str) -> ApiResult<()> {
        let Some(user) = self.store.get_user_by_google_id(google_id).await? else {
            return Ok(());
        };
        let patient = match user.patient_id {
            Some(id) => self.store.get_patient(id).await?,
            None => self.store.find_patient_by_user(user.id).await?,
        };
        if let Some(mut patient) = patient {
            if !patient.contact.has_value() {
                patient.contact = FieldState::Value(phone.to_string());
                self.store.update_patient(&patient).await?;
                debug!(patient_id = %patient.id, "Backfilled patient contact from inquiry");
            }
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<Contact> {
        self.store
            .get_contact(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Contact"))
    }

    /// Unread becomes Read; later states are left alone
    pub async fn mark_read(&self, id: Uuid) -> ApiResult<Contact> {
        let mut contact = self.get(id).await?;
        if contact.advance(ContactStatus::Read) {
            self.store.update_contact(&contact).await?;
        }
        Ok(contact)
    }

    /// Link the contact to its appointment and reset the email flag until the
    /// confirmation goes out
    pub async fn mark_scheduled(&self, id: Uuid, appointment_id: Uuid) -> ApiResult<Contact> {
        let mut contact = self.get(id).await?;
        contact.advance(ContactStatus::Scheduled);
        contact.appointment_id = Some(appointment_id);
        contact.email_sent = false;
        self.store.update_contact(&contact).await?;
        info!(contact_id = %id, appointment_id = %appointment_id, "Contact scheduled");
        Ok(contact)
    }

    pub async fn record_email_result(&self, id: Uuid, sent: bool) -> ApiResult<()> {
        if self.store.set_contact_email_sent(id, sent).await? {
            Ok(())
        } else {
            Err(ApiError::not_found("Contact"))
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Contact>> {
        Ok(self.store.list_contacts().await?)
    }
}
