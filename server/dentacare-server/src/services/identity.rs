//! Login sync and profile management for OAuth-authenticated users

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::reconciliation::ReconciliationService;
use crate::error::{ApiError, ApiResult};
use crate::models::{deserialize_present, normalize_email, FieldState, Patient, User};
use crate::store::{ClinicStore, StoreError};
use crate::validation::{looks_like_phone, RequestValidation};
use crate::{validate_email, validate_field, validate_length, validate_range, validate_required};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncLoginRequest {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
}

impl RequestValidation for SyncLoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_email!(self.email, "Invalid email format");
        validate_required!(self.name, "Name is required");
        validate_length!(self.name, 1, 120, "Name must be at most 120 characters");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub google_id: String,
    pub name: Option<String>,
    /// Phone number; triggers another reconciliation pass
    pub contact: Option<String>,
    pub age: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub gender: Option<FieldState>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub address: Option<FieldState>,
}

impl RequestValidation for UpdateProfileRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.google_id, "googleId is required");
        if let Some(name) = &self.name {
            validate_required!(name, "Name must not be empty");
        }
        if let Some(contact) = self.contact.as_deref().filter(|c| !c.trim().is_empty()) {
            validate_field!(contact, looks_like_phone(contact), "A valid phone number is required");
        }
        if let Some(age) = &self.age {
            validate_range!(age, 0, 150, "Age must be between 0 and 150");
        }
        Ok(())
    }
}

/// A login together with its bound patient
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthProfile {
    pub user: User,
    pub patient: Option<Patient>,
    /// Patients merged during this call
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub merged: Vec<Uuid>,
}

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn ClinicStore>,
    reconciliation: ReconciliationService,
}

impl IdentityService {
    pub fn new(store: Arc<dyn ClinicStore>, reconciliation: ReconciliationService) -> Self {
        Self { store, reconciliation }
    }

    /// Upsert the user by provider id, then reconcile their patient
    pub async fn sync_login(&self, google_id: &str, request: SyncLoginRequest) -> ApiResult<AuthProfile> {
        request.validate()?;
        let email = normalize_email(&request.email).unwrap_or_default();

        let mut user = match self.store.get_user_by_google_id(google_id).await? {
            Some(mut user) => {
                if user.email != email || user.name != request.name.trim() || request.image.is_some() {
                    user.email = email;
                    user.name = request.name.trim().to_string();
                    if request.image.is_some() {
                        user.image = request.image;
                    }
                    self.store.update_user(&user).await?;
                }
                user
            }
            None => {
                let mut user = User::new(google_id, email, request.name.trim());
                user.image = request.image;
                match self.store.insert_user(&user).await {
                    Ok(()) => {
                        info!(user_id = %user.id, "Registered new login");
                        user
                    }
                    // Concurrent first login; use the row that won
                    Err(StoreError::Conflict(_)) => self
                        .store
                        .get_user_by_google_id(google_id)
                        .await?
                        .ok_or_else(|| ApiError::conflict("User registration raced; retry"))?,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let outcome = self.reconciliation.reconcile(&mut user, None).await?;
        Ok(AuthProfile {
            user,
            patient: Some(outcome.patient),
            merged: outcome.merged,
        })
    }

    pub async fn fetch(&self, google_id: &str) -> ApiResult<AuthProfile> {
        let user = self.load_user(google_id).await?;
        let patient = match user.patient_id {
            Some(id) => self.store.get_patient(id).await?,
            None => self.store.find_patient_by_user(user.id).await?,
        };
        Ok(AuthProfile {
            user,
            patient,
            merged: Vec::new(),
        })
    }

    /// Update the login and its patient. A supplied phone reruns
    /// reconciliation first, so the edits land on the surviving patient.
    pub async fn update_profile(&self, request: UpdateProfileRequest) -> ApiResult<AuthProfile> {
        request.validate()?;
        let mut user = self.load_user(&request.google_id).await?;

        if let Some(name) = &request.name {
            user.name = name.trim().to_string();
        }
        let phone = request
            .contact
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        if let Some(phone) = &phone {
            user.contact = Some(phone.clone());
        }
        self.store.update_user(&user).await?;

        let outcome = self.reconciliation.reconcile(&mut user, phone.as_deref()).await?;
        let mut patient = outcome.patient;

        if let Some(name) = &request.name {
            patient.name = name.trim().to_string();
        }
        if let Some(age) = request.age {
            patient.age = Some(age);
        }
        if let Some(gender) = request.gender {
            patient.gender = gender;
        }
        if let Some(address) = request.address {
            patient.address = address;
        }
        if let Some(phone) = phone {
            patient.contact = FieldState::Value(phone);
        }
        self.store.update_patient(&patient).await?;

        info!(user_id = %user.id, patient_id = %patient.id, "Profile updated");
        Ok(AuthProfile {
            user,
            patient: Some(patient),
            merged: outcome.merged,
        })
    }

    async fn load_user(&self, google_id: &str) -> ApiResult<User> {
        self.store
            .get_user_by_google_id(google_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))
    }
}
