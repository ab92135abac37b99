use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Authenticated identity from the OAuth provider
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Provider subject id, unique per user
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub contact: Option<String>,
    /// The single patient record this login is bound to
    pub patient_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(google_id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            google_id: google_id.into(),
            email: email.into(),
            name: name.into(),
            image: None,
            contact: None,
            patient_id: None,
            created_at: Utc::now(),
        }
    }
}
