use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::FieldState;

/// Number of trailing digits that identify a phone number across formats
pub const PHONE_MATCH_DIGITS: usize = 10;

/// Patient identity record; aggregation root for appointments and treatment records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    #[schema(value_type = String, example = "-__-")]
    pub gender: FieldState,
    #[schema(value_type = String, example = "9876543210")]
    pub contact: FieldState,
    /// Stored trimmed and lower-cased
    pub email: Option<String>,
    #[schema(value_type = String)]
    pub address: FieldState,
    pub medical_history: Vec<String>,
    pub added_by_admin: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            age: None,
            gender: FieldState::Unset,
            contact: FieldState::Unset,
            email: None,
            address: FieldState::Unset,
            medical_history: Vec::new(),
            added_by_admin: false,
            user_id: None,
            created_at: Utc::now(),
        }
    }

    /// A patient with no owning login
    pub fn is_orphan(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn contact_suffix(&self) -> Option<String> {
        self.contact.value().and_then(phone_suffix)
    }

    /// Case-insensitive exact name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && self.name.trim().to_lowercase() == name.to_lowercase()
    }
}

/// Canonical form for stored email addresses
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        None
    } else {
        Some(email)
    }
}

/// Trailing ten digits of a phone number, ignoring punctuation and country codes.
/// Shorter numbers yield all of their digits; no digits yields `None`.
pub fn phone_suffix(raw: &str) -> Option<String> {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let skip = digits.len().saturating_sub(PHONE_MATCH_DIGITS);
    Some(digits.iter().skip(skip).collect())
}
