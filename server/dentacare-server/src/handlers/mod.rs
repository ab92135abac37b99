pub mod appointments;
pub mod auth;
pub mod config;
pub mod contacts;
pub mod handover;
pub mod health;
pub mod patients;
pub mod treatment_records;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Body returned by delete endpoints
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub id: Uuid,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: Uuid) -> Self {
        Self { id, deleted: true }
    }
}
