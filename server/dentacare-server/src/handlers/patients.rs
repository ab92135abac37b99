use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AdminAccess;
use crate::models::Patient;
use crate::server::DentaCareServer;
use crate::services::patients::{CreatePatientRequest, PatientSummary, UpdatePatientRequest};
use crate::store::{CascadeOutcome, PatientQuery};
use crate::types::pagination::PaginationParams;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPatientsParams {
    /// Matches name, phone digits or email
    pub q: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListPatientsParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/patients",
    params(ListPatientsParams),
    responses(
        (status = 200, description = "Patients with last treatment and next appointment", body = Vec<PatientSummary>),
        (status = 500, description = "Internal server error")
    ),
    tag = "patients"
)]
pub async fn list_patients(
    State(server): State<DentaCareServer>,
    Query(params): Query<ListPatientsParams>,
) -> Result<Json<ApiResponse<Vec<PatientSummary>>>, ApiError> {
    let pagination = params.pagination();
    let query = PatientQuery {
        search: params.q,
        offset: pagination.offset(),
        limit: pagination.limit(),
    };
    let (patients, total) = server.patients.list(&query).await?;
    Ok(Json(pagination.wrap_response(patients, total)))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Invalid request")
    ),
    tag = "patients"
)]
pub async fn create_patient(
    State(server): State<DentaCareServer>,
    Json(req): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Patient>>), ApiError> {
    let patient = server.patients.create(req).await?;
    Ok((StatusCode::CREATED, Json(api_success(patient))))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient found", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients"
)]
pub async fn get_patient(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    Ok(Json(api_success(server.patients.get(id).await?)))
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient ID")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients"
)]
pub async fn update_patient(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePatientRequest>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    Ok(Json(api_success(server.patients.update(id, req).await?)))
}

/// Deletes the patient together with their appointments and treatment records
#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient and dependents deleted", body = CascadeOutcome),
        (status = 401, description = "Admin session required"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("admin_session" = []))
)]
pub async fn delete_patient(
    State(server): State<DentaCareServer>,
    _admin: AdminAccess,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CascadeOutcome>>, ApiError> {
    Ok(Json(api_success(server.patients.delete(id).await?)))
}
