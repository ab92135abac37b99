use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::DeletedResponse;
use crate::error::{api_success, ApiError, ApiResponse};
use crate::models::TreatmentRecordView;
use crate::server::DentaCareServer;
use crate::services::treatment_catalog::{Treatment, TREATMENTS};
use crate::services::treatment_records::{CreateTreatmentRecordRequest, UpdateTreatmentRecordRequest};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRecordsParams {
    pub patient_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/treatment-records",
    params(ListRecordsParams),
    responses(
        (status = 200, description = "Treatment records, newest first", body = Vec<TreatmentRecordView>)
    ),
    tag = "treatment-records"
)]
pub async fn list_records(
    State(server): State<DentaCareServer>,
    Query(params): Query<ListRecordsParams>,
) -> Result<Json<ApiResponse<Vec<TreatmentRecordView>>>, ApiError> {
    Ok(Json(api_success(server.records.list(params.patient_id).await?)))
}

#[utoipa::path(
    post,
    path = "/api/treatment-records",
    request_body = CreateTreatmentRecordRequest,
    responses(
        (status = 201, description = "Record created", body = TreatmentRecordView),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Patient not found"),
        (status = 409, description = "The appointment already has a record")
    ),
    tag = "treatment-records"
)]
pub async fn create_record(
    State(server): State<DentaCareServer>,
    Json(req): Json<CreateTreatmentRecordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TreatmentRecordView>>), ApiError> {
    let record = server.records.create(req).await?;
    Ok((StatusCode::CREATED, Json(api_success(record))))
}

#[utoipa::path(
    get,
    path = "/api/treatment-records/{id}",
    params(("id" = Uuid, Path, description = "Treatment record ID")),
    responses(
        (status = 200, description = "Record found", body = TreatmentRecordView),
        (status = 404, description = "Record not found")
    ),
    tag = "treatment-records"
)]
pub async fn get_record(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TreatmentRecordView>>, ApiError> {
    Ok(Json(api_success(server.records.get(id).await?)))
}

#[utoipa::path(
    put,
    path = "/api/treatment-records/{id}",
    params(("id" = Uuid, Path, description = "Treatment record ID")),
    request_body = UpdateTreatmentRecordRequest,
    responses(
        (status = 200, description = "Record updated", body = TreatmentRecordView),
        (status = 404, description = "Record not found")
    ),
    tag = "treatment-records"
)]
pub async fn update_record(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTreatmentRecordRequest>,
) -> Result<Json<ApiResponse<TreatmentRecordView>>, ApiError> {
    Ok(Json(api_success(server.records.update(id, req).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/treatment-records/{id}",
    params(("id" = Uuid, Path, description = "Treatment record ID")),
    responses(
        (status = 200, description = "Record deleted", body = DeletedResponse),
        (status = 404, description = "Record not found")
    ),
    tag = "treatment-records"
)]
pub async fn delete_record(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    server.records.delete(id).await?;
    Ok(Json(api_success(DeletedResponse::new(id))))
}

#[utoipa::path(
    get,
    path = "/api/treatments",
    responses(
        (status = 200, description = "Treatment catalog with list prices", body = Vec<Treatment>)
    ),
    tag = "treatment-records"
)]
pub async fn list_treatments() -> Json<ApiResponse<Vec<Treatment>>> {
    Json(api_success(TREATMENTS.to_vec()))
}
