use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::DeletedResponse;
use crate::error::{api_success, ApiError, ApiResponse};
use crate::models::{AppointmentStatus, AppointmentView};
use crate::server::DentaCareServer;
use crate::services::appointments::{
    AppointmentStats, AppointmentWriteResponse, CreateAppointmentRequest, ResendResponse, UpdateAppointmentRequest,
};
use crate::store::AppointmentFilter;

/// `view=schedule` hides appointments paid more than a few minutes ago
pub const SCHEDULE_VIEW: &str = "schedule";

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAppointmentsParams {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub patient_id: Option<Uuid>,
    /// `schedule` for the front-desk view
    pub view: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsParams {
    /// Day counted as "today"; defaults to the current date at the clinic
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    pub contact_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    params(ListAppointmentsParams),
    responses(
        (status = 200, description = "Appointments ordered by date and time", body = Vec<AppointmentView>)
    ),
    tag = "appointments"
)]
pub async fn list_appointments(
    State(server): State<DentaCareServer>,
    Query(params): Query<ListAppointmentsParams>,
) -> Result<Json<ApiResponse<Vec<AppointmentView>>>, ApiError> {
    let filter = AppointmentFilter {
        date: params.date,
        status: params.status,
        patient_id: params.patient_id,
    };
    let schedule_view = params.view.as_deref() == Some(SCHEDULE_VIEW);
    let appointments = server
        .appointments
        .list(&filter, schedule_view, Utc::now())
        .await?;
    Ok(Json(api_success(appointments)))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment created; confirmation email queued when the patient has an address", body = AppointmentWriteResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Patient or contact not found")
    ),
    tag = "appointments"
)]
pub async fn create_appointment(
    State(server): State<DentaCareServer>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentWriteResponse>>), ApiError> {
    let created = server.appointments.create(req).await?;
    Ok((StatusCode::CREATED, Json(api_success(created))))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment found", body = AppointmentView),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments"
)]
pub async fn get_appointment(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AppointmentView>>, ApiError> {
    Ok(Json(api_success(server.appointments.get(id).await?)))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentWriteResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments"
)]
pub async fn update_appointment(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<ApiResponse<AppointmentWriteResponse>>, ApiError> {
    Ok(Json(api_success(server.appointments.update(id, req).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment deleted", body = DeletedResponse),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments"
)]
pub async fn delete_appointment(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    server.appointments.delete(id).await?;
    Ok(Json(api_success(DeletedResponse::new(id))))
}

#[utoipa::path(
    get,
    path = "/api/appointments/patient/{patient_id}",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Appointments for the patient", body = Vec<AppointmentView>),
        (status = 404, description = "Patient not found")
    ),
    tag = "appointments"
)]
pub async fn list_patient_appointments(
    State(server): State<DentaCareServer>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AppointmentView>>>, ApiError> {
    Ok(Json(api_success(server.appointments.list_for_patient(patient_id).await?)))
}

#[utoipa::path(
    get,
    path = "/api/appointments/stats",
    params(StatsParams),
    responses(
        (status = 200, description = "Appointment counters", body = AppointmentStats)
    ),
    tag = "appointments"
)]
pub async fn appointment_stats(
    State(server): State<DentaCareServer>,
    Query(params): Query<StatsParams>,
) -> Result<Json<ApiResponse<AppointmentStats>>, ApiError> {
    let now = Utc::now();
    let today = params.date.unwrap_or_else(|| server.appointments.clinic_today(now));
    Ok(Json(api_success(server.appointments.stats(today, now).await?)))
}

/// Sends the confirmation again and waits for the result
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/resend",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body(content = ResendRequest, description = "Optional; contact to mark as emailed"),
    responses(
        (status = 200, description = "Email delivered", body = ResendResponse),
        (status = 400, description = "Patient has no email address"),
        (status = 404, description = "Appointment not found"),
        (status = 502, description = "Email delivery failed")
    ),
    tag = "appointments"
)]
pub async fn resend_appointment_email(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
    body: Option<Json<ResendRequest>>,
) -> Result<Json<ApiResponse<ResendResponse>>, ApiError> {
    let contact_id = body.and_then(|Json(req)| req.contact_id);
    Ok(Json(api_success(server.appointments.resend(id, contact_id).await?)))
}
