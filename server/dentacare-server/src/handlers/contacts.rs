use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::models::Contact;
use crate::server::DentaCareServer;
use crate::services::contacts::SubmitContactRequest;

#[utoipa::path(
    get,
    path = "/api/contacts",
    responses(
        (status = 200, description = "Inquiries, newest first", body = Vec<Contact>)
    ),
    tag = "contacts"
)]
pub async fn list_contacts(State(server): State<DentaCareServer>) -> Result<Json<ApiResponse<Vec<Contact>>>, ApiError> {
    Ok(Json(api_success(server.contacts.list().await?)))
}

#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = SubmitContactRequest,
    responses(
        (status = 201, description = "Inquiry stored", body = Contact),
        (status = 400, description = "Invalid request")
    ),
    tag = "contacts"
)]
pub async fn submit_contact(
    State(server): State<DentaCareServer>,
    Json(req): Json<SubmitContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Contact>>), ApiError> {
    let contact = server.contacts.submit(req).await?;
    Ok((StatusCode::CREATED, Json(api_success(contact))))
}

#[utoipa::path(
    put,
    path = "/api/contacts/{id}/read",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact marked read (no-op once scheduled)", body = Contact),
        (status = 404, description = "Contact not found")
    ),
    tag = "contacts"
)]
pub async fn mark_contact_read(
    State(server): State<DentaCareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Contact>>, ApiError> {
    Ok(Json(api_success(server.contacts.mark_read(id).await?)))
}
