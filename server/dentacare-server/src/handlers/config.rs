//! Admin unlock: password check, session status and password rotation

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::{extractors::MaybeSessionToken, AdminAccess};
use crate::server::DentaCareServer;
use crate::services::{AdminSession, PasswordCheck, SessionCheck};
use crate::validation::RequestValidation;
use crate::validate_required;

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

impl RequestValidation for VerifyPasswordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.password, "Password is required");
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RotatePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPasswordResponse {
    pub valid: bool,
    /// First unlock with the configured seed password
    pub initialized: bool,
    pub session: AdminSession,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    /// Whether an admin password is stored or seeded
    pub configured: bool,
    /// Whether the supplied X-Admin-Session token is live
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[utoipa::path(
    post,
    path = "/api/config/verify-password",
    request_body = VerifyPasswordRequest,
    responses(
        (status = 200, description = "Password accepted; admin session issued", body = VerifyPasswordResponse),
        (status = 401, description = "Incorrect password"),
        (status = 503, description = "No admin password configured")
    ),
    tag = "config"
)]
pub async fn verify_password(
    State(server): State<DentaCareServer>,
    Json(req): Json<VerifyPasswordRequest>,
) -> Result<Json<ApiResponse<VerifyPasswordResponse>>, ApiError> {
    req.validate()?;
    let check = server.admin_password.verify(&req.password).await?;
    if !check.is_accepted() {
        return Err(ApiError::invalid_password());
    }

    let session = server.sessions.issue();
    tracing::info!(expires_at = %session.expires_at, "Admin session issued");
    Ok(Json(api_success(VerifyPasswordResponse {
        valid: true,
        initialized: check == PasswordCheck::Initialized,
        session,
    })))
}

#[utoipa::path(
    get,
    path = "/api/config/verify-password",
    params(("X-Admin-Session" = Option<String>, Header, description = "Admin session token")),
    responses(
        (status = 200, description = "Admin session status", body = SessionStatusResponse)
    ),
    tag = "config"
)]
pub async fn session_status(
    State(server): State<DentaCareServer>,
    MaybeSessionToken(token): MaybeSessionToken,
) -> Result<Json<ApiResponse<SessionStatusResponse>>, ApiError> {
    let configured = server.admin_password.is_configured().await?;
    let expires_at = match token.as_deref().map(|t| server.sessions.validate(t)) {
        Some(SessionCheck::Valid(expires_at)) => Some(expires_at),
        _ => None,
    };
    Ok(Json(api_success(SessionStatusResponse {
        configured,
        valid: expires_at.is_some(),
        expires_at,
    })))
}

/// Rotating the password ends every other admin session
#[utoipa::path(
    put,
    path = "/api/config/admin-password",
    request_body = RotatePasswordRequest,
    responses(
        (status = 200, description = "Password rotated; fresh session issued", body = AdminSession),
        (status = 400, description = "Password too short"),
        (status = 401, description = "Admin session required")
    ),
    tag = "config",
    security(("admin_session" = []))
)]
pub async fn rotate_password(
    State(server): State<DentaCareServer>,
    _admin: AdminAccess,
    Json(req): Json<RotatePasswordRequest>,
) -> Result<Json<ApiResponse<AdminSession>>, ApiError> {
    server.admin_password.rotate(&req.new_password).await?;
    server.sessions.revoke_all();
    Ok(Json(api_success(server.sessions.issue())))
}
