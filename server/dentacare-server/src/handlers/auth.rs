//! OAuth-backed patient portal endpoints. The sign-in flow itself happens in
//! the browser; these endpoints receive the provider id afterwards.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::DentaCareServer;
use crate::services::identity::{AuthProfile, SyncLoginRequest, UpdateProfileRequest};

#[utoipa::path(
    get,
    path = "/api/auth/google/{google_id}",
    params(("google_id" = String, Path, description = "OAuth subject id")),
    responses(
        (status = 200, description = "User and bound patient", body = AuthProfile),
        (status = 404, description = "Unknown user")
    ),
    tag = "auth"
)]
pub async fn fetch_user(
    State(server): State<DentaCareServer>,
    Path(google_id): Path<String>,
) -> Result<Json<ApiResponse<AuthProfile>>, ApiError> {
    Ok(Json(api_success(server.identity.fetch(&google_id).await?)))
}

/// Upserts the user and reconciles their patient record
#[utoipa::path(
    post,
    path = "/api/auth/google/{google_id}",
    params(("google_id" = String, Path, description = "OAuth subject id")),
    request_body = SyncLoginRequest,
    responses(
        (status = 200, description = "User synced and bound to one patient", body = AuthProfile),
        (status = 400, description = "Invalid request")
    ),
    tag = "auth"
)]
pub async fn sync_user(
    State(server): State<DentaCareServer>,
    Path(google_id): Path<String>,
    Json(req): Json<SyncLoginRequest>,
) -> Result<Json<ApiResponse<AuthProfile>>, ApiError> {
    Ok(Json(api_success(server.identity.sync_login(&google_id, req).await?)))
}

#[utoipa::path(
    put,
    path = "/api/auth/update-profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthProfile),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown user")
    ),
    tag = "auth"
)]
pub async fn update_profile(
    State(server): State<DentaCareServer>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<AuthProfile>>, ApiError> {
    Ok(Json(api_success(server.identity.update_profile(req).await?)))
}
