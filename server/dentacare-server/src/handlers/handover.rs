use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AdminAccess;
use crate::models::HandoverTemp;
use crate::server::DentaCareServer;

#[utoipa::path(
    get,
    path = "/api/handover/latest",
    responses(
        (status = 200, description = "Newest handover blob", body = HandoverTemp),
        (status = 404, description = "Nothing published yet")
    ),
    tag = "handover"
)]
pub async fn latest_handover(State(server): State<DentaCareServer>) -> Result<Json<ApiResponse<HandoverTemp>>, ApiError> {
    Ok(Json(api_success(server.handover.latest().await?)))
}

#[utoipa::path(
    get,
    path = "/api/handover/{version}",
    params(("version" = i64, Path, description = "Handover version")),
    responses(
        (status = 200, description = "Handover blob", body = HandoverTemp),
        (status = 404, description = "Unknown version")
    ),
    tag = "handover"
)]
pub async fn get_handover(
    State(server): State<DentaCareServer>,
    Path(version): Path<i64>,
) -> Result<Json<ApiResponse<HandoverTemp>>, ApiError> {
    Ok(Json(api_success(server.handover.get(version).await?)))
}

#[utoipa::path(
    post,
    path = "/api/handover",
    request_body(content = Object, description = "Branding/content payload"),
    responses(
        (status = 201, description = "Stored as the next version", body = HandoverTemp),
        (status = 400, description = "Payload is not a JSON object"),
        (status = 401, description = "Admin session required")
    ),
    tag = "handover",
    security(("admin_session" = []))
)]
pub async fn publish_handover(
    State(server): State<DentaCareServer>,
    _admin: AdminAccess,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ApiResponse<HandoverTemp>>), ApiError> {
    let entry = server.handover.publish(payload).await?;
    Ok((StatusCode::CREATED, Json(api_success(entry))))
}
