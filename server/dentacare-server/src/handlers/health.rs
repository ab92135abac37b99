use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::error::{api_success, ApiResponse};
use crate::server::DentaCareServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system health status
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2026-01-15T10:30:00Z")]
    pub timestamp: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Uptime in seconds
    #[schema(example = 3600)]
    pub uptime: u64,
    /// Individual dependency checks
    pub checks: HashMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    #[schema(example = "DentaCare Engine")]
    pub name: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Persistence backend in use
    #[schema(example = "postgres")]
    pub store_backend: String,
    pub clinic_name: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse),
        (status = 503, description = "Store is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(server): State<DentaCareServer>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let store_healthy = server.store.is_healthy().await;
    let mut checks = HashMap::new();
    checks.insert(
        format!("store:{}", server.store.backend_name()),
        if store_healthy { "healthy" } else { "unreachable" }.to_string(),
    );

    let (status_code, status) = if store_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_secs(),
        checks,
    };
    (status_code, Json(api_success(response)))
}

#[utoipa::path(
    get,
    path = "/version",
    tag = "health",
    responses(
        (status = 200, description = "Version information", body = VersionResponse)
    )
)]
pub async fn version_info(State(server): State<DentaCareServer>) -> Json<ApiResponse<VersionResponse>> {
    Json(api_success(VersionResponse {
        name: "DentaCare Engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_backend: server.store.backend_name().to_string(),
        clinic_name: server.settings.clinic_name.clone(),
    }))
}
