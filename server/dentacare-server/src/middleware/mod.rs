pub mod extractors;

pub use extractors::AdminAccess;

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};

/// Header carrying the admin session token
pub const ADMIN_SESSION_HEADER: &str = "x-admin-session";

/// Request timing middleware; slow requests are logged at warn
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    if duration > Duration::from_secs(1) {
        tracing::warn!(
            method = %method,
            path = %path,
            duration_ms = duration.as_millis(),
            "Slow request detected"
        );
    } else {
        tracing::debug!(
            method = %method,
            path = %path,
            status = %response.status(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}

/// CORS for the dashboard and public site; an empty list allows any origin
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(ADMIN_SESSION_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
