//! DentaCare Engine HTTP server
//!
//! Patients, appointments, treatment records and website inquiries for a
//! single dental clinic, served over a JSON API.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod services;
pub mod settings;
pub mod store;
pub mod types;
pub mod validation;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use server::DentaCareServer;
pub use settings::ServerSettings;

/// Create the application router with all routes and middleware
pub fn create_app(server: DentaCareServer) -> Router {
    let cors = middleware::create_cors_layer(&server.settings.allowed_origins);

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
