use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::codes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::StoreError;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type
    pub error_type: String,
    /// Stable machine-readable code
    pub error_code: String,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Suggested actions for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Response metadata for pagination
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub page: i32,
    pub page_size: i32,
    pub total_pages: i32,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    #[error("Admin session required: {message}")]
    Unauthorized { message: String, code: &'static str },

    #[error("{resource_type} not found")]
    NotFound { resource_type: String },

    #[error("Resource conflict: {message}")]
    Conflict { message: String },

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Email delivery failed: {message}")]
    EmailDelivery { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Not configured: {message}")]
    NotConfigured { message: String },
}

impl ApiError {
    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Missing or unknown admin session
    pub fn session_required(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            code: codes::session::SESSION_REQUIRED,
        }
    }

    pub fn session_expired() -> Self {
        Self::Unauthorized {
            message: "Admin session has expired".to_string(),
            code: codes::session::SESSION_EXPIRED,
        }
    }

    pub fn invalid_password() -> Self {
        Self::Unauthorized {
            message: "Incorrect admin password".to_string(),
            code: codes::session::INVALID_PASSWORD,
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// No admin password is stored and none is configured to seed it
    pub fn admin_not_configured() -> Self {
        Self::NotConfigured {
            message: "Admin password has not been configured".to_string(),
        }
    }

    pub fn email_delivery(message: impl Into<String>) -> Self {
        Self::EmailDelivery {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Store(store_err) => match store_err {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Database(database_layer::DatabaseError::ConnectionFailed(_)) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::EmailDelivery { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Unauthorized { .. } => "authentication_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::Store(StoreError::NotFound { .. }) => "not_found",
            ApiError::Store(StoreError::Conflict(_)) => "conflict",
            ApiError::Store(_) => "database_error",
            ApiError::EmailDelivery { .. } => "email_delivery_error",
            ApiError::Internal { .. } => "internal_error",
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::NotConfigured { .. } => "configuration_error",
        }
    }

    /// Stable code from `error_common::codes`
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::validation::INVALID_INPUT,
            ApiError::Unauthorized { code, .. } => *code,
            ApiError::NotFound { .. } | ApiError::Store(StoreError::NotFound { .. }) => codes::resource::NOT_FOUND,
            ApiError::Conflict { .. } | ApiError::Store(StoreError::Conflict(_)) => codes::resource::CONFLICT,
            ApiError::Store(StoreError::Database(database_layer::DatabaseError::ConnectionFailed(_))) => {
                codes::store::STORE_UNAVAILABLE
            }
            ApiError::Store(_) => codes::store::QUERY_FAILED,
            ApiError::EmailDelivery { .. } => codes::notification::DELIVERY_FAILED,
            ApiError::Internal { .. } => codes::internal::INTERNAL,
            ApiError::BadRequest { .. } => codes::validation::INVALID_FORMAT,
            ApiError::NotConfigured { .. } => codes::session::NOT_CONFIGURED,
        }
    }

    /// Get suggested actions for resolving the error
    pub fn suggestions(&self) -> Option<Vec<String>> {
        match self {
            ApiError::Validation { .. } => Some(vec![
                "Check the request payload for invalid fields".to_string(),
                "Ensure all required fields are provided".to_string(),
            ]),
            ApiError::Unauthorized { .. } => Some(vec![
                "Unlock the dashboard with the admin password".to_string(),
                "Send the session token in the X-Admin-Session header".to_string(),
            ]),
            ApiError::NotFound { .. } | ApiError::Store(StoreError::NotFound { .. }) => Some(vec![
                "Verify the resource ID is correct".to_string(),
                "The record may have been merged or deleted".to_string(),
            ]),
            ApiError::NotConfigured { .. } => Some(vec![
                "Set DENTACARE_ADMIN_PASSWORD and restart the server".to_string(),
            ]),
            ApiError::EmailDelivery { .. } => Some(vec![
                "Check the patient's email address".to_string(),
                "Try resending in a few moments".to_string(),
            ]),
            ApiError::Store(StoreError::Database(_)) => Some(vec![
                "Try again in a few moments".to_string(),
                "Contact support if the issue persists".to_string(),
            ]),
            _ => None,
        }
    }

    /// User-facing message; database internals are not exposed
    fn public_message(&self) -> String {
        match self {
            ApiError::Store(StoreError::Database(db_err)) => match db_err {
                database_layer::DatabaseError::ConnectionFailed(_) => {
                    "Unable to reach the database. Please try again.".to_string()
                }
                _ => "Database operation failed. Please try again.".to_string(),
            },
            ApiError::Store(other) => other.to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        ApiError::Store(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            error_code: self.error_code().to_string(),
            message: self.public_message(),
            field_errors,
            timestamp: chrono::Utc::now(),
            suggestions: self.suggestions(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: None,
    }
}

/// Helper function to create successful API responses with metadata
pub fn api_success_with_meta<T>(data: T, metadata: ResponseMetadata) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: Some(metadata),
    }
}

/// Convert anyhow errors to API errors
impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal {
            message: error.to_string(),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
