//! Extractor guarding admin-only endpoints
//!
//! ```rust,ignore
//! pub async fn delete_patient(_admin: AdminAccess, ...) -> Result<...> {
//!     // only reached with a live admin session
//! }
//! ```

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};

use super::ADMIN_SESSION_HEADER;
use crate::error::ApiError;
use crate::server::DentaCareServer;
use crate::services::SessionCheck;

/// Proof of a live admin session
#[derive(Debug, Clone)]
pub struct AdminAccess {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Raw session header, if present and non-empty
pub fn session_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(ADMIN_SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<DentaCareServer> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &DentaCareServer) -> Result<Self, Self::Rejection> {
        let token = session_token(parts)
            .ok_or_else(|| ApiError::session_required("Missing X-Admin-Session header"))?;

        match state.sessions.validate(&token) {
            SessionCheck::Valid(expires_at) => Ok(AdminAccess { token, expires_at }),
            SessionCheck::Expired => Err(ApiError::session_expired()),
            SessionCheck::Unknown => Err(ApiError::session_required("Unknown admin session")),
        }
    }
}

/// Optional variant for endpoints that report session state instead of rejecting
#[derive(Debug, Clone)]
pub struct MaybeSessionToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSessionToken(session_token(parts)))
    }
}
