//! Server-side admin unlock sessions
//!
//! A successful password check issues an opaque token that expires after the
//! configured TTL. Expiry is checked here, never trusted from the client.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    Valid(DateTime<Utc>),
    Expired,
    Unknown,
}

/// Expired sessions are kept this long so callers still see `Expired`
pub const EXPIRED_RETENTION_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AdminSessionRegistry {
    sessions: Arc<DashMap<String, AdminSession>>,
    ttl: Duration,
}

impl AdminSessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn issue(&self) -> AdminSession {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, now: DateTime<Utc>) -> AdminSession {
        self.purge_stale(now);
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let session = AdminSession {
            token: URL_SAFE_NO_PAD.encode(bytes),
            issued_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    pub fn validate(&self, token: &str) -> SessionCheck {
        self.validate_at(token, Utc::now())
    }

    /// Expired tokens are removed on first sight
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> SessionCheck {
        let expires_at = match self.sessions.get(token) {
            Some(entry) => entry.expires_at,
            None => return SessionCheck::Unknown,
        };
        if now >= expires_at {
            self.sessions.remove(token);
            SessionCheck::Expired
        } else {
            SessionCheck::Valid(expires_at)
        }
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every session, e.g. after a password rotation
    pub fn revoke_all(&self) {
        self.sessions.clear();
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Forget sessions that expired more than the retention period ago
    fn purge_stale(&self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(EXPIRED_RETENTION_HOURS);
        self.sessions.retain(|_, s| !s.is_expired(cutoff));
    }
}
