//! Admin password stored in the config collection
//!
//! Values are argon2 PHC strings. Older deployments stored the password in
//! plain text; those are compared in constant time and re-hashed on the
//! first successful check. A fresh deployment has no stored value until the
//! configured seed password is first used.

use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::models::ADMIN_PASSWORD_KEY;
use crate::store::ClinicStore;

pub const MIN_PASSWORD_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Accepted,
    /// Matched the configured seed, which is now stored hashed
    Initialized,
    Rejected,
}

impl PasswordCheck {
    pub fn is_accepted(self) -> bool {
        !matches!(self, PasswordCheck::Rejected)
    }
}

#[derive(Clone)]
pub struct AdminPasswordService {
    store: Arc<dyn ClinicStore>,
    seed: Option<Arc<str>>,
}

impl AdminPasswordService {
    pub fn new(store: Arc<dyn ClinicStore>, seed: Option<String>) -> Self {
        Self {
            store,
            seed: seed.filter(|s| !s.trim().is_empty()).map(Arc::from),
        }
    }

    /// A stored password exists or a seed is available
    pub async fn is_configured(&self) -> ApiResult<bool> {
        Ok(self.seed.is_some() || self.store.get_config(ADMIN_PASSWORD_KEY).await?.is_some())
    }

    /// Without a stored password the submission is only checked against the
    /// seed; with neither, nobody can unlock
    pub async fn verify(&self, password: &str) -> ApiResult<PasswordCheck> {
        let Some(entry) = self.store.get_config(ADMIN_PASSWORD_KEY).await? else {
            let Some(seed) = self.seed.as_deref() else {
                warn!("Admin unlock attempted but no admin password is configured");
                return Err(ApiError::admin_not_configured());
            };
            if !bool::from(password.as_bytes().ct_eq(seed.as_bytes())) {
                return Ok(PasswordCheck::Rejected);
            }
            self.store_password(seed).await?;
            info!("Admin password initialized from configuration");
            return Ok(PasswordCheck::Initialized);
        };

        if is_phc_hash(&entry.value) {
            let ok = verify_hash(password.to_string(), entry.value).await?;
            return Ok(if ok { PasswordCheck::Accepted } else { PasswordCheck::Rejected });
        }

        let ok: bool = password.as_bytes().ct_eq(entry.value.as_bytes()).into();
        if !ok {
            return Ok(PasswordCheck::Rejected);
        }
        if let Err(e) = self.store_password(password).await {
            warn!(error = %e, "Failed to upgrade legacy admin password");
        }
        Ok(PasswordCheck::Accepted)
    }

    /// Replace the stored password
    pub async fn rotate(&self, new_password: &str) -> ApiResult<()> {
        self.store_password(new_password).await?;
        info!("Admin password rotated");
        Ok(())
    }

    async fn store_password(&self, password: &str) -> ApiResult<()> {
        if password.trim().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let hash = hash_password(password.to_string()).await?;
        self.store.set_config(ADMIN_PASSWORD_KEY, &hash).await?;
        Ok(())
    }
}

fn is_phc_hash(value: &str) -> bool {
    value.starts_with("$argon2")
}

async fn hash_password(password: String) -> ApiResult<String> {
    let hash = tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("Failed to hash password: {}", e))
    })
    .await
    .context("Password hashing task panicked")??;
    Ok(hash)
}

async fn verify_hash(password: String, hash: String) -> ApiResult<bool> {
    let result = tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hash).map_err(|e| anyhow!("Failed to parse password hash: {}", e))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("Password verification error: {}", e)),
        }
    })
    .await
    .context("Password verification task panicked")??;
    Ok(result)
}
