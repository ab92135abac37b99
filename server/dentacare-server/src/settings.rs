//! Server settings, loaded from defaults, an optional YAML file and
//! `DENTACARE_`-prefixed environment variables (nested keys use `__`)

use config_engine::{ConfigEngine, ConfigError, ConfigSource, ConfigValidator};
use database_layer::PoolSettings;
use logger_redacted::LoggingConfig;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// One year; keeps duration settings well inside chrono's range
pub const MAX_WINDOW_MINUTES: i64 = 60 * 24 * 366;
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

pub const ENV_PREFIX: &str = "DENTACARE_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// PostgreSQL connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
    pub admin_session_ttl_minutes: i64,
    /// How long a paid appointment stays on the schedule view
    pub paid_visibility_minutes: i64,
    pub clinic_name: String,
    /// Clinic wall-clock offset from UTC; appointment dates and times are local to it
    pub clinic_utc_offset_minutes: i32,
    /// Seeds the admin password when none is stored; unlock is refused while
    /// both are missing
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
    pub logging: LoggingConfig,
    pub database: PoolSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            allowed_origins: Vec::new(),
            admin_session_ttl_minutes: 30,
            paid_visibility_minutes: 5,
            clinic_name: "DentaCare Clinic".to_string(),
            clinic_utc_offset_minutes: 0,
            admin_password: None,
            logging: LoggingConfig::default(),
            database: PoolSettings::default(),
        }
    }
}

impl ConfigValidator for ServerSettings {
    fn validate(&self) -> config_engine::Result<()> {
        if self.port == 0 {
            return Err(ConfigError::ValidationError("port must be non-zero".to_string()));
        }
        if self.admin_session_ttl_minutes <= 0 || self.admin_session_ttl_minutes > MAX_WINDOW_MINUTES {
            return Err(ConfigError::ValidationError(format!(
                "admin_session_ttl_minutes must be between 1 and {MAX_WINDOW_MINUTES}"
            )));
        }
        if !(0..=MAX_WINDOW_MINUTES).contains(&self.paid_visibility_minutes) {
            return Err(ConfigError::ValidationError(format!(
                "paid_visibility_minutes must be between 0 and {MAX_WINDOW_MINUTES}"
            )));
        }
        if self.clinic_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::ValidationError(format!(
                "clinic_utc_offset_minutes must be within +/-{MAX_UTC_OFFSET_MINUTES}"
            )));
        }
        if let Some(password) = &self.admin_password {
            if password.trim().chars().count() < crate::services::MIN_PASSWORD_LENGTH {
                return Err(ConfigError::ValidationError(format!(
                    "admin_password must be at least {} characters",
                    crate::services::MIN_PASSWORD_LENGTH
                )));
            }
        }
        if self.clinic_name.trim().is_empty() {
            return Err(ConfigError::ValidationError("clinic_name must not be empty".to_string()));
        }
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(ConfigError::ValidationError(
                    "database_url must be a postgres:// connection string".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl ServerSettings {
    /// Defaults, then `config_path` if it exists, then the environment
    pub fn load(config_path: &str) -> config_engine::Result<Self> {
        ConfigEngine::new()
            .add_source(ConfigSource::optional_file(config_path))
            .add_source(ConfigSource::env(ENV_PREFIX))
            .load()
    }

    pub fn admin_session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.admin_session_ttl_minutes)
    }

    pub fn paid_visibility_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.paid_visibility_minutes)
    }

    /// Falls back to UTC for an out-of-range offset
    pub fn clinic_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.clinic_utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| chrono::Offset::fix(&chrono::Utc))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ServerSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.paid_visibility_window(), chrono::Duration::minutes(5));
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let settings = ServerSettings {
            database_url: Some("mongodb://localhost/clinic".to_string()),
            ..ServerSettings::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_out_of_range_windows() {
        for settings in [
            ServerSettings {
                admin_session_ttl_minutes: i64::MAX,
                ..ServerSettings::default()
            },
            ServerSettings {
                paid_visibility_minutes: MAX_WINDOW_MINUTES + 1,
                ..ServerSettings::default()
            },
            ServerSettings {
                clinic_utc_offset_minutes: -15 * 60,
                ..ServerSettings::default()
            },
            ServerSettings {
                admin_password: Some("abc".to_string()),
                ..ServerSettings::default()
            },
        ] {
            assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));
        }
    }

    #[test]
    fn test_clinic_offset() {
        let settings = ServerSettings {
            clinic_utc_offset_minutes: 330,
            ..ServerSettings::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.clinic_offset().local_minus_utc(), 330 * 60);
        assert_eq!(ServerSettings::default().clinic_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = ServerSettings::load("/nonexistent/dentacare.yaml").unwrap();
        assert_eq!(settings.admin_session_ttl_minutes, 30);
    }
}
