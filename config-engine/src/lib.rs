//! Layered configuration loading for DentaCare Engine
//!
//! Defaults come from the target type's `Default` impl, then every source is
//! merged in the order it was added, so later sources win.
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::{ConfigEngine, ConfigSource, ConfigValidator};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct AppConfig {
//!     port: u16,
//! }
//!
//! impl ConfigValidator for AppConfig {}
//!
//! let config: AppConfig = ConfigEngine::new()
//!     .add_source(ConfigSource::optional_file("dentacare.yaml"))
//!     .add_source(ConfigSource::env("DENTACARE_"))
//!     .load()
//!     .unwrap();
//! ```

pub mod error;
pub mod providers;
pub mod validation;

pub use error::*;
pub use providers::*;
pub use validation::*;

use figment::providers::Serialized;
use figment::Figment;
use serde::{de::DeserializeOwned, Serialize};

/// Builder that collects configuration sources
#[derive(Debug, Default, Clone)]
pub struct ConfigEngine {
    sources: Vec<ConfigSource>,
}

impl ConfigEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Merge all sources over `T::default()`, extract and validate
    pub fn load<T>(&self) -> Result<T>
    where
        T: DeserializeOwned + Serialize + Default + ConfigValidator,
    {
        let mut figment = Figment::from(Serialized::defaults(T::default()));
        for source in &self.sources {
            figment = source.merge_into(figment)?;
        }

        let config: T = figment.extract()?;
        config.validate()?;
        tracing::debug!(sources = self.sources.len(), "Configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Sample {
        port: u16,
        name: String,
        mail: MailSection,
    }

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct MailSection {
        enabled: bool,
    }

    impl ConfigValidator for Sample {
        fn validate(&self) -> Result<()> {
            if self.name == "invalid" {
                return Err(ConfigError::ValidationError("name".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("app.yaml", "port: 3000\nname: clinic\n")?;
            jail.set_env("TEST_PORT", "4000");
            jail.set_env("TEST_MAIL__ENABLED", "true");

            let config: Sample = ConfigEngine::new()
                .add_source(ConfigSource::file("app.yaml"))
                .add_source(ConfigSource::env("TEST_"))
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.port, 4000);
            assert_eq!(config.name, "clinic");
            assert!(config.mail.enabled);
            Ok(())
        });
    }

    #[test]
    fn test_missing_required_file() {
        let result: Result<Sample> = ConfigEngine::new()
            .add_source(ConfigSource::file("/definitely/not/here.yaml"))
            .load();
        assert!(matches!(result, Err(ConfigError::SourceNotFound(_))));
    }

    #[test]
    fn test_optional_file_and_validation() {
        let config: Sample = ConfigEngine::new()
            .add_source(ConfigSource::optional_file("/definitely/not/here.yaml"))
            .load()
            .unwrap();
        assert_eq!(config, Sample::default());

        Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "name: invalid\n")?;
            let result: Result<Sample> = ConfigEngine::new()
                .add_source(ConfigSource::file("bad.yaml"))
                .load();
            assert!(matches!(result, Err(ConfigError::ValidationError(_))));
            Ok(())
        });
    }
}
