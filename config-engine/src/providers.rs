// Configuration sources, merged in the order they are added
use std::path::PathBuf;

use figment::providers::{Env, Format, Toml, Yaml};
use figment::Figment;

use crate::error::{ConfigError, Result};

/// A single configuration layer
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// YAML or TOML file, chosen by extension
    File { path: PathBuf, required: bool },
    /// Environment variables with a prefix; `__` separates nested keys
    Env { prefix: String },
}

impl ConfigSource {
    /// A file that must exist
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into(), required: true }
    }

    /// A file that is skipped when missing
    pub fn optional_file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into(), required: false }
    }

    pub fn env(prefix: impl Into<String>) -> Self {
        Self::Env { prefix: prefix.into() }
    }

    pub(crate) fn merge_into(&self, figment: Figment) -> Result<Figment> {
        match self {
            ConfigSource::File { path, required } => {
                if !path.exists() {
                    if *required {
                        return Err(ConfigError::SourceNotFound(path.display().to_string()));
                    }
                    tracing::debug!(path = %path.display(), "Optional configuration file not found, skipping");
                    return Ok(figment);
                }
                let is_toml = path.extension().is_some_and(|ext| ext == "toml");
                Ok(if is_toml {
                    figment.merge(Toml::file(path))
                } else {
                    figment.merge(Yaml::file(path))
                })
            }
            ConfigSource::Env { prefix } => Ok(figment.merge(Env::prefixed(prefix).split("__"))),
        }
    }
}
