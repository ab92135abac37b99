// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Run every formatted field through the PII redactor
    pub redaction_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "dentacare_server=info,tower_http=info,sqlx=warn".to_string(),
            json: false,
            redaction_enabled: true,
        }
    }
}

impl LoggingConfig {
    /// Raise the server crate to debug output
    pub fn verbose(mut self) -> Self {
        self.level = "dentacare_server=debug,email_service=debug,tower_http=debug,sqlx=info".to_string();
        self
    }
}
