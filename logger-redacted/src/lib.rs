//! Logging with automatic PII redaction for DentaCare Engine
//!
//! Patient names are not matched, but every email address and phone number
//! that reaches a log line is replaced before it is written. Redacted values
//! are hashed by default so that two log lines about the same phone number
//! can still be correlated.
//!
//! # Detected Data Types
//!
//! - **Email Addresses**: `priya@example.com` → `EMAIL[q83Jd9...]`
//! - **Phone Numbers**: `9876543210` → `PHONE[Xk2...]`
//! - **Custom Patterns**: configurable regex/replacement pairs
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::default()).unwrap();
//! tracing::info!("Inquiry received from 9876543210");
//! // Output: "Inquiry received from PHONE[...]"
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use std::fmt::{self, Write as _};
use thiserror::Error;
use tracing_subscriber::{
    field::RecordFields,
    fmt::{format::Writer, time::ChronoUtc, FormatFields},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Logger already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Field formatter that renders fields with the default formatter and then
/// scrubs the rendered text
pub struct RedactingFields {
    redactor: PiiRedactor,
}

impl RedactingFields {
    pub fn new(redactor: PiiRedactor) -> Self {
        Self { redactor }
    }
}

impl<'writer> FormatFields<'writer> for RedactingFields {
    fn format_fields<R: RecordFields>(&self, mut writer: Writer<'writer>, fields: R) -> fmt::Result {
        let mut rendered = String::new();
        tracing_subscriber::fmt::format::DefaultFields::new()
            .format_fields(Writer::new(&mut rendered), fields)?;
        writer.write_str(&self.redactor.redact(&rendered))
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `config.level` when set. JSON output is meant for
/// log shippers and skips the field redaction pass, so call sites must mask
/// addresses themselves (see [`mask_email`] and [`mask_phone`]).
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .json(),
            )
            .try_init()
    } else if config.redaction_enabled {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .fmt_fields(RedactingFields::new(PiiRedactor::default())),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339()),
            )
            .try_init()
    };

    result.map_err(|e| LoggerError::AlreadyInitialised(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Ok(mut inner) = self.0.lock() {
                inner.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_redacting_fields_scrub_event_output() {
        let capture = Capture::default();
        let sink = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .fmt_fields(RedactingFields::new(PiiRedactor::new(RedactionConfig {
                hash_for_correlation: false,
                ..Default::default()
            })))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(recipient = "p@x.com", "Sending confirmation to 9876543210");
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("p***@x.com"));
        assert!(output.contains("******3210"));
        assert!(!output.contains("9876543210"));
    }
}
