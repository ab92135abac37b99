// SMTP-backed email service
use crate::error::{EmailError, EmailResult};
use crate::mailer::{AppointmentEmail, AppointmentMailer};
use crate::templates::AppointmentTemplates;
use async_trait::async_trait;
use logger_redacted::mask_email;
use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Email provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmailProvider {
    /// Generic SMTP server
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        use_tls: bool,
    },
}

/// Email service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub from_email: String,
    pub from_name: String,
    pub email_enabled: bool,
}

impl EmailConfig {
    /// Load email configuration from environment variables
    pub fn from_env() -> EmailResult<Self> {
        let email_enabled = std::env::var("EMAIL_ENABLED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);

        let from_email = std::env::var("EMAIL_FROM")
            .unwrap_or_else(|_| "appointments@dentacare.local".to_string());

        let from_name = std::env::var("EMAIL_FROM_NAME")
            .unwrap_or_else(|_| "DentaCare Clinic".to_string());

        if !from_email.contains('@') {
            return Err(EmailError::ConfigError(format!("EMAIL_FROM is not an address: {from_email}")));
        }

        let provider = EmailProvider::Smtp {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            use_tls: std::env::var("SMTP_TLS_ENABLED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        };

        Ok(Self {
            provider,
            from_email,
            from_name,
            email_enabled,
        })
    }

    /// Configuration that never touches the network
    pub fn disabled() -> Self {
        Self {
            provider: EmailProvider::Smtp {
                host: "localhost".to_string(),
                port: 587,
                username: None,
                password: None,
                use_tls: true,
            },
            from_email: "appointments@dentacare.local".to_string(),
            from_name: "DentaCare Clinic".to_string(),
            email_enabled: false,
        }
    }
}

/// Email service for sending appointment mail via Stalwart's SMTP client
pub struct EmailService {
    config: EmailConfig,
    templates: AppointmentTemplates,
}

impl EmailService {
    /// Create a new email service
    pub fn new(config: EmailConfig) -> EmailResult<Self> {
        if !config.email_enabled {
            info!("Email service disabled by configuration");
        }
        let templates = AppointmentTemplates::new(config.from_name.clone())?;
        Ok(Self { config, templates })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.email_enabled
    }

    /// Connect to the SMTP relay without sending; a no-op when disabled
    pub async fn verify_email_config(&self) -> EmailResult<()> {
        if !self.config.email_enabled {
            return Ok(());
        }
        let EmailProvider::Smtp { host, port, username, password, use_tls } = &self.config.provider;
        info!(host = %host, port = %port, "Testing SMTP connection");

        let mut smtp_client = SmtpClientBuilder::new(host.as_str(), *port)
            .implicit_tls(*use_tls);
        if let (Some(user), Some(pass)) = (username, password) {
            smtp_client = smtp_client.credentials((user.as_str(), pass.as_str()));
        }

        let _client = smtp_client
            .connect()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP connection failed: {}", e)))?;

        info!(provider = "smtp", "Email configuration verified successfully");
        Ok(())
    }

    /// Internal method to send a constructed message using configured provider
    async fn send_message(&self, message: MessageBuilder<'_>) -> EmailResult<String> {
        let EmailProvider::Smtp { host, port, username, password, use_tls } = &self.config.provider;

        let mut smtp_client = SmtpClientBuilder::new(host.as_str(), *port)
            .implicit_tls(*use_tls);
        if let (Some(user), Some(pass)) = (username, password) {
            smtp_client = smtp_client.credentials((user.as_str(), pass.as_str()));
        }

        let mut client = smtp_client
            .connect()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP connection failed: {}", e)))?;

        let message_id = Uuid::new_v4().to_string();
        client
            .send(message)
            .await
            .map_err(|e| EmailError::SendFailed(format!("Failed to send email: {}", e)))?;

        debug!(provider = "smtp", message_id = %message_id, "Email sent successfully");
        Ok(message_id)
    }
}

#[async_trait]
impl AppointmentMailer for EmailService {
    async fn send_appointment_email(
        &self,
        to_address: &str,
        patient_name: &str,
        appointment: &AppointmentEmail,
    ) -> EmailResult<String> {
        if !to_address.contains('@') {
            return Err(EmailError::InvalidRecipient(mask_email(to_address)));
        }

        if !self.config.email_enabled {
            debug!(recipient = %mask_email(to_address), "Email disabled, skipping send");
            return Ok(format!("disabled-{}", Uuid::new_v4()));
        }

        let rendered = self.templates.render(patient_name, appointment)?;
        let message = MessageBuilder::new()
            .from((
                self.config.from_name.as_str(),
                self.config.from_email.as_str(),
            ))
            .to(to_address)
            .subject(rendered.subject)
            .html_body(rendered.html_body)
            .text_body(rendered.text_body);

        info!(
            recipient = %mask_email(to_address),
            status = %appointment.status,
            "Sending appointment email"
        );

        self.send_message(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::AppointmentEmailKind;
    use chrono::NaiveDate;

    fn appointment() -> AppointmentEmail {
        AppointmentEmail {
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: "09:00".to_string(),
            reason: "Checkup".to_string(),
            status: AppointmentEmailKind::Scheduled,
        }
    }

    #[tokio::test]
    async fn test_disabled_service_returns_synthetic_id() {
        let service = EmailService::new(EmailConfig::disabled()).unwrap();
        let id = service
            .send_appointment_email("p@x.com", "Priya", &appointment())
            .await
            .unwrap();
        assert!(id.starts_with("disabled-"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let service = EmailService::new(EmailConfig::disabled()).unwrap();
        let result = service
            .send_appointment_email("not-an-address", "Priya", &appointment())
            .await;
        assert!(matches!(result, Err(EmailError::InvalidRecipient(_))));
    }

    #[tokio::test]
    async fn test_unreachable_smtp_fails() {
        let config = EmailConfig {
            provider: EmailProvider::Smtp {
                host: "127.0.0.1".to_string(),
                port: 1,
                username: None,
                password: None,
                use_tls: false,
            },
            email_enabled: true,
            ..EmailConfig::disabled()
        };
        let service = EmailService::new(config).unwrap();
        let result = service
            .send_appointment_email("p@x.com", "Priya", &appointment())
            .await;
        assert!(matches!(result, Err(EmailError::SendFailed(_))));
        assert!(matches!(service.verify_email_config().await, Err(EmailError::SendFailed(_))));
    }

    #[tokio::test]
    async fn test_disabled_service_skips_connection_check() {
        let service = EmailService::new(EmailConfig::disabled()).unwrap();
        assert!(service.verify_email_config().await.is_ok());
    }
}
