//! Transactional appointment email for DentaCare Engine
//!
//! The appointment workflow depends only on the [`AppointmentMailer`]
//! trait. [`EmailService`] implements it over SMTP using Stalwart Labs'
//! `mail-send`/`mail-builder`, rendering an HTML and a plain-text part
//! from Handlebars templates.
//!
//! # Example
//!
//! ```rust,no_run
//! use email_service::{AppointmentEmail, AppointmentEmailKind, AppointmentMailer, EmailConfig, EmailService};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = EmailService::new(EmailConfig::from_env()?)?;
//! let message_id = service
//!     .send_appointment_email(
//!         "patient@example.com",
//!         "Priya Shah",
//!         &AppointmentEmail {
//!             date: chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
//!             time: "10:30".to_string(),
//!             reason: "Cleaning".to_string(),
//!             status: AppointmentEmailKind::Scheduled,
//!         },
//!     )
//!     .await?;
//! println!("sent {message_id}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod mailer;
pub mod service;
pub mod templates;

pub use error::*;
pub use mailer::*;
pub use service::*;
pub use templates::*;
