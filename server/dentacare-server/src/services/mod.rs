//! Domain services. Each one owns a handle to the store and encapsulates one
//! workflow; handlers stay thin.

pub mod admin_password;
pub mod admin_session;
pub mod appointments;
pub mod contacts;
pub mod handover;
pub mod identity;
pub mod notifications;
pub mod patients;
pub mod prescriptions;
pub mod reconciliation;
pub mod treatment_catalog;
pub mod treatment_records;

pub use admin_password::{AdminPasswordService, PasswordCheck, MIN_PASSWORD_LENGTH};
pub use admin_session::{AdminSession, AdminSessionRegistry, SessionCheck};
pub use appointments::AppointmentService;
pub use contacts::ContactService;
pub use handover::HandoverService;
pub use identity::IdentityService;
pub use notifications::{EmailJob, NotificationDispatcher};
pub use patients::PatientService;
pub use reconciliation::{ReconcileOutcome, ReconciliationService};
pub use treatment_records::TreatmentRecordService;
