use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::DentaCareServer;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        crate::handlers::patients::list_patients,
        crate::handlers::patients::create_patient,
        crate::handlers::patients::get_patient,
        crate::handlers::patients::update_patient,
        crate::handlers::patients::delete_patient,

        crate::handlers::appointments::list_appointments,
        crate::handlers::appointments::create_appointment,
        crate::handlers::appointments::get_appointment,
        crate::handlers::appointments::update_appointment,
        crate::handlers::appointments::delete_appointment,
        crate::handlers::appointments::list_patient_appointments,
        crate::handlers::appointments::appointment_stats,
        crate::handlers::appointments::resend_appointment_email,

        crate::handlers::contacts::list_contacts,
        crate::handlers::contacts::submit_contact,
        crate::handlers::contacts::mark_contact_read,

        crate::handlers::treatment_records::list_records,
        crate::handlers::treatment_records::create_record,
        crate::handlers::treatment_records::get_record,
        crate::handlers::treatment_records::update_record,
        crate::handlers::treatment_records::delete_record,
        crate::handlers::treatment_records::list_treatments,

        crate::handlers::auth::fetch_user,
        crate::handlers::auth::sync_user,
        crate::handlers::auth::update_profile,

        crate::handlers::config::verify_password,
        crate::handlers::config::session_status,
        crate::handlers::config::rotate_password,

        crate::handlers::handover::latest_handover,
        crate::handlers::handover::get_handover,
        crate::handlers::handover::publish_handover,
    ),
    components(
        schemas(
            crate::error::ApiErrorResponse,
            crate::error::PaginationInfo,
            crate::handlers::DeletedResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,

            crate::models::Patient,
            crate::models::Appointment,
            crate::models::AppointmentView,
            crate::models::AppointmentStatus,
            crate::models::PaymentStatus,
            crate::models::DisplayStatus,
            crate::models::TreatmentRecord,
            crate::models::TreatmentRecordView,
            crate::models::PrescriptionLine,
            crate::models::PrescriptionKind,
            crate::models::Contact,
            crate::models::ContactStatus,
            crate::models::PatientType,
            crate::models::User,
            crate::models::HandoverTemp,

            crate::services::patients::CreatePatientRequest,
            crate::services::patients::UpdatePatientRequest,
            crate::services::patients::PatientSummary,
            crate::services::appointments::CreateAppointmentRequest,
            crate::services::appointments::UpdateAppointmentRequest,
            crate::services::appointments::AppointmentWriteResponse,
            crate::services::appointments::AppointmentStats,
            crate::services::appointments::ResendResponse,
            crate::handlers::appointments::ResendRequest,
            crate::services::contacts::SubmitContactRequest,
            crate::services::treatment_records::CreateTreatmentRecordRequest,
            crate::services::treatment_records::UpdateTreatmentRecordRequest,
            crate::services::treatment_catalog::Treatment,
            crate::services::identity::SyncLoginRequest,
            crate::services::identity::UpdateProfileRequest,
            crate::services::identity::AuthProfile,
            crate::services::AdminSession,
            crate::handlers::config::VerifyPasswordRequest,
            crate::handlers::config::VerifyPasswordResponse,
            crate::handlers::config::SessionStatusResponse,
            crate::handlers::config::RotatePasswordRequest,
            crate::store::CascadeOutcome,
        )
    ),
    modifiers(&AdminSessionAddon),
    tags(
        (name = "health", description = "Liveness and version endpoints"),
        (name = "patients", description = "Patient intake and records"),
        (name = "appointments", description = "Appointment lifecycle, payments and confirmations"),
        (name = "contacts", description = "Inquiries from the public site"),
        (name = "treatment-records", description = "Treatment history and the treatment catalog"),
        (name = "auth", description = "Patient portal login sync and profile"),
        (name = "config", description = "Admin password and dashboard sessions"),
        (name = "handover", description = "Versioned branding content"),
    ),
    info(
        title = "DentaCare Engine API",
        version = "0.1.0",
        description = "Dental clinic backend: patients, appointments, treatment records and inquiries.",
        contact(
            name = "DentaCare Team",
            email = "team@dentacare.dev",
            url = "https://dentacare.dev"
        ),
        license(
            name = "MIT OR Apache-2.0",
            url = "https://github.com/dentacare/dentacare-engine/blob/main/LICENSE"
        ),
    ),
)]
pub struct ApiDoc;

/// Registers the `X-Admin-Session` header scheme
struct AdminSessionAddon;

impl Modify for AdminSessionAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_session",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Admin-Session"))),
            );
        }
    }
}

pub fn create_docs_routes() -> Router<DentaCareServer> {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
