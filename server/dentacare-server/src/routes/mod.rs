pub mod paths;

use axum::{
    routing::{get, put},
    Router,
};

use crate::{
    handlers::{appointments, auth, config, contacts, handover, health, patients, treatment_records},
    openapi,
    server::DentaCareServer,
};

/// Create health check routes
pub fn health_routes() -> Router<DentaCareServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
}

pub fn patient_routes() -> Router<DentaCareServer> {
    Router::new()
        .route(
            paths::api::PATIENTS,
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            paths::api::PATIENT_BY_ID,
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
}

pub fn appointment_routes() -> Router<DentaCareServer> {
    Router::new()
        .route(
            paths::api::APPOINTMENTS,
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(paths::api::APPOINTMENT_STATS, get(appointments::appointment_stats))
        .route(
            paths::api::APPOINTMENTS_BY_PATIENT,
            get(appointments::list_patient_appointments),
        )
        .route(
            paths::api::APPOINTMENT_BY_ID,
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(
            paths::api::APPOINTMENT_RESEND,
            axum::routing::post(appointments::resend_appointment_email),
        )
}

pub fn contact_routes() -> Router<DentaCareServer> {
    Router::new()
        .route(
            paths::api::CONTACTS,
            get(contacts::list_contacts).post(contacts::submit_contact),
        )
        .route(paths::api::CONTACT_READ, put(contacts::mark_contact_read))
}

pub fn treatment_record_routes() -> Router<DentaCareServer> {
    Router::new()
        .route(
            paths::api::TREATMENT_RECORDS,
            get(treatment_records::list_records).post(treatment_records::create_record),
        )
        .route(
            paths::api::TREATMENT_RECORD_BY_ID,
            get(treatment_records::get_record)
                .put(treatment_records::update_record)
                .delete(treatment_records::delete_record),
        )
        .route(paths::api::TREATMENTS, get(treatment_records::list_treatments))
}

pub fn auth_routes() -> Router<DentaCareServer> {
    Router::new()
        .route(paths::api::AUTH_GOOGLE, get(auth::fetch_user).post(auth::sync_user))
        .route(paths::api::AUTH_UPDATE_PROFILE, put(auth::update_profile))
}

pub fn config_routes() -> Router<DentaCareServer> {
    Router::new()
        .route(
            paths::api::CONFIG_VERIFY_PASSWORD,
            get(config::session_status).post(config::verify_password),
        )
        .route(paths::api::CONFIG_ADMIN_PASSWORD, put(config::rotate_password))
}

pub fn handover_routes() -> Router<DentaCareServer> {
    Router::new()
        .route(paths::api::HANDOVER, axum::routing::post(handover::publish_handover))
        .route(paths::api::HANDOVER_LATEST, get(handover::latest_handover))
        .route(paths::api::HANDOVER_BY_VERSION, get(handover::get_handover))
}

pub fn api_routes() -> Router<DentaCareServer> {
    Router::new()
        .merge(patient_routes())
        .merge(appointment_routes())
        .merge(contact_routes())
        .merge(treatment_record_routes())
        .merge(auth_routes())
        .merge(config_routes())
        .merge(handover_routes())
}

/// Create the complete route tree
pub fn create_routes() -> Router<DentaCareServer> {
    Router::new()
        .merge(health_routes())
        .merge(openapi::create_docs_routes())
        .nest(paths::API, api_routes())
}
