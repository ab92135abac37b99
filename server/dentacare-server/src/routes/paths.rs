//! Route path constants
//!
//! Runtime routes use these constants. utoipa `#[path(...)]` attributes take
//! string literals with `{param}` placeholders and must be kept in step with
//! the `:param` forms below.

pub const API: &str = "/api";

pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

/// Relative to [`API`](super::API)
pub mod api {
    pub const PATIENTS: &str = "/patients";
    pub const PATIENT_BY_ID: &str = "/patients/:id";

    pub const APPOINTMENTS: &str = "/appointments";
    pub const APPOINTMENT_BY_ID: &str = "/appointments/:id";
    pub const APPOINTMENTS_BY_PATIENT: &str = "/appointments/patient/:patient_id";
    pub const APPOINTMENT_STATS: &str = "/appointments/stats";
    pub const APPOINTMENT_RESEND: &str = "/appointments/:id/resend";

    pub const CONTACTS: &str = "/contacts";
    pub const CONTACT_READ: &str = "/contacts/:id/read";

    pub const TREATMENT_RECORDS: &str = "/treatment-records";
    pub const TREATMENT_RECORD_BY_ID: &str = "/treatment-records/:id";
    pub const TREATMENTS: &str = "/treatments";

    pub const AUTH_GOOGLE: &str = "/auth/google/:google_id";
    pub const AUTH_UPDATE_PROFILE: &str = "/auth/update-profile";

    pub const CONFIG_VERIFY_PASSWORD: &str = "/config/verify-password";
    pub const CONFIG_ADMIN_PASSWORD: &str = "/config/admin-password";

    pub const HANDOVER: &str = "/handover";
    pub const HANDOVER_LATEST: &str = "/handover/latest";
    pub const HANDOVER_BY_VERSION: &str = "/handover/:version";
}
