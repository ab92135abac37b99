use email_service::AppointmentMailer;
use std::sync::Arc;
use std::time::Instant;

use crate::services::{
    AdminPasswordService, AdminSessionRegistry, AppointmentService, ContactService, HandoverService, IdentityService,
    NotificationDispatcher, PatientService, ReconciliationService, TreatmentRecordService,
};
use crate::settings::ServerSettings;
use crate::store::ClinicStore;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct DentaCareServer {
    pub settings: Arc<ServerSettings>,
    pub store: Arc<dyn ClinicStore>,
    pub sessions: AdminSessionRegistry,
    pub appointments: AppointmentService,
    pub patients: PatientService,
    pub contacts: ContactService,
    pub records: TreatmentRecordService,
    pub identity: IdentityService,
    pub admin_password: AdminPasswordService,
    pub handover: HandoverService,
    started_at: Instant,
}

impl DentaCareServer {
    /// Wire every service over one store and mailer
    pub fn new(settings: ServerSettings, store: Arc<dyn ClinicStore>, mailer: Arc<dyn AppointmentMailer>) -> Self {
        let notifier = NotificationDispatcher::new(mailer, Arc::clone(&store));
        let contacts = ContactService::new(Arc::clone(&store));
        let appointments = AppointmentService::new(
            Arc::clone(&store),
            contacts.clone(),
            notifier,
            settings.paid_visibility_window(),
            settings.clinic_offset(),
        );
        let reconciliation = ReconciliationService::new(Arc::clone(&store));

        Self {
            sessions: AdminSessionRegistry::new(settings.admin_session_ttl()),
            appointments,
            patients: PatientService::new(Arc::clone(&store), settings.clinic_offset()),
            contacts,
            records: TreatmentRecordService::new(Arc::clone(&store)),
            identity: IdentityService::new(Arc::clone(&store), reconciliation),
            admin_password: AdminPasswordService::new(Arc::clone(&store), settings.admin_password.clone()),
            handover: HandoverService::new(Arc::clone(&store)),
            store,
            settings: Arc::new(settings),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
