//! Appointment lifecycle
//!
//! Keeps `status`, `payment_status` and their timestamps consistent, mirrors
//! the paid state into exactly one generated treatment record, links the
//! originating contact, and branches off confirmation emails after the
//! appointment is stored.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use email_service::AppointmentEmailKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use super::contacts::ContactService;
use super::treatment_catalog;
use super::notifications::{EmailJob, NotificationDispatcher};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    hhmm, Appointment, AppointmentReason, AppointmentStatus, AppointmentView, DisplayStatus, PaymentStatus,
    TreatmentRecord,
};
use crate::store::{AppointmentFilter, ClinicStore};
use crate::validation::RequestValidation;
use crate::validate_field;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub date: NaiveDate,
    /// `HH:MM`
    #[schema(example = "10:30")]
    pub time: String,
    #[serde(default)]
    pub reason: String,
    pub status: Option<AppointmentStatus>,
    pub is_ticked: Option<bool>,
    pub amount: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
    /// Inquiry being converted into this appointment
    pub contact_id: Option<Uuid>,
}

impl RequestValidation for CreateAppointmentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!(self.time, hhmm::parse(&self.time).is_some(), "Time must be HH:MM");
        validate_field!(self.reason, self.reason.chars().count() <= 1000, "Reason must be at most 1000 characters");
        validate_amount(self.amount)
    }
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub date: Option<NaiveDate>,
    #[schema(example = "11:00")]
    pub time: Option<String>,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub is_ticked: Option<bool>,
    pub amount: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
    pub patient_id: Option<Uuid>,
    /// Contact to notify on reschedule; defaults to the one stored on the appointment
    pub contact_id: Option<Uuid>,
}

impl RequestValidation for UpdateAppointmentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(time) = &self.time {
            validate_field!(time, hhmm::parse(time).is_some(), "Time must be HH:MM");
        }
        if let Some(reason) = &self.reason {
            validate_field!(reason, reason.chars().count() <= 1000, "Reason must be at most 1000 characters");
        }
        validate_amount(self.amount)
    }
}

fn validate_amount(amount: Option<f64>) -> Result<(), ApiError> {
    match amount {
        Some(a) if !a.is_finite() || a < 0.0 => Err(ApiError::validation("Amount must be a non-negative number")),
        _ => Ok(()),
    }
}

fn parse_time(raw: &str) -> ApiResult<NaiveTime> {
    hhmm::parse(raw).ok_or_else(|| ApiError::validation("Time must be HH:MM"))
}

/// Result of a create or update
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentWriteResponse {
    pub appointment: AppointmentView,
    /// Address a confirmation/reschedule email was queued for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResendResponse {
    pub email_sent_to: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStats {
    pub total: u64,
    pub scheduled: u64,
    pub operating: u64,
    pub completed: u64,
    pub cancelled: u64,
    /// Appointments dated today, any status
    pub today: u64,
    /// Scheduled appointments whose start time has passed
    pub delayed: u64,
    pub paid_revenue: f64,
    pub pending_payments: u64,
}

#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn ClinicStore>,
    contacts: ContactService,
    notifier: NotificationDispatcher,
    paid_visibility: Duration,
    clinic_offset: FixedOffset,
}

impl AppointmentService {
    pub fn new(
        store: Arc<dyn ClinicStore>,
        contacts: ContactService,
        notifier: NotificationDispatcher,
        paid_visibility: Duration,
        clinic_offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            contacts,
            notifier,
            paid_visibility,
            clinic_offset,
        }
    }

    /// Calendar date at the clinic for `now`
    pub fn clinic_today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.clinic_offset).date_naive()
    }

    pub async fn create(&self, request: CreateAppointmentRequest) -> ApiResult<AppointmentWriteResponse> {
        request.validate()?;
        let time = parse_time(&request.time)?;
        let patient = self
            .store
            .get_patient(request.patient_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Patient"))?;
        if let Some(contact_id) = request.contact_id {
            self.contacts.get(contact_id).await?;
        }

        let now = Utc::now();
        let mut appointment = Appointment::new(patient.id, request.date, time, request.reason.trim());
        appointment.amount = request
            .amount
            .unwrap_or_else(|| treatment_catalog::estimate(&AppointmentReason::parse(&appointment.reason).treatments));
        appointment.is_ticked = request.is_ticked.unwrap_or(false);
        appointment.contact_id = request.contact_id;
        appointment.apply_status(request.status.unwrap_or_default(), now);
        appointment.apply_payment_status(request.payment_status.unwrap_or_default(), now);

        self.store.insert_appointment(&appointment).await?;
        if appointment.is_paid() {
            self.sync_treatment_record(&appointment, false).await?;
        }
        if let Some(contact_id) = request.contact_id {
            self.contacts.mark_scheduled(contact_id, appointment.id).await?;
        }

        info!(
            appointment_id = %appointment.id,
            patient_id = %patient.id,
            date = %appointment.date,
            "Appointment created"
        );

        let email_sent_to =
            EmailJob::for_appointment(&appointment, &patient, AppointmentEmailKind::Scheduled, request.contact_id)
                .map(|job| {
                    let to = job.to.clone();
                    self.notifier.spawn_appointment_email(job);
                    to
                });

        Ok(AppointmentWriteResponse {
            appointment: AppointmentView::at(appointment, now, self.clinic_offset),
            email_sent_to,
        })
    }

    pub async fn update(&self, id: Uuid, patch: UpdateAppointmentRequest) -> ApiResult<AppointmentWriteResponse> {
        patch.validate()?;
        let mut appointment = self.load(id).await?;
        let now = Utc::now();
        let previous_slot = (appointment.date, appointment.time);
        let previous_billing = (appointment.patient_id, appointment.amount);

        if let Some(patient_id) = patch.patient_id {
            if self.store.get_patient(patient_id).await?.is_none() {
                return Err(ApiError::not_found("Patient"));
            }
            appointment.patient_id = patient_id;
        }
        if let Some(date) = patch.date {
            appointment.date = date;
        }
        if let Some(time) = &patch.time {
            appointment.time = parse_time(time)?;
        }
        if let Some(reason) = &patch.reason {
            appointment.reason = reason.trim().to_string();
        }
        if let Some(is_ticked) = patch.is_ticked {
            appointment.is_ticked = is_ticked;
        }
        if let Some(amount) = patch.amount {
            appointment.amount = amount;
        }
        if let Some(status) = patch.status {
            appointment.apply_status(status, now);
        }
        if let Some(payment_status) = patch.payment_status {
            appointment.apply_payment_status(payment_status, now);
        }

        self.store.update_appointment(&appointment).await?;

        if appointment.is_paid() {
            let billing_changed = previous_billing != (appointment.patient_id, appointment.amount);
            self.sync_treatment_record(&appointment, billing_changed).await?;
        } else if patch.payment_status.is_some() {
            let removed = self.store.delete_records_for_appointment(appointment.id).await?;
            if removed > 0 {
                info!(appointment_id = %appointment.id, removed, "Payment reverted; generated treatment record removed");
            }
        }

        let rescheduled = previous_slot != (appointment.date, appointment.time);
        let email_sent_to = if rescheduled {
            self.notify_reschedule(&appointment, patch.contact_id.or(appointment.contact_id))
                .await?
        } else {
            None
        };

        debug!(appointment_id = %id, rescheduled, "Appointment updated");
        Ok(AppointmentWriteResponse {
            appointment: AppointmentView::at(appointment, now, self.clinic_offset),
            email_sent_to,
        })
    }

    /// Reset the contact's email flag and queue a "Rescheduled" email
    async fn notify_reschedule(&self, appointment: &Appointment, contact_id: Option<Uuid>) -> ApiResult<Option<String>> {
        let Some(contact_id) = contact_id else {
            return Ok(None);
        };
        match self.contacts.record_email_result(contact_id, false).await {
            Ok(()) => {}
            Err(ApiError::NotFound { .. }) => {
                debug!(contact_id = %contact_id, "Reschedule contact not found; skipping email");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        let Some(patient) = self.store.get_patient(appointment.patient_id).await? else {
            return Ok(None);
        };

        Ok(
            EmailJob::for_appointment(appointment, &patient, AppointmentEmailKind::Rescheduled, Some(contact_id)).map(
                |job| {
                    let to = job.to.clone();
                    self.notifier.spawn_appointment_email(job);
                    to
                },
            ),
        )
    }

    /// Make sure the paid appointment has its one generated record; refresh
    /// it when the patient or amount changed
    async fn sync_treatment_record(&self, appointment: &Appointment, billing_changed: bool) -> ApiResult<()> {
        let record = TreatmentRecord::for_paid_appointment(appointment);
        if self.store.insert_record_if_absent(&record).await? {
            info!(appointment_id = %appointment.id, record_id = %record.id, "Treatment record generated on payment");
            return Ok(());
        }
        if billing_changed {
            for mut existing in self.store.records_for_appointment(appointment.id).await? {
                existing.patient_id = appointment.patient_id;
                existing.cost = appointment.amount;
                existing.notes = record.notes.clone();
                self.store.update_record(&existing).await?;
            }
        }
        Ok(())
    }

    /// Removes only the appointment; a generated record stays behind
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        if !self.store.delete_appointment(id).await? {
            return Err(ApiError::not_found("Appointment"));
        }
        info!(appointment_id = %id, "Appointment deleted");
        Ok(())
    }

    /// Awaited confirmation resend
    pub async fn resend(&self, id: Uuid, contact_id: Option<Uuid>) -> ApiResult<ResendResponse> {
        let appointment = self.load(id).await?;
        let patient = self
            .store
            .get_patient(appointment.patient_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Patient"))?;
        let job = EmailJob::for_appointment(
            &appointment,
            &patient,
            AppointmentEmailKind::Scheduled,
            contact_id.or(appointment.contact_id),
        )
        .ok_or_else(|| ApiError::bad_request("Patient has no email address"))?;

        let message_id = self.notifier.send_now(&job).await?;
        Ok(ResendResponse {
            email_sent_to: job.to,
            message_id,
        })
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<AppointmentView> {
        Ok(AppointmentView::at(self.load(id).await?, Utc::now(), self.clinic_offset))
    }

    async fn load(&self, id: Uuid) -> ApiResult<Appointment> {
        self.store
            .get_appointment(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Appointment"))
    }

    /// `schedule_view` hides appointments paid longer ago than the visibility window
    pub async fn list(
        &self,
        filter: &AppointmentFilter,
        schedule_view: bool,
        now: DateTime<Utc>,
    ) -> ApiResult<Vec<AppointmentView>> {
        let appointments = self.store.list_appointments(filter).await?;
        Ok(appointments
            .into_iter()
            .filter(|a| !schedule_view || a.visible_in_schedule(now, self.paid_visibility))
            .map(|a| AppointmentView::at(a, now, self.clinic_offset))
            .collect())
    }

    pub async fn list_for_patient(&self, patient_id: Uuid) -> ApiResult<Vec<AppointmentView>> {
        if self.store.get_patient(patient_id).await?.is_none() {
            return Err(ApiError::not_found("Patient"));
        }
        self.list(&AppointmentFilter::for_patient(patient_id), false, Utc::now())
            .await
    }

    pub async fn stats(&self, today: NaiveDate, now: DateTime<Utc>) -> ApiResult<AppointmentStats> {
        let appointments = self.store.list_appointments(&AppointmentFilter::default()).await?;
        let mut stats = AppointmentStats::default();
        for appointment in &appointments {
            stats.total += 1;
            match appointment.status {
                AppointmentStatus::Scheduled => stats.scheduled += 1,
                AppointmentStatus::Operating => stats.operating += 1,
                AppointmentStatus::Completed => stats.completed += 1,
                AppointmentStatus::Cancelled => stats.cancelled += 1,
            }
            if appointment.date == today {
                stats.today += 1;
            }
            if appointment.display_status(now, self.clinic_offset) == DisplayStatus::Delayed {
                stats.delayed += 1;
            }
            match appointment.payment_status {
                PaymentStatus::Paid => stats.paid_revenue += appointment.amount,
                PaymentStatus::Pending => stats.pending_payments += 1,
                PaymentStatus::Unpaid => {}
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use email_service::{AppointmentEmail, AppointmentMailer, EmailResult};

    struct NullMailer;

    #[async_trait]
    impl AppointmentMailer for NullMailer {
        async fn send_appointment_email(&self, _: &str, _: &str, _: &AppointmentEmail) -> EmailResult<String> {
            Ok("null".to_string())
        }
    }

    async fn service() -> (AppointmentService, Patient) {
        let store: Arc<dyn ClinicStore> = Arc::new(InMemoryStore::new());
        let patient = Patient::new("Vera");
        store.insert_patient(&patient).await.unwrap();
        let notifier = NotificationDispatcher::new(Arc::new(NullMailer), Arc::clone(&store));
        let svc = AppointmentService::new(
            Arc::clone(&store),
            ContactService::new(Arc::clone(&store)),
            notifier,
            Duration::minutes(5),
            FixedOffset::east_opt(0).unwrap(),
        );
        (svc, patient)
    }

    fn request(patient: &Patient, payment_status: Option<PaymentStatus>) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_id: patient.id,
            date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            time: "10:00".to_string(),
            reason: "Scaling".to_string(),
            status: None,
            is_ticked: None,
            amount: Some(900.0),
            payment_status,
            contact_id: None,
        }
    }

    #[tokio::test]
    async fn test_schedule_view_hides_settled_visits() {
        let (svc, patient) = service().await;
        svc.create(request(&patient, Some(PaymentStatus::Paid))).await.unwrap();
        svc.create(request(&patient, None)).await.unwrap();

        let soon = Utc::now() + Duration::minutes(1);
        let later = Utc::now() + Duration::minutes(10);
        let filter = AppointmentFilter::default();
        assert_eq!(svc.list(&filter, true, soon).await.unwrap().len(), 2);
        assert_eq!(svc.list(&filter, true, later).await.unwrap().len(), 1);
        assert_eq!(svc.list(&filter, false, later).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stats_counts_revenue_and_pending() {
        let (svc, patient) = service().await;
        svc.create(request(&patient, Some(PaymentStatus::Paid))).await.unwrap();
        svc.create(request(&patient, Some(PaymentStatus::Pending))).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let before_start = today.and_hms_opt(9, 0, 0).unwrap().and_utc();
        let stats = svc.stats(today, before_start).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.today, 2);
        assert_eq!(stats.delayed, 0);
        assert_eq!(stats.paid_revenue, 900.0);
        assert_eq!(stats.pending_payments, 1);
    }

    #[tokio::test]
    async fn test_clinic_offset_drives_today_and_delay() {
        let (utc_svc, patient) = service().await;
        let svc = AppointmentService {
            clinic_offset: FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap(),
            ..utc_svc
        };
        svc.create(request(&patient, None)).await.unwrap();

        // 2026-06-30 20:00 UTC is already 01:30 on 2026-07-01 at the clinic
        let late_evening = NaiveDate::from_ymd_opt(2026, 6, 30)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(svc.clinic_today(late_evening), NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());

        // 10:00 local is 04:30 UTC; by 06:30 UTC (12:00 local) the visit is late
        let day = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let stats = svc.stats(day, day.and_hms_opt(6, 30, 0).unwrap().and_utc()).await.unwrap();
        assert_eq!(stats.delayed, 1);
        let stats = svc.stats(day, day.and_hms_opt(4, 0, 0).unwrap().and_utc()).await.unwrap();
        assert_eq!(stats.delayed, 0);
    }
}
