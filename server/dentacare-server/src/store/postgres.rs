// PostgreSQL-backed store
use async_trait::async_trait;
use database_layer::{DatabaseError, DatabasePool};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    AppointmentFilter, CascadeOutcome, ClinicStore, MergeOutcome, OrphanQuery, PatientQuery, StoreError,
    StoreResult,
};
use crate::models::{Appointment, ConfigEntry, Contact, HandoverTemp, Patient, TreatmentRecord, User};

const PATIENT_COLUMNS: &str = "id, name, age, gender, contact, email, address, medical_history, \
     added_by_admin, user_id, created_at";
const USER_COLUMNS: &str = "id, google_id, email, name, image, contact, patient_id, created_at";
const APPOINTMENT_COLUMNS: &str = "id, date, time, patient_id, reason, status, is_ticked, amount, \
     payment_status, marked_paid_at, completed_at, contact_id, created_at";
const RECORD_COLUMNS: &str = "id, patient_id, appointment_id, treatment_name, date, cost, notes, \
     prescription, created_at";
const CONTACT_COLUMNS: &str = "id, name, phone, email, message, status, patient_type, appointment_id, \
     email_sent, created_at";

/// Trailing ten digits of the stored contact, for phone matching in SQL
const CONTACT_SUFFIX_SQL: &str = "RIGHT(REGEXP_REPLACE(contact, '[^0-9]', '', 'g'), 10)";

pub struct PgStore {
    db: DatabasePool,
}

impl PgStore {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(self.db.pool())
            .await
            .map_err(|e| StoreError::Database(DatabaseError::MigrationError(e.to_string())))?;
        info!("Database migrations applied");
        Ok(())
    }

    fn ensure_updated(rows: u64, entity: &'static str, id: Uuid) -> StoreResult<()> {
        if rows == 0 {
            Err(StoreError::not_found(entity, id))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ClinicStore for PgStore {
    async fn insert_patient(&self, patient: &Patient) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO patients (id, name, age, gender, contact, email, address, medical_history, \
             added_by_admin, user_id, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(patient.id)
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(&patient.contact)
        .bind(&patient.email)
        .bind(&patient.address)
        .bind(&patient.medical_history)
        .bind(patient.added_by_admin)
        .bind(patient.user_id)
        .bind(patient.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        let patient = sqlx::query_as::<_, Patient>(&format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(patient)
    }

    async fn update_patient(&self, patient: &Patient) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE patients SET name = $2, age = $3, gender = $4, contact = $5, email = $6, address = $7, \
             medical_history = $8, added_by_admin = $9, user_id = $10 WHERE id = $1",
        )
        .bind(patient.id)
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(&patient.contact)
        .bind(&patient.email)
        .bind(&patient.address)
        .bind(&patient.medical_history)
        .bind(patient.added_by_admin)
        .bind(patient.user_id)
        .execute(self.db.pool())
        .await?;
        Self::ensure_updated(result.rows_affected(), "Patient", patient.id)
    }

    async fn list_patients(&self, query: &PatientQuery) -> StoreResult<(Vec<Patient>, u64)> {
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", t.to_lowercase()));

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM patients");
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {PATIENT_COLUMNS} FROM patients"));
        if let Some(pattern) = &pattern {
            for builder in [&mut count, &mut select] {
                builder
                    .push(" WHERE (LOWER(name) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR email LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR contact LIKE ")
                    .push_bind(pattern.clone())
                    .push(")");
            }
        }
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));

        let total: i64 = count.build_query_scalar::<i64>().fetch_one(self.db.pool()).await?;
        let patients = select.build_query_as::<Patient>().fetch_all(self.db.pool()).await?;
        Ok((patients, u64::try_from(total).unwrap_or_default()))
    }

    async fn find_patient_by_user(&self, user_id: Uuid) -> StoreResult<Option<Patient>> {
        let patient = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE user_id = $1 ORDER BY created_at LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(patient)
    }

    async fn find_orphans(&self, query: &OrphanQuery) -> StoreResult<Vec<Patient>> {
        let name = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let email = query.email.as_deref().filter(|e| !e.is_empty());
        let suffix = query.phone_suffix.as_deref().filter(|s| !s.is_empty());

        let orphans = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE user_id IS NULL AND ( \
                 ($1::TEXT IS NOT NULL AND email = $1) \
              OR ($2::TEXT IS NOT NULL AND LOWER(TRIM(name)) = LOWER($2)) \
              OR ($3::TEXT IS NOT NULL AND {CONTACT_SUFFIX_SQL} = $3) \
             ) ORDER BY created_at, id"
        ))
        .bind(email)
        .bind(name)
        .bind(suffix)
        .fetch_all(self.db.pool())
        .await?;
        Ok(orphans)
    }

    async fn find_patients_by_phone_suffix(&self, suffix: &str) -> StoreResult<Vec<Patient>> {
        let patients = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE {CONTACT_SUFFIX_SQL} = $1"
        ))
        .bind(suffix)
        .fetch_all(self.db.pool())
        .await?;
        Ok(patients)
    }

    async fn merge_patients(&self, primary: Uuid, orphan: Uuid) -> StoreResult<MergeOutcome> {
        if primary == orphan {
            return Err(StoreError::Conflict("cannot merge a patient into itself".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients WHERE id = $1 OR id = $2")
            .bind(primary)
            .bind(orphan)
            .fetch_one(&mut *tx)
            .await?;
        if found < 2 {
            return Err(StoreError::not_found("Patient", format!("{primary} or {orphan}")));
        }

        let appointments = sqlx::query("UPDATE appointments SET patient_id = $1 WHERE patient_id = $2")
            .bind(primary)
            .bind(orphan)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let records = sqlx::query("UPDATE treatment_records SET patient_id = $1 WHERE patient_id = $2")
            .bind(primary)
            .bind(orphan)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("UPDATE users SET patient_id = $1 WHERE patient_id = $2")
            .bind(primary)
            .bind(orphan)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(orphan)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(%primary, %orphan, appointments, records, "Patients merged");

        Ok(MergeOutcome {
            appointments_moved: appointments,
            records_moved: records,
        })
    }

    async fn delete_patient_cascade(&self, id: Uuid) -> StoreResult<CascadeOutcome> {
        let mut tx = self.db.begin().await?;

        let records = sqlx::query("DELETE FROM treatment_records WHERE patient_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let appointments = sqlx::query("DELETE FROM appointments WHERE patient_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("UPDATE users SET patient_id = NULL WHERE patient_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // dropping the transaction rolls it back
            return Err(StoreError::not_found("Patient", id));
        }
        tx.commit().await?;

        Ok(CascadeOutcome {
            appointments_deleted: appointments,
            records_deleted: records,
        })
    }

    async fn get_user_by_google_id(&self, google_id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"))
            .bind(google_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, google_id, email, name, image, contact, patient_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (google_id) DO NOTHING",
        )
        .bind(user.id)
        .bind(&user.google_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .bind(&user.contact)
        .bind(user.patient_id)
        .bind(user.created_at)
        .execute(self.db.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!("user {} already exists", user.google_id)));
        }
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, name = $3, image = $4, contact = $5, patient_id = $6 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .bind(&user.contact)
        .bind(user.patient_id)
        .execute(self.db.pool())
        .await?;
        Self::ensure_updated(result.rows_affected(), "User", user.id)
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO appointments (id, date, time, patient_id, reason, status, is_ticked, amount, \
             payment_status, marked_paid_at, completed_at, contact_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(appointment.id)
        .bind(appointment.date)
        .bind(appointment.time)
        .bind(appointment.patient_id)
        .bind(&appointment.reason)
        .bind(appointment.status)
        .bind(appointment.is_ticked)
        .bind(appointment.amount)
        .bind(appointment.payment_status)
        .bind(appointment.marked_paid_at)
        .bind(appointment.completed_at)
        .bind(appointment.contact_id)
        .bind(appointment.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(appointment)
    }

    async fn update_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE appointments SET date = $2, time = $3, patient_id = $4, reason = $5, status = $6, \
             is_ticked = $7, amount = $8, payment_status = $9, marked_paid_at = $10, completed_at = $11, \
             contact_id = $12 WHERE id = $1",
        )
        .bind(appointment.id)
        .bind(appointment.date)
        .bind(appointment.time)
        .bind(appointment.patient_id)
        .bind(&appointment.reason)
        .bind(appointment.status)
        .bind(appointment.is_ticked)
        .bind(appointment.amount)
        .bind(appointment.payment_status)
        .bind(appointment.marked_paid_at)
        .bind(appointment.completed_at)
        .bind(appointment.contact_id)
        .execute(self.db.pool())
        .await?;
        Self::ensure_updated(result.rows_affected(), "Appointment", appointment.id)
    }

    async fn delete_appointment(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE TRUE"));
        if let Some(date) = filter.date {
            builder.push(" AND date = ").push_bind(date);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(patient_id) = filter.patient_id {
            builder.push(" AND patient_id = ").push_bind(patient_id);
        }
        builder.push(" ORDER BY date, time, created_at");

        let appointments = builder.build_query_as::<Appointment>().fetch_all(self.db.pool()).await?;
        Ok(appointments)
    }

    async fn insert_record(&self, record: &TreatmentRecord) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO treatment_records (id, patient_id, appointment_id, treatment_name, date, cost, notes, \
             prescription, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.id)
        .bind(record.patient_id)
        .bind(record.appointment_id)
        .bind(&record.treatment_name)
        .bind(record.date)
        .bind(record.cost)
        .bind(&record.notes)
        .bind(&record.prescription)
        .bind(record.created_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(StoreError::Conflict(
                "appointment already has a treatment record".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_record_if_absent(&self, record: &TreatmentRecord) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO treatment_records (id, patient_id, appointment_id, treatment_name, date, cost, notes, \
             prescription, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT DO NOTHING",
        )
        .bind(record.id)
        .bind(record.patient_id)
        .bind(record.appointment_id)
        .bind(&record.treatment_name)
        .bind(record.date)
        .bind(record.cost)
        .bind(&record.notes)
        .bind(&record.prescription)
        .bind(record.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_record(&self, id: Uuid) -> StoreResult<Option<TreatmentRecord>> {
        let record = sqlx::query_as::<_, TreatmentRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM treatment_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(record)
    }

    async fn update_record(&self, record: &TreatmentRecord) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE treatment_records SET patient_id = $2, treatment_name = $3, date = $4, cost = $5, \
             notes = $6, prescription = $7 WHERE id = $1",
        )
        .bind(record.id)
        .bind(record.patient_id)
        .bind(&record.treatment_name)
        .bind(record.date)
        .bind(record.cost)
        .bind(&record.notes)
        .bind(&record.prescription)
        .execute(self.db.pool())
        .await?;
        Self::ensure_updated(result.rows_affected(), "TreatmentRecord", record.id)
    }

    async fn delete_record(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM treatment_records WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_records_for_appointment(&self, appointment_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM treatment_records WHERE appointment_id = $1")
            .bind(appointment_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_records(&self, patient_id: Option<Uuid>) -> StoreResult<Vec<TreatmentRecord>> {
        let records = sqlx::query_as::<_, TreatmentRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM treatment_records \
             WHERE ($1::UUID IS NULL OR patient_id = $1) ORDER BY date DESC, created_at DESC"
        ))
        .bind(patient_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(records)
    }

    async fn records_for_appointment(&self, appointment_id: Uuid) -> StoreResult<Vec<TreatmentRecord>> {
        let records = sqlx::query_as::<_, TreatmentRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM treatment_records WHERE appointment_id = $1"
        ))
        .bind(appointment_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(records)
    }

    async fn insert_contact(&self, contact: &Contact) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO contacts (id, name, phone, email, message, status, patient_type, appointment_id, \
             email_sent, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(contact.id)
        .bind(&contact.name)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.message)
        .bind(contact.status)
        .bind(contact.patient_type)
        .bind(contact.appointment_id)
        .bind(contact.email_sent)
        .bind(contact.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_contact(&self, id: Uuid) -> StoreResult<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(contact)
    }

    async fn update_contact(&self, contact: &Contact) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE contacts SET name = $2, phone = $3, email = $4, message = $5, status = $6, \
             patient_type = $7, appointment_id = $8, email_sent = $9 WHERE id = $1",
        )
        .bind(contact.id)
        .bind(&contact.name)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.message)
        .bind(contact.status)
        .bind(contact.patient_type)
        .bind(contact.appointment_id)
        .bind(contact.email_sent)
        .execute(self.db.pool())
        .await?;
        Self::ensure_updated(result.rows_affected(), "Contact", contact.id)
    }

    async fn set_contact_email_sent(&self, id: Uuid, sent: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE contacts SET email_sent = $2 WHERE id = $1")
            .bind(id)
            .bind(sent)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC"
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(contacts)
    }

    async fn get_config(&self, key: &str) -> StoreResult<Option<ConfigEntry>> {
        let entry = sqlx::query_as::<_, ConfigEntry>("SELECT key, value, updated_at FROM config WHERE key = $1")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(entry)
    }

    async fn set_config(&self, key: &str, value: &str) -> StoreResult<ConfigEntry> {
        let entry = sqlx::query_as::<_, ConfigEntry>(
            "INSERT INTO config (key, value, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW() \
             RETURNING key, value, updated_at",
        )
        .bind(key)
        .bind(value)
        .fetch_one(self.db.pool())
        .await?;
        Ok(entry)
    }

    async fn insert_handover(&self, payload: serde_json::Value) -> StoreResult<HandoverTemp> {
        let mut tx = self.db.begin().await?;
        // serialise writers so versions stay gap-free
        sqlx::query("LOCK TABLE handover_temp IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let handover = sqlx::query_as::<_, HandoverTemp>(
            "INSERT INTO handover_temp (version, payload, created_at) \
             SELECT COALESCE(MAX(version), 0) + 1, $1, NOW() FROM handover_temp \
             RETURNING version, payload, created_at",
        )
        .bind(payload)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(handover)
    }

    async fn latest_handover(&self) -> StoreResult<Option<HandoverTemp>> {
        let handover = sqlx::query_as::<_, HandoverTemp>(
            "SELECT version, payload, created_at FROM handover_temp ORDER BY version DESC LIMIT 1",
        )
        .fetch_optional(self.db.pool())
        .await?;
        Ok(handover)
    }

    async fn get_handover(&self, version: i64) -> StoreResult<Option<HandoverTemp>> {
        let handover = sqlx::query_as::<_, HandoverTemp>(
            "SELECT version, payload, created_at FROM handover_temp WHERE version = $1",
        )
        .bind(version)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(handover)
    }

    async fn is_healthy(&self) -> bool {
        self.db.is_healthy().await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
