//! Property tests: payment and completion timestamps track their statuses
//! across arbitrary edit sequences.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use dentacare_server::models::{Appointment, AppointmentStatus, PaymentStatus};
use proptest::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Edit {
    Payment(PaymentStatus),
    Status(AppointmentStatus),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        prop_oneof![
            Just(PaymentStatus::Unpaid),
            Just(PaymentStatus::Pending),
            Just(PaymentStatus::Paid)
        ]
        .prop_map(Edit::Payment),
        prop_oneof![
            Just(AppointmentStatus::Scheduled),
            Just(AppointmentStatus::Operating),
            Just(AppointmentStatus::Completed),
            Just(AppointmentStatus::Cancelled)
        ]
        .prop_map(Edit::Status),
    ]
}

proptest! {
    #[test]
    fn timestamps_mirror_statuses(edits in prop::collection::vec(edit(), 1..40)) {
        let mut appointment = Appointment::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            "Cleaning",
        );
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();

        for (step, edit) in edits.into_iter().enumerate() {
            let now = start + Duration::minutes(step as i64);
            let paid_before = appointment.marked_paid_at.filter(|_| appointment.is_paid());
            let completed_before = appointment
                .completed_at
                .filter(|_| appointment.status == AppointmentStatus::Completed);

            match edit {
                Edit::Payment(status) => appointment.apply_payment_status(status, now),
                Edit::Status(status) => appointment.apply_status(status, now),
            }

            prop_assert_eq!(appointment.marked_paid_at.is_some(), appointment.is_paid());
            prop_assert_eq!(
                appointment.completed_at.is_some(),
                appointment.status == AppointmentStatus::Completed
            );
            if appointment.is_paid() {
                if let Some(before) = paid_before {
                    prop_assert_eq!(appointment.marked_paid_at, Some(before));
                }
            }
            if appointment.status == AppointmentStatus::Completed {
                if let Some(before) = completed_before {
                    prop_assert_eq!(appointment.completed_at, Some(before));
                }
            }
        }
    }
}
