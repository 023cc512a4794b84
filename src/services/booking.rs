use chrono::{NaiveDate, NaiveTime};

use crate::models::booking::{DATE_FORMAT, TIME_FORMAT};
use crate::models::{Booking, BookingStatus, NewBooking};
use crate::store::{Appended, Approval, BookingStore, StoreError};

pub const MAX_DURATION_MINUTES: i32 = 240;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Invalid(String),

    #[error("booking {0} not found")]
    NotFound(String),

    #[error("the lift is already booked for that slot")]
    Conflict,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Trims and checks a submission. The returned copy carries the date and
/// time re-formatted as `YYYY-MM-DD` and `HH:MM`, since chrono also accepts
/// unpadded input like `2025-6-5` and stored dates are compared as strings.
pub fn validate_new_booking(new: &NewBooking, today: NaiveDate) -> Result<NewBooking, BookingError> {
    let unit = new.unit.trim().to_string();
    let apartment = new.apartment.trim().to_string();

    if unit.is_empty() || apartment.is_empty() {
        return Err(BookingError::Invalid(
            "unit and apartment are required".to_string(),
        ));
    }

    let raw_date = new.date.trim();
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
        BookingError::Invalid(format!("date must be YYYY-MM-DD, got {raw_date:?}"))
    })?;
    if date < today {
        return Err(BookingError::Invalid(format!(
            "cannot book the lift for a past date ({date})"
        )));
    }

    let raw_time = new.time.trim();
    let time = NaiveTime::parse_from_str(raw_time, TIME_FORMAT).map_err(|_| {
        BookingError::Invalid(format!("time must be HH:MM, got {raw_time:?}"))
    })?;

    if !(1..=MAX_DURATION_MINUTES).contains(&new.duration) {
        return Err(BookingError::Invalid(format!(
            "duration must be between 1 and {MAX_DURATION_MINUTES} minutes"
        )));
    }

    Ok(NewBooking {
        unit,
        apartment,
        date: date.format(DATE_FORMAT).to_string(),
        time: time.format(TIME_FORMAT).to_string(),
        duration: new.duration,
    })
}

/// Validates a resident submission and appends it as pending, unless it
/// overlaps an approved booking.
pub fn submit_booking(
    store: &dyn BookingStore,
    new: &NewBooking,
    today: NaiveDate,
) -> Result<Booking, BookingError> {
    let cleaned = validate_new_booking(new, today)?;

    let booking = match store.append_if_free(&cleaned)? {
        Appended::Stored(booking) => booking,
        Appended::Conflict(existing) => {
            tracing::info!(date = %cleaned.date, existing_id = %existing.id, "lift slot conflict");
            return Err(BookingError::Conflict);
        }
    };

    tracing::info!(
        booking_id = %booking.id,
        unit = %booking.unit,
        apartment = %booking.apartment,
        date = %booking.date,
        time = %booking.time,
        "lift booking submitted"
    );
    Ok(booking)
}

/// Admin decision on a booking. Rejections are last-write-wins. Approvals
/// check for overlapping approved bookings and write in one store call, so
/// two concurrent approvals of clashing slots cannot both succeed.
pub fn transition(
    store: &dyn BookingStore,
    id: &str,
    status: BookingStatus,
) -> Result<Booking, BookingError> {
    let updated = match status {
        BookingStatus::Pending => {
            return Err(BookingError::Invalid(
                "bookings can only be approved or rejected".to_string(),
            ));
        }
        BookingStatus::Approved => match store.approve_if_free(id)? {
            Approval::Approved(booking) => booking,
            Approval::Conflict(existing) => {
                tracing::info!(booking_id = %id, existing_id = %existing.id, "lift slot conflict");
                return Err(BookingError::Conflict);
            }
            Approval::NotFound => return Err(BookingError::NotFound(id.to_string())),
        },
        BookingStatus::Rejected => {
            if !store.update_status(id, status)? {
                return Err(BookingError::NotFound(id.to_string()));
            }
            store
                .get(id)?
                .ok_or_else(|| BookingError::NotFound(id.to_string()))?
        }
    };

    tracing::info!(booking_id = %id, to = %status, "booking transitioned");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::SqliteBookingStore;
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;

    fn setup_store() -> SqliteBookingStore {
        let conn = db::init_db(":memory:").unwrap();
        SqliteBookingStore::new(Arc::new(Mutex::new(conn)))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn request(date: &str, time: &str, duration: i32) -> NewBooking {
        NewBooking {
            unit: "C".to_string(),
            apartment: "7".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            duration,
        }
    }

    #[test]
    fn test_submit_creates_pending_booking() {
        let store = setup_store();
        let mut req = request("2025-06-16", "10:00", 60);
        req.unit = "  C ".to_string();

        let booking = submit_booking(&store, &req, today()).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.unit, "C");
    }

    #[test]
    fn test_submit_rejects_bad_input() {
        let store = setup_store();
        let cases = [
            request("16/06/2025", "10:00", 60),
            request("2025-06-16", "10am", 60),
            request("2025-06-16", "10:00", 0),
            request("2025-06-16", "10:00", MAX_DURATION_MINUTES + 1),
            request("2025-05-31", "10:00", 60),
        ];
        for req in &cases {
            let err = submit_booking(&store, req, today()).unwrap_err();
            assert!(matches!(err, BookingError::Invalid(_)), "{req:?} gave {err:?}");
        }

        let mut missing_unit = request("2025-06-16", "10:00", 60);
        missing_unit.unit = "   ".to_string();
        assert!(matches!(
            submit_booking(&store, &missing_unit, today()).unwrap_err(),
            BookingError::Invalid(_)
        ));
    }

    #[test]
    fn test_today_is_bookable() {
        let store = setup_store();
        assert!(submit_booking(&store, &request("2025-06-01", "18:00", 30), today()).is_ok());
    }

    #[test]
    fn test_submit_conflicts_only_with_approved() {
        let store = setup_store();
        let first = submit_booking(&store, &request("2025-06-16", "10:00", 60), today()).unwrap();

        // Pending bookings do not block the slot.
        assert!(submit_booking(&store, &request("2025-06-16", "10:30", 60), today()).is_ok());

        transition(&store, &first.id, BookingStatus::Approved).unwrap();
        let err = submit_booking(&store, &request("2025-06-16", "10:30", 60), today()).unwrap_err();
        assert!(matches!(err, BookingError::Conflict));

        // Adjacent slot is fine.
        assert!(submit_booking(&store, &request("2025-06-16", "11:00", 30), today()).is_ok());
        // Other days are fine.
        assert!(submit_booking(&store, &request("2025-06-17", "10:30", 60), today()).is_ok());
    }

    #[test]
    fn test_transition_rules() {
        let store = setup_store();
        let booking = submit_booking(&store, &request("2025-06-16", "10:00", 60), today()).unwrap();

        let err = transition(&store, &booking.id, BookingStatus::Pending).unwrap_err();
        assert!(matches!(err, BookingError::Invalid(_)));

        let err = transition(&store, "missing", BookingStatus::Approved).unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));

        let rejected = transition(&store, &booking.id, BookingStatus::Rejected).unwrap();
        assert_eq!(rejected.status, BookingStatus::Rejected);

        // An admin may reverse an earlier decision.
        let approved = transition(&store, &booking.id, BookingStatus::Approved).unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);
    }

    #[test]
    fn test_approving_overlapping_booking_conflicts() {
        let store = setup_store();
        let a = submit_booking(&store, &request("2025-06-16", "10:00", 60), today()).unwrap();
        let b = submit_booking(&store, &request("2025-06-16", "10:30", 60), today()).unwrap();

        transition(&store, &a.id, BookingStatus::Approved).unwrap();
        let err = transition(&store, &b.id, BookingStatus::Approved).unwrap_err();
        assert!(matches!(err, BookingError::Conflict));

        // Re-approving the same booking does not conflict with itself.
        assert!(transition(&store, &a.id, BookingStatus::Approved).is_ok());
        // Rejecting is always allowed.
        assert!(transition(&store, &b.id, BookingStatus::Rejected).is_ok());
    }

    #[test]
    fn test_submit_stores_canonical_date_and_time() {
        let store = setup_store();
        let booking = submit_booking(&store, &request("2025-6-16", "9:05", 30), today()).unwrap();
        assert_eq!(booking.date, "2025-06-16");
        assert_eq!(booking.time, "09:05");

        let padded_day = submit_booking(&store, &request("2025-06-5", "10:00", 30), today()).unwrap();
        assert_eq!(padded_day.date, "2025-06-05");

        // Both land in the June month query.
        assert_eq!(store.query_month(2025, 6).unwrap().len(), 2);
    }

    #[test]
    fn test_unpadded_date_conflicts_with_approved_slot() {
        let store = setup_store();
        let first = submit_booking(&store, &request("2025-06-16", "10:00", 60), today()).unwrap();
        transition(&store, &first.id, BookingStatus::Approved).unwrap();

        for date in ["2025-6-16", "2025-06-16", " 2025-6-16 "] {
            let err = submit_booking(&store, &request(date, "10:00", 60), today()).unwrap_err();
            assert!(matches!(err, BookingError::Conflict), "{date:?} gave {err:?}");
        }
    }

    #[test]
    fn test_concurrent_approvals_of_overlapping_slots() {
        let store = Arc::new(setup_store());
        let a = submit_booking(&*store, &request("2025-06-16", "10:00", 60), today()).unwrap();
        let b = submit_booking(&*store, &request("2025-06-16", "10:30", 60), today()).unwrap();

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [a.id.clone(), b.id.clone()]
            .into_iter()
            .map(|id| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    transition(&*store, &id, BookingStatus::Approved)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let approved = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(BookingError::Conflict)))
            .count();
        assert_eq!((approved, conflicts), (1, 1));

        let approved_in_store = store
            .query_by(&|b: &Booking| b.status == BookingStatus::Approved)
            .unwrap();
        assert_eq!(approved_in_store.len(), 1);
    }
}
