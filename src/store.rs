//! The booking collection the rest of the service talks to.
//!
//! `BookingStore` is the seam for whatever hosts the documents. The bundled
//! implementation keeps them in SQLite; every backend failure surfaces as
//! [`StoreError::Unavailable`].

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDateTime, SubsecRound, Utc};
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::models::{overlaps, Booking, BookingStatus, NewBooking};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Unavailable(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Outcome of [`BookingStore::append_if_free`].
#[derive(Debug, Clone, PartialEq)]
pub enum Appended {
    Stored(Booking),
    /// The slot overlaps this approved booking; nothing was written.
    Conflict(Booking),
}

/// Outcome of [`BookingStore::approve_if_free`].
#[derive(Debug, Clone, PartialEq)]
pub enum Approval {
    Approved(Booking),
    /// The slot overlaps this approved booking; nothing was written.
    Conflict(Booking),
    NotFound,
}

pub trait BookingStore: Send + Sync {
    /// Persists a new pending booking and returns it with its assigned id.
    fn append(&self, new: &NewBooking) -> Result<Booking, StoreError>;

    /// Like `append`, but writes nothing if the slot overlaps an approved
    /// booking. Check and insert happen as one unit.
    fn append_if_free(&self, new: &NewBooking) -> Result<Appended, StoreError>;

    /// Current snapshot, newest `created_at` first.
    fn query_all(&self) -> Result<Vec<Booking>, StoreError>;

    /// Newest first, optionally one status only, at most `limit` rows.
    fn query_recent(
        &self,
        status: Option<BookingStatus>,
        limit: usize,
    ) -> Result<Vec<Booking>, StoreError>;

    fn query_residence(&self, unit: &str, apartment: &str) -> Result<Vec<Booking>, StoreError>;

    fn query_month(&self, year: i32, month: u32) -> Result<Vec<Booking>, StoreError>;

    fn get(&self, id: &str) -> Result<Option<Booking>, StoreError>;

    /// Last write wins; returns `false` when `id` does not exist.
    fn update_status(&self, id: &str, status: BookingStatus) -> Result<bool, StoreError>;

    /// Approves `id` unless its slot overlaps another approved booking on the
    /// same date. Check and update happen as one unit.
    fn approve_if_free(&self, id: &str) -> Result<Approval, StoreError>;

    fn query_by(
        &self,
        predicate: &dyn Fn(&Booking) -> bool,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|b| predicate(b))
            .collect())
    }
}

/// First approved booking on `date` whose slot overlaps `candidate`.
/// Records whose fields do not parse never block anything.
fn find_clash(
    conn: &Connection,
    date: &str,
    candidate: Option<(NaiveDateTime, NaiveDateTime)>,
    exclude_id: Option<&str>,
) -> Result<Option<Booking>, StoreError> {
    let Some(candidate) = candidate else {
        return Ok(None);
    };
    let approved = queries::get_approved_on_date(conn, date, exclude_id)?;
    Ok(approved
        .into_iter()
        .find(|existing| existing.slot().is_some_and(|s| overlaps(candidate, s))))
}

pub struct SqliteBookingStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteBookingStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.db
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }

    fn new_record(new: &NewBooking) -> Booking {
        // Second precision, matching what the table stores.
        let now = Utc::now().naive_utc().trunc_subsecs(0);
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            unit: new.unit.clone(),
            apartment: new.apartment.clone(),
            date: new.date.clone(),
            time: new.time.clone(),
            duration: new.duration,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

impl BookingStore for SqliteBookingStore {
    fn append(&self, new: &NewBooking) -> Result<Booking, StoreError> {
        let booking = Self::new_record(new);

        let db = self.conn()?;
        queries::create_booking(&db, &booking)?;
        tracing::debug!(booking_id = %booking.id, date = %booking.date, "booking stored");
        Ok(booking)
    }

    fn append_if_free(&self, new: &NewBooking) -> Result<Appended, StoreError> {
        let mut db = self.conn()?;
        let tx = db.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(existing) = find_clash(&tx, &new.date, new.slot(), None)? {
            return Ok(Appended::Conflict(existing));
        }

        let booking = Self::new_record(new);
        queries::create_booking(&tx, &booking)?;
        tx.commit()?;
        tracing::debug!(booking_id = %booking.id, date = %booking.date, "booking stored");
        Ok(Appended::Stored(booking))
    }

    fn query_all(&self) -> Result<Vec<Booking>, StoreError> {
        let db = self.conn()?;
        Ok(queries::get_all_bookings(&db, None, i64::MAX)?)
    }

    fn query_recent(
        &self,
        status: Option<BookingStatus>,
        limit: usize,
    ) -> Result<Vec<Booking>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let db = self.conn()?;
        Ok(queries::get_all_bookings(&db, status, limit)?)
    }

    fn query_residence(&self, unit: &str, apartment: &str) -> Result<Vec<Booking>, StoreError> {
        let db = self.conn()?;
        Ok(queries::get_bookings_for_residence(&db, unit, apartment)?)
    }

    fn query_month(&self, year: i32, month: u32) -> Result<Vec<Booking>, StoreError> {
        let db = self.conn()?;
        Ok(queries::get_bookings_for_month(&db, year, month)?)
    }

    fn get(&self, id: &str) -> Result<Option<Booking>, StoreError> {
        let db = self.conn()?;
        Ok(queries::get_booking_by_id(&db, id)?)
    }

    fn update_status(&self, id: &str, status: BookingStatus) -> Result<bool, StoreError> {
        let db = self.conn()?;
        Ok(queries::update_booking_status(&db, id, status)?)
    }

    fn approve_if_free(&self, id: &str) -> Result<Approval, StoreError> {
        let mut db = self.conn()?;
        let tx = db.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(booking) = queries::get_booking_by_id(&tx, id)? else {
            return Ok(Approval::NotFound);
        };
        if let Some(existing) = find_clash(&tx, &booking.date, booking.slot(), Some(id))? {
            return Ok(Approval::Conflict(existing));
        }

        queries::update_booking_status(&tx, id, BookingStatus::Approved)?;
        let approved = queries::get_booking_by_id(&tx, id)?;
        tx.commit()?;

        Ok(approved.map_or(Approval::NotFound, Approval::Approved))
    }
}
