//! Month grid for the lift-booking calendar.
//!
//! [`build_month_grid`] is pure: callers pass the bookings and "today" in, and
//! get back one padding cell per weekday before day 1 followed by one cell per
//! day of the month. Rendering and data fetching live elsewhere.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};

use crate::models::{
    parse_canonical_date, Booking, DayCell, GridCell, MonthGrid, StatusTone, VisibleBooking,
};

/// Entries shown per day before the rest collapse into `extra_count`.
pub const MAX_VISIBLE_PER_DAY: usize = 2;

#[derive(Debug, thiserror::Error)]
#[error("booking {booking_id} has an unparseable date {date:?}")]
pub struct MalformedBookingError {
    pub booking_id: String,
    pub date: String,
}

/// The stored value must be exactly `YYYY-MM-DD`, zero-padded, with no time
/// or offset suffix.
pub fn booking_date(booking: &Booking) -> Result<NaiveDate, MalformedBookingError> {
    parse_canonical_date(&booking.date).ok_or_else(|| MalformedBookingError {
        booking_id: booking.id.clone(),
        date: booking.date.clone(),
    })
}

pub fn build_month_grid(reference: NaiveDate, today: NaiveDate, bookings: &[Booking]) -> MonthGrid {
    let year = reference.year();
    let month = reference.month();
    let days_in_month = days_in_month(year, month);
    let first_weekday = first_weekday(year, month);

    let (by_day, skipped) = group_bookings_by_day(year, month, bookings);

    let mut cells = Vec::with_capacity((first_weekday + days_in_month) as usize);
    cells.extend((0..first_weekday).map(|_| GridCell::Padding));

    for day in 1..=days_in_month {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let day_bookings = by_day.get(&day).map(Vec::as_slice).unwrap_or_default();

        let visible = day_bookings
            .iter()
            .take(MAX_VISIBLE_PER_DAY)
            .map(|b| visible_booking(b))
            .collect();

        cells.push(GridCell::Day(DayCell {
            day,
            date,
            is_today: date == today,
            is_past: date < today,
            visible,
            extra_count: day_bookings.len().saturating_sub(MAX_VISIBLE_PER_DAY),
        }));
    }

    tracing::debug!(
        year,
        month,
        cells = cells.len(),
        skipped,
        "built month grid"
    );

    MonthGrid {
        year,
        month,
        month_name: month_name(month),
        first_weekday,
        days_in_month,
        previous: previous_month(reference).format("%Y-%m").to_string(),
        next: next_month(reference).format("%Y-%m").to_string(),
        cells,
        skipped,
    }
}

/// Buckets bookings of the given month by day number, keeping input order
/// within a day. Returns the buckets and the number of malformed entries.
fn group_bookings_by_day<'a>(
    year: i32,
    month: u32,
    bookings: &'a [Booking],
) -> (HashMap<u32, Vec<&'a Booking>>, usize) {
    let mut by_day: HashMap<u32, Vec<&Booking>> = HashMap::new();
    let mut skipped = 0;

    for booking in bookings {
        match booking_date(booking) {
            Ok(date) if date.year() == year && date.month() == month => {
                by_day.entry(date.day()).or_default().push(booking);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(booking_id = %e.booking_id, error = %e, "skipping booking");
                skipped += 1;
            }
        }
    }

    (by_day, skipped)
}

fn visible_booking(booking: &Booking) -> VisibleBooking {
    VisibleBooking {
        id: booking.id.clone(),
        unit: booking.unit.clone(),
        apartment: booking.apartment.clone(),
        time: booking.time.clone(),
        duration: booking.duration,
        status: booking.status,
        tone: StatusTone::from(booking.status),
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Weekday of the 1st, 0 = Sunday.
pub fn first_weekday(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Invalid Month",
    }
}

/// First day of the month before `reference`.
pub fn previous_month(reference: NaiveDate) -> NaiveDate {
    let first = reference.with_day(1).unwrap_or(reference);
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

/// First day of the month after `reference`.
pub fn next_month(reference: NaiveDate) -> NaiveDate {
    let first = reference.with_day(1).unwrap_or(reference);
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}

/// Parses a `YYYY-MM` month selector into the first day of that month.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()
}
