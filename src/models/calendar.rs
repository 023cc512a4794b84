use chrono::NaiveDate;
use serde::Serialize;

use super::BookingStatus;

/// Visual class of a booking entry on the calendar.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Approved,
    Pending,
    Rejected,
}

impl From<BookingStatus> for StatusTone {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Approved => StatusTone::Approved,
            BookingStatus::Pending => StatusTone::Pending,
            BookingStatus::Rejected => StatusTone::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VisibleBooking {
    pub id: String,
    pub unit: String,
    pub apartment: String,
    pub time: String,
    pub duration: i32,
    pub status: BookingStatus,
    pub tone: StatusTone,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_past: bool,
    /// At most two entries, in input order.
    pub visible: Vec<VisibleBooking>,
    pub extra_count: usize,
}

impl DayCell {
    pub fn total(&self) -> usize {
        self.visible.len() + self.extra_count
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GridCell {
    /// Leading blank before day 1.
    Padding,
    Day(DayCell),
}

impl GridCell {
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            GridCell::Day(cell) => Some(cell),
            GridCell::Padding => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    /// 0 = Sunday.
    pub first_weekday: u32,
    pub days_in_month: u32,
    /// Navigation targets as `YYYY-MM`.
    pub previous: String,
    pub next: String,
    pub cells: Vec<GridCell>,
    /// Bookings dropped because their date did not parse.
    pub skipped: usize,
}

impl MonthGrid {
    /// Rows of seven cells; the last row may be short.
    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(7)
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.cells
            .iter()
            .filter_map(GridCell::as_day)
            .find(|cell| cell.day == day)
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(GridCell::as_day)
    }
}
