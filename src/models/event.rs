use serde::Serialize;

use super::{Booking, BookingStatus};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingEventKind {
    Submitted,
    Approved,
    Rejected,
}

/// The event a booking's current status announces. A booking that is still
/// pending was just submitted.
impl From<BookingStatus> for BookingEventKind {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => BookingEventKind::Submitted,
            BookingStatus::Approved => BookingEventKind::Approved,
            BookingStatus::Rejected => BookingEventKind::Rejected,
        }
    }
}

/// Pushed to SSE subscribers whenever a booking changes, so calendar pages
/// can re-fetch the month that contains `date`.
#[derive(Clone, Debug, Serialize)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub booking_id: String,
    pub date: String,
    pub booking: Booking,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_follows_status() {
        assert_eq!(
            BookingEventKind::from(BookingStatus::Approved),
            BookingEventKind::Approved
        );
        assert_eq!(
            BookingEventKind::from(BookingStatus::Rejected),
            BookingEventKind::Rejected
        );
        assert_eq!(
            BookingEventKind::from(BookingStatus::Pending),
            BookingEventKind::Submitted
        );
    }
}
