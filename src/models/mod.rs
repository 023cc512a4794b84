pub mod booking;
pub mod calendar;
pub mod event;

pub use booking::{overlaps, parse_canonical_date, Booking, BookingStatus, NewBooking};
pub use calendar::{DayCell, GridCell, MonthGrid, StatusTone, VisibleBooking};
pub use event::{BookingEvent, BookingEventKind};
