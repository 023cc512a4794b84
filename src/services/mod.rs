pub mod booking;
pub mod calendar;
pub mod clock;
pub mod events;
pub mod ics;
