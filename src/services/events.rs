use crate::models::{Booking, BookingEvent, BookingEventKind};
use crate::state::AppState;

/// Fans a booking change out to SSE subscribers. Having no subscribers is fine.
pub fn publish(state: &AppState, kind: BookingEventKind, booking: &Booking) {
    let event = BookingEvent {
        kind,
        booking_id: booking.id.clone(),
        date: booking.date.clone(),
        booking: booking.clone(),
    };

    match state.events_tx.send(event) {
        Ok(receivers) => {
            tracing::debug!(booking_id = %booking.id, receivers, "published booking event")
        }
        Err(_) => tracing::trace!(booking_id = %booking.id, "no event subscribers"),
    }
}
