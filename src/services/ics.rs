use crate::models::Booking;

/// Renders a booking as a single-event iCalendar document. `None` when the
/// stored date or time does not parse, which includes unpadded dates.
pub fn generate_ics(booking: &Booking, building_name: &str) -> Option<String> {
    let (start, end) = booking.slot()?;

    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = end.format("%Y%m%dT%H%M%S").to_string();
    let dtstamp = booking.created_at.format("%Y%m%dT%H%M%S").to_string();
    let uid = format!("{}@liftdesk", booking.id);

    let summary = format!("Lift booking: {building_name}");
    let description = format!(
        "Unit {} apartment {} ({})",
        booking.unit, booking.apartment, booking.status
    );

    Some(format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Liftdesk//Lift Booking//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::NaiveDateTime;

    fn booking(date: &str, time: &str, duration: i32) -> Booking {
        let created_at =
            NaiveDateTime::parse_from_str("2025-03-10 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: "test-123".to_string(),
            unit: "B".to_string(),
            apartment: "402".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            duration,
            status: BookingStatus::Approved,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(&booking("2025-03-15", "14:00", 60), "Maple Court").unwrap();
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("DTSTART:20250315T140000"));
        assert!(ics.contains("DTEND:20250315T150000"));
        assert!(ics.contains("DTSTAMP:20250310T100000"));
        assert!(ics.contains("SUMMARY:Lift booking: Maple Court"));
        assert!(ics.contains("DESCRIPTION:Unit B apartment 402 (approved)"));
        assert!(ics.contains("UID:test-123@liftdesk"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_generate_ics_crosses_midnight() {
        let ics = generate_ics(&booking("2025-12-31", "23:30", 45), "Maple Court").unwrap();
        assert!(ics.contains("DTSTART:20251231T233000"));
        assert!(ics.contains("DTEND:20260101T001500"));
    }

    #[test]
    fn test_generate_ics_malformed_booking() {
        assert!(generate_ics(&booking("tomorrow", "14:00", 60), "Maple Court").is_none());
        assert!(generate_ics(&booking("2025-03-15", "2pm", 60), "Maple Court").is_none());
        assert!(generate_ics(&booking("2025-3-15", "14:00", 60), "Maple Court").is_none());
    }
}
