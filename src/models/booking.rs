use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Parses a date only if it is already in canonical `YYYY-MM-DD` form.
/// chrono also accepts unpadded fields such as `2025-6-5`; those are refused
/// here because dates are matched as strings in storage.
pub fn parse_canonical_date(s: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == s).then_some(date)
}

/// Start and end of a lift slot, if the stored fields parse.
pub fn slot(date: &str, time: &str, duration: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let date = parse_canonical_date(date)?;
    let time = NaiveTime::parse_from_str(time, TIME_FORMAT).ok()?;
    let start = date.and_time(time);
    Some((start, start + Duration::minutes(duration as i64)))
}

/// Half-open intervals: a slot ending at 11:00 does not clash with one
/// starting at 11:00.
pub fn overlaps(a: (NaiveDateTime, NaiveDateTime), b: (NaiveDateTime, NaiveDateTime)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// A stored lift booking. `date` and `time` are kept as the strings the
/// store holds; consumers parse them and decide what to do with bad records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub unit: String,
    pub apartment: String,
    pub date: String,
    pub time: String,
    pub duration: i32,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Resident submission, before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub unit: String,
    pub apartment: String,
    pub date: String,
    pub time: String,
    pub duration: i32,
}

impl Booking {
    pub fn slot(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        slot(&self.date, &self.time, self.duration)
    }
}

impl NewBooking {
    pub fn slot(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        slot(&self.date, &self.time, self.duration)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    /// Lenient parse for values read back from storage: anything unknown
    /// renders as pending.
    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => BookingStatus::Approved,
            "rejected" => BookingStatus::Rejected,
            _ => BookingStatus::Pending,
        }
    }

    /// Strict parse for request input.
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "approved" => Some(BookingStatus::Approved),
            "rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_reads_as_pending() {
        assert_eq!(BookingStatus::parse("approved"), BookingStatus::Approved);
        assert_eq!(BookingStatus::parse("rejected"), BookingStatus::Rejected);
        assert_eq!(BookingStatus::parse("cancelled"), BookingStatus::Pending);
        assert_eq!(BookingStatus::parse(""), BookingStatus::Pending);
    }

    #[test]
    fn test_try_parse_is_strict() {
        assert_eq!(BookingStatus::try_parse("pending"), Some(BookingStatus::Pending));
        assert_eq!(BookingStatus::try_parse("Approved"), None);
        assert_eq!(BookingStatus::try_parse("cancelled"), None);
    }

    #[test]
    fn test_canonical_date_only() {
        assert!(parse_canonical_date("2025-06-05").is_some());
        assert!(parse_canonical_date("2025-6-05").is_none());
        assert!(parse_canonical_date("2025-06-5").is_none());
        assert!(parse_canonical_date("2025-6-5").is_none());
        assert!(parse_canonical_date("2025-06-05 ").is_none());
    }

    #[test]
    fn test_slot_overlap_is_half_open() {
        let ten = slot("2025-06-16", "10:00", 60).unwrap();
        let half_past = slot("2025-06-16", "10:30", 60).unwrap();
        let eleven = slot("2025-06-16", "11:00", 30).unwrap();

        assert!(overlaps(ten, half_past));
        assert!(!overlaps(ten, eleven));
        assert!(slot("2025-6-16", "10:00", 60).is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }
}
