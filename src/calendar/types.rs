//! Core calendar data types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

// ============================================================================
// Events
// ============================================================================

/// One event as reported by the external calendar.
///
/// All-day events carry no start/end instants; the orchestrator excludes
/// them before any busy-interval computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title.
    pub summary: String,
    /// Start instant; absent for all-day events.
    pub start: Option<DateTime<Utc>>,
    /// End instant; absent for all-day events.
    pub end: Option<DateTime<Utc>>,
    /// Whether this is an all-day event.
    #[serde(default)]
    pub is_all_day: bool,
}

impl CalendarEvent {
    /// Create a timed event.
    pub fn timed(summary: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            summary: summary.into(),
            start: Some(start),
            end: Some(end),
            is_all_day: false,
        }
    }

    /// Create an all-day event.
    pub fn all_day(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            start: None,
            end: None,
            is_all_day: true,
        }
    }

    /// The occupied interval, if this event occupies clock time.
    pub fn busy_interval(&self) -> Option<BusyInterval> {
        if self.is_all_day {
            return None;
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) if start < end => Some(BusyInterval::new(start, end)),
            _ => None,
        }
    }
}

/// An event creation request handed to the external calendar.
#[derive(Debug, Clone, Serialize)]
pub struct BookingRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    /// Timezone the event should be rendered in by the backend.
    pub timezone: Tz,
}

/// Acknowledgement returned by the external calendar for a booking.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub summary: String,
}

// ============================================================================
// Intervals
// ============================================================================

/// A time range occupied by an existing calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether this interval overlaps `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

/// A free time range within working hours, at least the configured
/// minimum duration long. Produced only by the slot finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Duration in minutes.
    pub duration_minutes: i64,
}

impl FreeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let duration = end - start;
        Self {
            start,
            end,
            duration_minutes: duration.num_minutes(),
        }
    }
}

// ============================================================================
// Working hours
// ============================================================================

/// The configured daily working-hours policy.
#[derive(Debug, Clone, Copy)]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub timezone: Tz,
}

impl WorkingHours {
    /// Build from whole hours. Callers validate `start_hour < end_hour`
    /// at configuration time; out-of-range hours clamp to midnight.
    pub fn from_hours(start_hour: u32, end_hour: u32, timezone: Tz) -> Self {
        let start = NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        // 24 means end of day.
        let end = if end_hour >= 24 {
            NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
        } else {
            NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap_or(NaiveTime::MIN)
        };
        Self {
            start,
            end,
            timezone,
        }
    }

    /// The concrete working window for one calendar day.
    pub fn window_for(&self, day: NaiveDate) -> WorkingWindow {
        WorkingWindow {
            start: local_to_utc(day, self.start, self.timezone),
            end: local_to_utc(day, self.end, self.timezone),
        }
    }

    /// The full-day bounds `[00:00, 24:00)` for one calendar day, used
    /// when listing events.
    pub fn day_bounds(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = local_to_utc(day, NaiveTime::MIN, self.timezone);
        let end = local_to_utc(day + chrono::Duration::days(1), NaiveTime::MIN, self.timezone);
        (start, end)
    }
}

/// One day's working window as UTC instants, with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn local_to_utc(day: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = NaiveDateTime::new(day, time);
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // DST gap; treat the wall clock as UTC.
        None => DateTime::from_naive_utc_and_offset(naive, Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_window_in_configured_timezone() {
        let hours = WorkingHours::from_hours(9, 17, chrono_tz::Asia::Kolkata);
        let window = hours.window_for(day());
        // 09:00 IST == 03:30 UTC.
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 10, 3, 30, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 10, 11, 30, 0).unwrap());
    }

    #[test]
    fn test_day_bounds_cover_24_hours() {
        let hours = WorkingHours::from_hours(9, 17, chrono_tz::UTC);
        let (start, end) = hours.day_bounds(day());
        assert_eq!(end - start, chrono::Duration::days(1));
    }

    #[test]
    fn test_all_day_event_has_no_busy_interval() {
        let event = CalendarEvent::all_day("Holiday");
        assert!(event.busy_interval().is_none());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 10, 11, 0, 0).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let busy = BusyInterval::new(a, b);
        // Touching at the boundary is not an overlap.
        assert!(!busy.overlaps(b, c));
        assert!(busy.overlaps(a, c));
    }
}
