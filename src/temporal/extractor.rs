//! Extraction of a single temporal reference from free text.
//!
//! Supports absolute dates ("2024-01-15", "January 15"), relative dates
//! ("tomorrow", "next friday", "in 2 weeks"), clock times ("3pm", "15:30"),
//! named times ("noon", "afternoon"), and the Hindi-transliterated
//! relatives users mix in ("aaj", "kal", "parso"). Relative expressions
//! resolve against an injected reference date so extraction is
//! deterministic under test.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use regex::Regex;

// ============================================================================
// Temporal Reference
// ============================================================================

/// An absolute point in time extracted from a message: a date, optionally
/// with a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalReference {
    /// The referenced calendar date.
    pub date: NaiveDate,
    /// Time of day, if the message carried one.
    pub time: Option<NaiveTime>,
}

impl TemporalReference {
    /// Whether the message specified a time of day, not just a date.
    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    /// Resolve to a UTC instant in the given timezone. Date-only
    /// references resolve to local midnight.
    pub fn resolve(&self, tz: Tz) -> DateTime<Utc> {
        let naive = NaiveDateTime::new(self.date, self.time.unwrap_or(NaiveTime::MIN));
        match tz.from_local_datetime(&naive).earliest() {
            Some(dt) => dt.with_timezone(&Utc),
            // Local time falls in a DST gap; treat the wall clock as UTC.
            None => DateTime::from_naive_utc_and_offset(naive, Utc),
        }
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// Extracts at most one temporal reference from a message.
///
/// Pure and side-effect free: the same text and reference date always
/// produce the same result. Unparseable text yields `None`, never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalExtractor;

impl TemporalExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a temporal reference, resolving relative expressions
    /// against `reference`. A bare time ("at 3pm") implies the reference
    /// date itself.
    pub fn extract(&self, text: &str, reference: NaiveDate) -> Option<TemporalReference> {
        let text_lower = text.to_lowercase();

        let date = self.extract_date(&text_lower, reference);
        let time = self.extract_time(&text_lower);

        match (date, time) {
            (Some(date), time) => Some(TemporalReference { date, time }),
            (None, Some(time)) => Some(TemporalReference {
                date: reference,
                time: Some(time),
            }),
            (None, None) => None,
        }
    }

    // ========================================================================
    // Date extraction
    // ========================================================================

    fn extract_date(&self, text: &str, reference: NaiveDate) -> Option<NaiveDate> {
        // Explicit formats win over relative terms.
        if let Some(caps) = ISO_DATE.captures(text) {
            if let (Ok(year), Ok(month), Ok(day)) = (
                caps[1].parse::<i32>(),
                caps[2].parse::<u32>(),
                caps[3].parse::<u32>(),
            ) {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    return Some(date);
                }
            }
        }

        if let Some(caps) = MONTH_NAME_DATE.captures(text) {
            let month = month_number(&caps[1]);
            if let Ok(day) = caps[2].parse::<u32>() {
                let year = caps
                    .get(3)
                    .and_then(|m| m.as_str().parse::<i32>().ok())
                    .unwrap_or(reference.year());
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    return Some(date);
                }
            }
        }

        // Numeric m/d/y. Ambiguous between US and EU ordering; assume US
        // like the rest of the parser.
        if let Some(caps) = NUMERIC_DATE.captures(text) {
            if let (Ok(month), Ok(day), Ok(year)) = (
                caps[1].parse::<u32>(),
                caps[2].parse::<u32>(),
                caps[3].parse::<i32>(),
            ) {
                let year = if year < 100 { 2000 + year } else { year };
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    return Some(date);
                }
            }
        }

        // Relative terms; longer phrases checked before their substrings
        // ("day after tomorrow" before "tomorrow").
        if DAY_AFTER_TOMORROW.is_match(text) {
            return Some(reference + Duration::days(2));
        }
        if TOMORROW.is_match(text) {
            return Some(reference + Duration::days(1));
        }
        if TODAY.is_match(text) {
            return Some(reference);
        }

        if let Some(caps) = NEXT_WEEKDAY.captures(text) {
            let weekday = weekday_from_name(&caps[1]);
            return Some(next_weekday(reference, weekday, true));
        }
        if let Some(caps) = THIS_WEEKDAY.captures(text) {
            let weekday = weekday_from_name(&caps[1]);
            return Some(next_weekday(reference, weekday, false));
        }

        if let Some(caps) = IN_N_UNITS.captures(text) {
            if let Ok(n) = caps[1].parse::<i64>() {
                let date = match &caps[2] {
                    s if s.starts_with("day") => reference + Duration::days(n),
                    s if s.starts_with("week") => reference + Duration::weeks(n),
                    _ => return None,
                };
                return Some(date);
            }
        }

        if let Some(caps) = BARE_WEEKDAY.captures(text) {
            let full = caps.get(1)?;
            // Skip when qualified; the qualified patterns above already
            // handled those, and "every friday" is not a single date.
            let prefix_start = full.start().saturating_sub(8);
            let prefix = text.get(prefix_start..full.start()).unwrap_or("");
            if !(prefix.contains("next")
                || prefix.contains("this")
                || prefix.contains("last")
                || prefix.contains("every"))
            {
                let weekday = weekday_from_name(full.as_str());
                return Some(next_weekday(reference, weekday, false));
            }
        }

        None
    }

    // ========================================================================
    // Time extraction
    // ========================================================================

    fn extract_time(&self, text: &str) -> Option<NaiveTime> {
        // 12-hour clock: "3pm", "3:30 pm"
        if let Some(caps) = TIME_12H.captures(text) {
            if let Ok(mut hour) = caps[1].parse::<u32>() {
                let minute = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse::<u32>().ok())
                    .unwrap_or(0);
                let period = &caps[3];
                if period.starts_with('p') && hour != 12 {
                    hour += 12;
                } else if period.starts_with('a') && hour == 12 {
                    hour = 0;
                }
                if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                    return Some(time);
                }
            }
        }

        // 24-hour clock: "15:30"
        if let Some(caps) = TIME_24H.captures(text) {
            if let (Ok(hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
                if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                    return Some(time);
                }
            }
        }

        // Named times of day.
        if let Some(caps) = NAMED_TIME.captures(text) {
            let (hour, minute) = match &caps[1] {
                "noon" | "midday" => (12, 0),
                "midnight" => (0, 0),
                "morning" | "subah" => (9, 0),
                "afternoon" | "dopahar" => (14, 0),
                "evening" | "shaam" => (18, 0),
                "night" | "raat" => (21, 0),
                _ => return None,
            };
            return NaiveTime::from_hms_opt(hour, minute, 0);
        }

        None
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn month_number(name: &str) -> u32 {
    match &name[..3] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        _ => 12,
    }
}

fn weekday_from_name(name: &str) -> Weekday {
    match &name[..3] {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// Next occurrence of `target` on or after `reference`. With
/// `skip_this_week`, the same or a nearer day rolls a full week forward.
fn next_weekday(reference: NaiveDate, target: Weekday, skip_this_week: bool) -> NaiveDate {
    let current = reference.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();

    let mut days_ahead = if wanted > current {
        (wanted - current) as i64
    } else if wanted < current {
        (7 - current + wanted) as i64
    } else if skip_this_week {
        7
    } else {
        0
    };

    if skip_this_week && days_ahead < 7 {
        days_ahead += 7;
    }

    reference + Duration::days(days_ahead)
}

// ============================================================================
// Patterns
// ============================================================================

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("Invalid regex"));
static MONTH_NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s*(\d{4}))?\b",
    )
    .expect("Invalid regex")
});
static NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2,4})\b").expect("Invalid regex"));

static DAY_AFTER_TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(day\s+after\s+tomorrow|parso)\b").expect("Invalid regex"));
static TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(tomorrow|kal)\b").expect("Invalid regex"));
static TODAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(today|aaj)\b").expect("Invalid regex"));

static NEXT_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bnext\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("Invalid regex")
});
static THIS_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bthis\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("Invalid regex")
});
static BARE_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("Invalid regex")
});
static IN_N_UNITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bin\s+(\d+)\s+(days?|weeks?)\b").expect("Invalid regex"));

static TIME_12H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\b").expect("Invalid regex")
});
static TIME_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("Invalid regex"));
static NAMED_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(noon|midday|midnight|morning|afternoon|evening|night|subah|dopahar|shaam|raat)\b")
        .expect("Invalid regex")
});

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_no_temporal_reference() {
        let extractor = TemporalExtractor::new();
        assert!(extractor.extract("hello there", reference()).is_none());
        assert!(extractor.extract("who are you?", reference()).is_none());
    }

    #[test]
    fn test_tomorrow() {
        let extractor = TemporalExtractor::new();
        let t = extractor.extract("let's meet tomorrow", reference()).unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert!(!t.has_time());
    }

    #[test]
    fn test_hindi_relatives() {
        let extractor = TemporalExtractor::new();
        let t = extractor.extract("kal ki meeting", reference()).unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());

        let t = extractor.extract("aaj milna hai", reference()).unwrap();
        assert_eq!(t.date, reference());

        let t = extractor.extract("parso ka plan", reference()).unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
    }

    #[test]
    fn test_day_after_tomorrow_beats_tomorrow() {
        let extractor = TemporalExtractor::new();
        let t = extractor
            .extract("book it for day after tomorrow", reference())
            .unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
    }

    #[test]
    fn test_next_friday_at_3pm() {
        let extractor = TemporalExtractor::new();
        let t = extractor
            .extract("next Friday 3pm works for me", reference())
            .unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 19).unwrap());
        assert_eq!(t.time, NaiveTime::from_hms_opt(15, 0, 0));
    }

    #[test]
    fn test_bare_weekday_is_upcoming() {
        let extractor = TemporalExtractor::new();
        // Reference is Wednesday; "friday" means this Friday.
        let t = extractor.extract("meeting on friday", reference()).unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
    }

    #[test]
    fn test_iso_date_with_24h_time() {
        let extractor = TemporalExtractor::new();
        let t = extractor
            .extract("schedule for 2024-03-05 at 14:30", reference())
            .unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(t.time, NaiveTime::from_hms_opt(14, 30, 0));
    }

    #[test]
    fn test_month_name_without_year() {
        let extractor = TemporalExtractor::new();
        let t = extractor
            .extract("appointment on March 5th", reference())
            .unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_bare_time_implies_reference_date() {
        let extractor = TemporalExtractor::new();
        let t = extractor.extract("call me at 3:30 pm", reference()).unwrap();
        assert_eq!(t.date, reference());
        assert_eq!(t.time, NaiveTime::from_hms_opt(15, 30, 0));
    }

    #[test]
    fn test_tomorrow_afternoon() {
        let extractor = TemporalExtractor::new();
        let t = extractor
            .extract("tomorrow afternoon?", reference())
            .unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(t.time, NaiveTime::from_hms_opt(14, 0, 0));
    }

    #[test]
    fn test_in_n_weeks() {
        let extractor = TemporalExtractor::new();
        let t = extractor.extract("follow up in 2 weeks", reference()).unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 24).unwrap());
    }

    #[test]
    fn test_noon_and_midnight() {
        let extractor = TemporalExtractor::new();
        let t = extractor.extract("lunch at noon tomorrow", reference()).unwrap();
        assert_eq!(t.time, NaiveTime::from_hms_opt(12, 0, 0));
    }

    #[test]
    fn test_12h_boundaries() {
        let extractor = TemporalExtractor::new();
        let t = extractor.extract("12pm today", reference()).unwrap();
        assert_eq!(t.time, NaiveTime::from_hms_opt(12, 0, 0));
        let t = extractor.extract("12am today", reference()).unwrap();
        assert_eq!(t.time, NaiveTime::from_hms_opt(0, 0, 0));
    }

    #[test]
    fn test_deterministic() {
        let extractor = TemporalExtractor::new();
        let a = extractor.extract("next monday at 9am", reference());
        let b = extractor.extract("next monday at 9am", reference());
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_in_timezone() {
        let t = TemporalReference {
            date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            time: NaiveTime::from_hms_opt(15, 0, 0),
        };
        // 15:00 IST is 09:30 UTC.
        let utc = t.resolve(chrono_tz::Asia::Kolkata);
        assert_eq!(
            utc,
            Utc.with_ymd_and_hms(2024, 1, 11, 9, 30, 0).unwrap()
        );
    }
}
