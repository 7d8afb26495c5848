//! Free-slot computation: merge a day's busy intervals against the
//! working window.

use chrono::Duration;

use super::types::{BusyInterval, FreeInterval, WorkingWindow};

/// Compute the free intervals of at least `min_duration_minutes` within
/// `window`, given the day's busy intervals.
///
/// Interval-merge sweep: busy intervals are sorted by start (callers may
/// pass them unsorted), a cursor advances with `max(cursor, busy.end)`,
/// and every gap meeting the minimum duration is emitted. Overlapping or
/// nested busy intervals collapse naturally under the max-advance; the
/// result is sorted and pairwise non-overlapping by construction.
pub fn find_free(
    window: &WorkingWindow,
    busy: &[BusyInterval],
    min_duration_minutes: i64,
) -> Vec<FreeInterval> {
    let min_duration = Duration::minutes(min_duration_minutes);

    let mut busy: Vec<BusyInterval> = busy.to_vec();
    busy.sort_by_key(|b| b.start);

    let mut free = Vec::new();
    let mut cursor = window.start;

    for interval in &busy {
        if cursor >= window.end {
            break;
        }
        let gap_end = interval.start.min(window.end);
        if cursor < gap_end && gap_end - cursor >= min_duration {
            free.push(FreeInterval::new(cursor, gap_end));
        }
        cursor = cursor.max(interval.end);
    }

    if cursor < window.end && window.end - cursor >= min_duration {
        free.push(FreeInterval::new(cursor, window.end));
    }

    free
}
