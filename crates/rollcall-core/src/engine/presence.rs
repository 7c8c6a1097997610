use chrono::{DateTime, Utc};

use crate::models::{ClassWindow, PresenceStatus, TimelineEntry};

/// Minutes a learner spent inside school during a class window.
///
/// Walks an ascending timeline as a two-state automaton seeded with
/// `initial_status`. Entries at or before the window start only set the
/// state in effect at the start. Entries strictly inside the window close
/// the running interval and switch state. The first entry at or after the
/// window end closes out the window and stops the scan, so later entries
/// are never read. Minutes accumulate fractionally and are rounded once.
pub fn calculate_minutes_inside(
    timeline: &[TimelineEntry],
    window: &ClassWindow,
    initial_status: PresenceStatus,
) -> u32 {
    if timeline.is_empty() {
        return if initial_status.is_inside() {
            round_minutes(window.duration_minutes())
        } else {
            0
        };
    }

    let mut current_status = initial_status;
    let mut last_timestamp = window.start;
    let mut minutes_inside = 0.0_f64;

    for entry in timeline {
        if entry.timestamp <= window.start {
            current_status = entry.status;
            last_timestamp = window.start;
            continue;
        }

        if entry.timestamp >= window.end {
            if current_status.is_inside() && last_timestamp < window.end {
                minutes_inside += elapsed_minutes(last_timestamp, window.end);
            }
            return round_minutes(minutes_inside);
        }

        if current_status.is_inside() {
            minutes_inside += elapsed_minutes(last_timestamp, entry.timestamp);
        }
        current_status = entry.status;
        last_timestamp = entry.timestamp;
    }

    if current_status.is_inside() && last_timestamp < window.end {
        minutes_inside += elapsed_minutes(last_timestamp, window.end);
    }
    round_minutes(minutes_inside)
}

fn elapsed_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

fn round_minutes(minutes: f64) -> u32 {
    minutes.round().max(0.0) as u32
}
