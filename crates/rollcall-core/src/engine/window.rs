use chrono::{Datelike, NaiveDate, TimeZone};

use super::calendar::local_instant;
use crate::models::{ClassWindow, ScheduleTemplate};

/// Project class hours onto a day of the anchor date's month.
///
/// Returns `None` when there is no template, the day does not exist in that
/// month, either instant cannot be resolved in `tz`, or the end is not after
/// the start. Weekend filtering is the caller's job.
pub fn build_class_window<Tz: TimeZone>(
    template: Option<&ScheduleTemplate>,
    anchor: NaiveDate,
    day: u32,
    tz: &Tz,
) -> Option<ClassWindow> {
    let template = template?;
    let date = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), day)?;

    let start = local_instant(tz, date.and_hms_opt(template.start_hour, template.start_minute, 0)?)?;
    let end = local_instant(tz, date.and_hms_opt(template.end_hour, template.end_minute, 0)?)?;

    if end <= start {
        return None;
    }
    Some(ClassWindow { start, end })
}
