use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

use crate::models::MonthDay;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English name for a 1-based month number
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// "March 2025"
pub fn month_label(month: u32, year: i32) -> String {
    match month_name(month) {
        Some(name) => format!("{} {}", name, year),
        None => String::new(),
    }
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All weekdays of the month, ascending. Saturdays and Sundays never appear.
pub fn month_days(year: i32, month: u32) -> Vec<MonthDay> {
    let Some(count) = days_in_month(year, month) else {
        return Vec::new();
    };

    (1..=count)
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|date| !is_weekend(*date))
        .map(|date| MonthDay {
            day: date.day(),
            date,
            weekday: date.format("%a").to_string(),
        })
        .collect()
}

/// Resolve a wall-clock time in the school's time zone to a UTC instant.
/// Ambiguous times (DST fall-back) take the earlier instant; skipped times
/// (DST spring-forward) yield `None`.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Local midnight through 23:59:59.999 for a date, as UTC instants.
/// Where midnight is skipped by a DST change the day starts at 01:00.
pub fn day_bounds<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_instant(tz, date.and_hms_opt(0, 0, 0)?)
        .or_else(|| local_instant(tz, date.and_hms_opt(1, 0, 0)?))?;
    let end = local_instant(tz, date.and_hms_milli_opt(23, 59, 59, 999)?)?;
    Some((start, end))
}

/// Fetch range covering every day of the month in the school's time zone.
pub fn month_bounds<Tz: TimeZone>(
    tz: &Tz,
    year: i32,
    month: u32,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first + Duration::days(i64::from(days_in_month(year, month)?) - 1);
    let (start, _) = day_bounds(tz, first)?;
    let (_, end) = day_bounds(tz, last)?;
    Some((start, end))
}
