use crate::models::{ScheduleTemplate, TimeOfDay};

/// Parse a single clock time such as `7:30 AM`, `12:05pm` or `16:45`.
///
/// Hours take one or two digits and minutes exactly two. A trailing
/// `AM`/`PM` (any case, optional whitespace before it) selects the 12-hour
/// reading. Returns `None` for any other shape or out-of-range values.
pub fn parse_time_string(text: &str) -> Option<TimeOfDay> {
    let (hour_part, rest) = text.split_once(':')?;
    if hour_part.is_empty() || hour_part.len() > 2 || !is_ascii_digits(hour_part) {
        return None;
    }
    if rest.len() < 2 || !rest.is_char_boundary(2) {
        return None;
    }
    let (minute_part, suffix) = rest.split_at(2);
    if !is_ascii_digits(minute_part) {
        return None;
    }

    let hour: u32 = hour_part.parse().ok()?;
    let minute: u32 = minute_part.parse().ok()?;

    let suffix = suffix.trim_start();
    if suffix.is_empty() {
        return TimeOfDay::new(hour, minute);
    }

    let is_pm = if suffix.eq_ignore_ascii_case("pm") {
        true
    } else if suffix.eq_ignore_ascii_case("am") {
        false
    } else {
        return None;
    };

    if hour > 12 {
        return None;
    }
    let hour = match (is_pm, hour) {
        (true, 12) => 12,
        (true, h) => h + 12,
        (false, 12) => 0,
        (false, h) => h,
    };
    TimeOfDay::new(hour, minute)
}

/// Parse class hours of the form `<start>-<end>`, e.g. `7:30 AM - 4:30 PM`.
///
/// Segments are taken around the first two `-`-separated pieces and trimmed.
/// Returns `None` when either side fails to parse or the end is not later in
/// the day than the start.
pub fn parse_class_schedule(text: Option<&str>) -> Option<ScheduleTemplate> {
    let text = text?;
    let mut segments = text.split('-');
    let start_raw = segments.next()?;
    let end_raw = segments.next()?;

    let start = parse_time_string(start_raw.trim())?;
    let end = parse_time_string(end_raw.trim())?;
    ScheduleTemplate::new(start, end)
}

fn is_ascii_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tod(hour: u32, minute: u32) -> Option<TimeOfDay> {
        Some(TimeOfDay { hour, minute })
    }

    #[test]
    fn test_parse_twelve_hour() {
        assert_eq!(parse_time_string("7:30 AM"), tod(7, 30));
        assert_eq!(parse_time_string("7:30 pm"), tod(19, 30));
        assert_eq!(parse_time_string("12:00 PM"), tod(12, 0));
        assert_eq!(parse_time_string("12:15 am"), tod(0, 15));
        assert_eq!(parse_time_string("04:05PM"), tod(16, 5));
    }

    #[test]
    fn test_parse_twenty_four_hour() {
        assert_eq!(parse_time_string("0:00"), tod(0, 0));
        assert_eq!(parse_time_string("16:45"), tod(16, 45));
        assert_eq!(parse_time_string("23:59"), tod(23, 59));
        assert_eq!(parse_time_string("24:00"), None);
        assert_eq!(parse_time_string("12:60"), None);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert_eq!(parse_time_string(""), None);
        assert_eq!(parse_time_string("7"), None);
        assert_eq!(parse_time_string("7:3"), None);
        assert_eq!(parse_time_string("123:00"), None);
        assert_eq!(parse_time_string("7:30 XM"), None);
        assert_eq!(parse_time_string("7:30 AM extra"), None);
        assert_eq!(parse_time_string("13:00 PM"), None);
        assert_eq!(parse_time_string("7:30é"), None);
    }

    #[test]
    fn test_parse_class_schedule() {
        let template = parse_class_schedule(Some("7:30 AM - 4:30 PM")).unwrap();
        assert_eq!(template.start_minutes(), 450);
        assert_eq!(template.end_minutes(), 990);

        let template = parse_class_schedule(Some("09:00-12:00")).unwrap();
        assert_eq!((template.start_hour, template.end_hour), (9, 12));
    }

    #[test]
    fn test_parse_class_schedule_rejects_inverted_or_missing() {
        assert_eq!(parse_class_schedule(Some("4:30 PM-7:30 AM")), None);
        assert_eq!(parse_class_schedule(Some("9:00-9:00")), None);
        assert_eq!(parse_class_schedule(Some("7:30 AM to 4:30 PM")), None);
        assert_eq!(parse_class_schedule(Some("7:30 AM-")), None);
        assert_eq!(parse_class_schedule(Some("")), None);
        assert_eq!(parse_class_schedule(None), None);
    }

    #[test]
    fn test_parse_class_schedule_uses_first_two_segments() {
        let template = parse_class_schedule(Some("8:00-10:00-13:00")).unwrap();
        assert_eq!((template.start_hour, template.end_hour), (8, 10));
    }

    #[test]
    fn test_parse_class_schedule_is_repeatable() {
        let first = parse_class_schedule(Some("6:45 AM-1:15 PM"));
        let second = parse_class_schedule(Some("6:45 AM-1:15 PM"));
        assert_eq!(first, second);
        assert_eq!(first.map(|t| (t.start_minutes(), t.end_minutes())), Some((405, 795)));
    }
}
