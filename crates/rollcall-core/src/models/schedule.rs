use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A wall-clock time of day in 24-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Build a time of day, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }

    pub fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

/// Canonical daily class hours for a learner.
///
/// The end of the window is always strictly later in the day than the start;
/// overnight and zero-length windows cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTemplate {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl ScheduleTemplate {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Option<Self> {
        if end.minutes_of_day() <= start.minutes_of_day() {
            return None;
        }
        Some(Self {
            start_hour: start.hour,
            start_minute: start.minute,
            end_hour: end.hour,
            end_minute: end.minute,
        })
    }

    pub fn start(&self) -> TimeOfDay {
        TimeOfDay {
            hour: self.start_hour,
            minute: self.start_minute,
        }
    }

    pub fn end(&self) -> TimeOfDay {
        TimeOfDay {
            hour: self.end_hour,
            minute: self.end_minute,
        }
    }

    pub fn start_minutes(&self) -> u32 {
        self.start().minutes_of_day()
    }

    pub fn end_minutes(&self) -> u32 {
        self.end().minutes_of_day()
    }

    /// Scheduled length of the class day in minutes
    pub fn duration_minutes(&self) -> u32 {
        self.end_minutes() - self.start_minutes()
    }
}

/// Concrete class window for a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ClassWindow {
    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 60_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_bounds() {
        assert!(TimeOfDay::new(23, 59).is_some());
        assert!(TimeOfDay::new(24, 0).is_none());
        assert!(TimeOfDay::new(7, 60).is_none());
        assert_eq!(TimeOfDay::new(7, 30).map(|t| t.minutes_of_day()), Some(450));
    }

    #[test]
    fn test_template_rejects_inverted_window() {
        let start = TimeOfDay::new(16, 30).unwrap();
        let end = TimeOfDay::new(7, 30).unwrap();
        assert!(ScheduleTemplate::new(start, end).is_none());
        assert!(ScheduleTemplate::new(start, start).is_none());
    }

    #[test]
    fn test_template_minutes() {
        let template =
            ScheduleTemplate::new(TimeOfDay::new(7, 30).unwrap(), TimeOfDay::new(16, 30).unwrap())
                .unwrap();
        assert_eq!(template.start_minutes(), 450);
        assert_eq!(template.end_minutes(), 990);
        assert_eq!(template.duration_minutes(), 540);
    }
}
