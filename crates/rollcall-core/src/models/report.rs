use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Classification of one learner on one school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum DailyStatus {
    #[serde(rename = "present")]
    Present,
    #[serde(rename = "absent")]
    Absent,
    #[serde(rename = "tardy")]
    Tardy,
    #[serde(rename = "Excused", alias = "excused")]
    Excused,
}

impl DailyStatus {
    /// Mark written in the SF2 day column.
    pub fn code(&self) -> &'static str {
        match self {
            DailyStatus::Present => "",
            DailyStatus::Absent => "X",
            DailyStatus::Tardy => "T",
            DailyStatus::Excused => "E",
        }
    }
}

impl std::fmt::Display for DailyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DailyStatus::Present => write!(f, "Present"),
            DailyStatus::Absent => write!(f, "Absent"),
            DailyStatus::Tardy => write!(f, "Tardy"),
            DailyStatus::Excused => write!(f, "Excused"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DailyRecord {
    pub status: DailyStatus,
    pub code: String,
    pub minutes: u32,
    pub remarks: String,
}

impl DailyRecord {
    pub fn new(status: DailyStatus, minutes: u32, remarks: String) -> Self {
        Self {
            status,
            code: status.code().to_string(),
            minutes,
            remarks,
        }
    }
}

/// Counts of each daily status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StatusTotals {
    pub present: u32,
    pub absent: u32,
    pub excused: u32,
    pub tardy: u32,
}

impl StatusTotals {
    pub fn record(&mut self, status: DailyStatus) {
        match status {
            DailyStatus::Present => self.present += 1,
            DailyStatus::Absent => self.absent += 1,
            DailyStatus::Excused => self.excused += 1,
            DailyStatus::Tardy => self.tardy += 1,
        }
    }

    pub fn merge(&mut self, other: &StatusTotals) {
        self.present += other.present;
        self.absent += other.absent;
        self.excused += other.excused;
        self.tardy += other.tardy;
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.excused + self.tardy
    }
}

impl FromIterator<DailyStatus> for StatusTotals {
    fn from_iter<I: IntoIterator<Item = DailyStatus>>(iter: I) -> Self {
        let mut totals = StatusTotals::default();
        for status in iter {
            totals.record(status);
        }
        totals
    }
}

/// A school day (weekday) of the report month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MonthDay {
    pub day: u32,
    pub date: NaiveDate,
    pub weekday: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StudentReport {
    pub id: String,
    pub name: String,
    /// One record per school day, index-aligned with `MonthReport::month_days`
    pub daily: Vec<DailyRecord>,
    pub totals: StatusTotals,
    pub remarks: String,
    pub has_schedule: bool,
}

/// A learner left out of the report, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SkippedStudent {
    pub id: String,
    pub reason: String,
}

impl SkippedStudent {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReportAggregates {
    pub total_learners: u32,
    pub totals: StatusTotals,
    /// Present learner-days over (school days x learners), as a percentage
    pub attendance_rate: f64,
}

/// Computed attendance for one month. Rebuilt from source events per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MonthReport {
    pub month_days: Vec<MonthDay>,
    pub students: Vec<StudentReport>,
    pub column_totals: Vec<StatusTotals>,
    pub aggregates: ReportAggregates,
    pub skipped: Vec<SkippedStudent>,
}

/// Form header fields printed above the attendance grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReportHeader {
    pub teacher_id: String,
    pub report_date: NaiveDate,
    pub school_year: String,
    pub grade_level: String,
    pub section: String,
    pub month: u32,
    pub month_label: String,
    pub school_name: String,
    pub no_of_class_days: u32,
    pub anchor_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AttendanceReport {
    #[serde(flatten)]
    pub header: ReportHeader,
    #[serde(flatten)]
    pub month: MonthReport,
}
