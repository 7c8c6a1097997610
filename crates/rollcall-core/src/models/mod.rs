//! Data models for attendance reconciliation.
//!
//! This module contains the data structures shared by the engine, the
//! event store and the report layer:
//!
//! - `ScheduleTemplate`, `TimeOfDay`, `ClassWindow`: class hours and their
//!   projection onto a calendar date
//! - `TimelineEntry`, `PresenceStatus`: entry/exit events from the store
//! - `PlannedAbsence`: pre-approved absences keyed by day of month
//! - `StudentProfile`: learner name and schedule text
//! - Report types: `DailyRecord`, `StudentReport`, `MonthReport`, etc.

pub mod absence;
pub mod report;
pub mod schedule;
pub mod student;
pub mod timeline;

pub use absence::{PlannedAbsence, PlannedAbsenceRecord, PlannedAbsences};
pub use report::{
    AttendanceReport, DailyRecord, DailyStatus, MonthDay, MonthReport, ReportAggregates,
    ReportHeader, SkippedStudent, StatusTotals, StudentReport,
};
pub use schedule::{ClassWindow, ScheduleTemplate, TimeOfDay};
pub use student::{StudentProfile, StudentRecord};
pub use timeline::{HistoryRecord, PresenceStatus, TimelineEntry};
