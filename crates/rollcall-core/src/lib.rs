//! Rollcall core: monthly SF2 attendance from entry/exit history.
//!
//! A learner's entry/exit history is reconciled against their class hours
//! for each school day of a month, and each day is classified as present,
//! tardy, absent or excused.
//!
//! - `models`: wire records and report value objects
//! - `engine`: the pure reconciliation pipeline
//! - `store`: the event store seam (HTTP and snapshot)
//! - `report`: request resolution, report service, CSV export
//! - `config`: persisted settings and attendance policy

pub mod config;
pub mod engine;
pub mod models;
pub mod report;
pub mod store;
pub mod utils;

pub use config::{Config, Policy, StoreConfig};
pub use models::{AttendanceReport, DailyStatus, MonthReport, ReportHeader};
pub use report::{ReportError, ReportRequest, ReportService};
pub use store::{EventStore, HttpEventStore, SnapshotStore, StoreError};
