//! Report generation on top of the engine and an event store.
//!
//! `ReportService` turns a `ReportRequest` into an `AttendanceReport`;
//! `export` renders it for download.

pub mod error;
pub mod export;
pub mod request;
pub mod service;

pub use error::ReportError;
pub use export::{file_name, to_csv, write_csv};
pub use request::{parse_month_input, ReportRequest, ResolvedRequest};
pub use service::{ReportService, MAX_CONCURRENT_FETCHES};
