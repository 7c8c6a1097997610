use thiserror::Error;

/// Failures that stop a report before any learner is fetched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReportError {
    #[error("Please enter Teacher ID")]
    MissingTeacherId,

    #[error("Invalid attendance policy: {0}")]
    InvalidPolicy(String),

    #[error("No calendar for {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}
