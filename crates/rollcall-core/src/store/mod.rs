//! Event store access.
//!
//! The event store holds learner profiles, entry/exit history and planned
//! absences. It is the only asynchronous boundary of a report: everything
//! downstream of a fetch is pure computation.
//!
//! - `HttpEventStore`: JSON REST client
//! - `SnapshotStore`: the same data read from a local JSON snapshot

pub mod client;
pub mod error;
pub mod snapshot;

pub use client::HttpEventStore;
pub use error::StoreError;
pub use snapshot::{Snapshot, SnapshotStore, SnapshotStudent};

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{PlannedAbsences, StudentProfile, TimelineEntry};

/// Student document fields that can select learners for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    AdviserId,
    TeacherId,
    GradeLevel,
}

impl StudentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentField::AdviserId => "adviserId",
            StudentField::TeacherId => "teacherId",
            StudentField::GradeLevel => "gradeLevel",
        }
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Profile for a learner, or `None` when the learner does not exist.
    async fn fetch_student_profile(&self, student_id: &str) -> Result<Option<StudentProfile>>;

    /// Presence changes between `from` and `to` inclusive, ascending.
    async fn fetch_timeline(
        &self,
        student_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimelineEntry>>;

    /// Planned absences in the given month, keyed by day of month.
    async fn fetch_planned_absences(
        &self,
        student_id: &str,
        year: i32,
        month: u32,
    ) -> Result<PlannedAbsences>;

    /// Learners explicitly assigned to a teacher.
    async fn fetch_assigned_student_ids(&self, teacher_id: &str) -> Result<Vec<String>>;

    /// Learners whose `field` equals `value`.
    async fn query_student_ids(&self, field: StudentField, value: &str) -> Result<Vec<String>>;

    /// Learners in scope for a teacher, trying in order: the teacher's
    /// assignment list, learners advised or taught by the teacher, then the
    /// grade level. Failures are logged and the next source is tried.
    async fn resolve_student_ids(&self, teacher_id: &str, grade_level: &str) -> Vec<String> {
        match self.fetch_assigned_student_ids(teacher_id).await {
            Ok(ids) if !ids.is_empty() => {
                debug!(teacher = %teacher_id, count = ids.len(), "Resolved students from assignments");
                return ids;
            }
            Ok(_) => {}
            Err(e) => warn!(teacher = %teacher_id, error = %e, "Teacher assignment lookup failed"),
        }

        match students_of_teacher(self, teacher_id).await {
            Ok(ids) if !ids.is_empty() => {
                debug!(teacher = %teacher_id, count = ids.len(), "Resolved students by adviser/teacher field");
                return ids;
            }
            Ok(_) => {}
            Err(e) => warn!(teacher = %teacher_id, error = %e, "Querying students by adviser/teacher field failed"),
        }

        let grade_level = grade_level.trim();
        if !grade_level.is_empty() {
            match self.query_student_ids(StudentField::GradeLevel, grade_level).await {
                Ok(ids) if !ids.is_empty() => {
                    debug!(grade = %grade_level, count = ids.len(), "Resolved students by grade level");
                    return ids;
                }
                Ok(_) => {}
                Err(e) => warn!(grade = %grade_level, error = %e, "Querying students by grade level failed"),
            }
        }

        Vec::new()
    }
}

/// Union of learners advised by or assigned to the teacher, first-seen order.
async fn students_of_teacher<S: EventStore + ?Sized>(store: &S, teacher_id: &str) -> Result<Vec<String>> {
    let advised = store.query_student_ids(StudentField::AdviserId, teacher_id).await?;
    let taught = store.query_student_ids(StudentField::TeacherId, teacher_id).await?;

    let mut seen = HashSet::new();
    Ok(advised
        .into_iter()
        .chain(taught)
        .filter(|id| seen.insert(id.clone()))
        .collect())
}
