use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EventStore, StudentField};
use crate::models::absence::planned_absences_for_month;
use crate::models::timeline::timeline_from_history;
use crate::models::{
    HistoryRecord, PlannedAbsence, PlannedAbsences, StudentProfile, StudentRecord, TimelineEntry,
};

/// A student document together with its history and planned absences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStudent {
    #[serde(flatten)]
    pub record: StudentRecord,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    /// Keyed by `YYYYMMDD`
    #[serde(default)]
    pub planned_absences: BTreeMap<String, PlannedAbsence>,
}

/// Exported contents of the event store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub teacher_assignments: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub students: BTreeMap<String, SnapshotStudent>,
}

/// Event store backed by a snapshot held in memory.
pub struct SnapshotStore {
    snapshot: Snapshot,
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json).context("Failed to parse snapshot")?;
        Ok(Self::new(snapshot))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
        let store = Self::from_json(&contents)
            .with_context(|| format!("Failed to load snapshot file: {}", path.display()))?;
        debug!(
            path = %path.display(),
            students = store.snapshot.students.len(),
            "Loaded snapshot"
        );
        Ok(store)
    }

    fn field_value<'a>(student: &'a SnapshotStudent, field: StudentField) -> Option<&'a str> {
        match field {
            StudentField::AdviserId => student.record.adviser_id.as_deref(),
            StudentField::TeacherId => student.record.teacher_id.as_deref(),
            StudentField::GradeLevel => student.record.grade_level.as_deref(),
        }
    }
}

#[async_trait]
impl EventStore for SnapshotStore {
    async fn fetch_student_profile(&self, student_id: &str) -> Result<Option<StudentProfile>> {
        Ok(self
            .snapshot
            .students
            .get(student_id)
            .map(|s| s.record.to_profile(student_id)))
    }

    async fn fetch_timeline(
        &self,
        student_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimelineEntry>> {
        let Some(student) = self.snapshot.students.get(student_id) else {
            return Ok(Vec::new());
        };
        Ok(timeline_from_history(&student.history)
            .into_iter()
            .filter(|e| e.timestamp >= from && e.timestamp <= to)
            .collect())
    }

    async fn fetch_planned_absences(
        &self,
        student_id: &str,
        year: i32,
        month: u32,
    ) -> Result<PlannedAbsences> {
        let Some(student) = self.snapshot.students.get(student_id) else {
            return Ok(PlannedAbsences::new());
        };
        Ok(planned_absences_for_month(
            student.planned_absences.clone(),
            year,
            month,
        ))
    }

    async fn fetch_assigned_student_ids(&self, teacher_id: &str) -> Result<Vec<String>> {
        Ok(self
            .snapshot
            .teacher_assignments
            .get(teacher_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn query_student_ids(&self, field: StudentField, value: &str) -> Result<Vec<String>> {
        Ok(self
            .snapshot
            .students
            .iter()
            .filter(|(_, s)| Self::field_value(s, field) == Some(value))
            .map(|(id, _)| id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SNAPSHOT: &str = r#"{
        "teacherAssignments": {
            "T-ASSIGNED": ["S3", "S1"],
            "T-EMPTY": []
        },
        "students": {
            "S1": {
                "name": "Santos, Maria",
                "classHours": "7:30 AM-4:30 PM",
                "adviserId": "T-ADVISER",
                "gradeLevel": "7",
                "history": [
                    {"timestamp": "2025-03-03T08:10:00Z", "status": "Outside School"},
                    {"timestamp": "2025-03-03T00:05:00Z", "status": "Inside School"},
                    {"timestamp": "2025-04-01T00:05:00Z", "status": "Inside School"}
                ],
                "plannedAbsences": {
                    "20250310": {"reason": "Dental"},
                    "20250401": {}
                }
            },
            "S2": {"firstName": "Jose", "lastName": "Rizal", "teacherId": "T-ADVISER", "gradeLevel": "7"},
            "S3": {"name": "Reyes, Ana", "adviserId": "T-OTHER", "gradeLevel": "8"},
            "S4": {"name": "Lim, Ben", "classHours": "7:00 AM - 3:00 PM", "class_hours": "8:00 AM - 5:00 PM"},
            "S5": {"name": "Cruz, Lea", "classHours": null, "class_hours": "8:00 AM - 5:00 PM"}
        }
    }"#;

    fn store() -> SnapshotStore {
        SnapshotStore::from_json(SNAPSHOT).unwrap()
    }

    #[tokio::test]
    async fn test_profile_lookup() {
        let store = store();
        let profile = store.fetch_student_profile("S2").await.unwrap().unwrap();
        assert_eq!(profile.name, "Rizal, Jose");
        assert_eq!(profile.schedule_text, None);
        assert!(store.fetch_student_profile("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_class_hours_from_either_key() {
        let store = store();
        let both = store.fetch_student_profile("S4").await.unwrap().unwrap();
        assert_eq!(both.schedule_text.as_deref(), Some("7:00 AM - 3:00 PM"));
        let legacy = store.fetch_student_profile("S5").await.unwrap().unwrap();
        assert_eq!(legacy.schedule_text.as_deref(), Some("8:00 AM - 5:00 PM"));
    }

    #[tokio::test]
    async fn test_timeline_sorted_and_bounded() {
        let from = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        let timeline = store().fetch_timeline("S1", from, to).await.unwrap();
        assert_eq!(timeline.len(), 2);
        assert!(timeline[0].timestamp < timeline[1].timestamp);
        assert!(timeline[0].status.is_inside());
    }

    #[tokio::test]
    async fn test_planned_absences_filtered_by_month() {
        let absences = store().fetch_planned_absences("S1", 2025, 3).await.unwrap();
        assert_eq!(absences.len(), 1);
        assert_eq!(absences[&10].remarks(), "Dental");
    }

    #[tokio::test]
    async fn test_resolve_prefers_assignments() {
        let ids = store().resolve_student_ids("T-ASSIGNED", "7").await;
        assert_eq!(ids, vec!["S3", "S1"]);
    }

    #[tokio::test]
    async fn test_resolve_by_adviser_or_teacher_field() {
        let ids = store().resolve_student_ids("T-ADVISER", "").await;
        assert_eq!(ids, vec!["S1", "S2"]);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_grade_level() {
        let store = store();
        assert_eq!(store.resolve_student_ids("T-EMPTY", "8").await, vec!["S3"]);
        assert!(store.resolve_student_ids("T-EMPTY", "").await.is_empty());
        assert!(store.resolve_student_ids("T-NOBODY", "12").await.is_empty());
    }
}
