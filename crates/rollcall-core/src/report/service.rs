use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::{ReportError, ReportRequest};
use crate::config::Policy;
use crate::engine::{build_report, month_bounds, month_days, month_label, StudentInput, StudentOutcome};
use crate::models::{AttendanceReport, PlannedAbsences, ReportHeader, SkippedStudent};
use crate::store::{EventStore, StoreError};

/// Learners fetched at once
pub const MAX_CONCURRENT_FETCHES: usize = 8;

pub struct ReportService<S> {
    store: S,
    policy: Policy,
}

impl<S: EventStore> ReportService<S> {
    pub fn new(store: S, policy: Policy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build the month report on the school clock from the policy.
    pub async fn generate(
        &self,
        request: &ReportRequest,
        today: NaiveDate,
    ) -> Result<AttendanceReport, ReportError> {
        match self.policy.utc_offset() {
            Some(offset) => self.generate_in(request, today, &offset).await,
            None => self.generate_in(request, today, &Local).await,
        }
    }

    /// Build the month report with days evaluated in `tz`.
    pub async fn generate_in<Tz: TimeZone>(
        &self,
        request: &ReportRequest,
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<AttendanceReport, ReportError> {
        self.policy.validate()?;
        let resolved = request.resolve(today)?;
        let (year, month) = (resolved.year, resolved.month);

        let invalid_month = || ReportError::InvalidMonth { year, month };
        let (from, to) = month_bounds(tz, year, month).ok_or_else(invalid_month)?;
        let anchor_date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid_month)?;

        let ids = self
            .store
            .resolve_student_ids(&resolved.teacher_id, &resolved.grade)
            .await;
        info!(
            teacher = %resolved.teacher_id,
            year,
            month,
            students = ids.len(),
            "Generating attendance report"
        );

        let outcomes: Vec<StudentOutcome> = stream::iter(ids)
            .map(|id| self.fetch_student(id, year, month, from, to))
            .buffered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;

        for skipped in outcomes.iter().filter_map(|o| o.as_ref().err()) {
            warn!(student = %skipped.id, reason = %skipped.reason, "Skipping student");
        }

        let month_report = build_report(
            month_days(year, month),
            outcomes,
            tz,
            self.policy.present_minutes_threshold,
        );
        debug!(
            learners = month_report.aggregates.total_learners,
            skipped = month_report.skipped.len(),
            rate = month_report.aggregates.attendance_rate,
            "Report aggregated"
        );

        let header = ReportHeader {
            teacher_id: resolved.teacher_id,
            report_date: today,
            school_year: resolved.school_year,
            grade_level: resolved.grade,
            section: resolved.section,
            month,
            month_label: month_label(month, year),
            school_name: self.policy.school_name.clone(),
            no_of_class_days: self.policy.fixed_class_days,
            anchor_date,
        };

        Ok(AttendanceReport {
            header,
            month: month_report,
        })
    }

    /// Everything the engine needs for one learner. A missing profile or a
    /// failed profile/timeline fetch skips the learner; a failed planned
    /// absence fetch only loses the excusals.
    async fn fetch_student(
        &self,
        id: String,
        year: i32,
        month: u32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StudentOutcome {
        let profile = match self.store.fetch_student_profile(&id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return Err(SkippedStudent::new(id, "student not found")),
            Err(e) => return Err(SkippedStudent::new(id, skip_reason("profile", &e))),
        };

        let mut timeline = match self.store.fetch_timeline(&id, from, to).await {
            Ok(timeline) => timeline,
            Err(e) => return Err(SkippedStudent::new(id, skip_reason("timeline", &e))),
        };
        timeline.sort_by_key(|e| e.timestamp);

        let planned_absences = match self.store.fetch_planned_absences(&id, year, month).await {
            Ok(absences) => absences,
            Err(e) => {
                warn!(student = %id, error = %e, "Planned absence fetch failed, treating as none");
                PlannedAbsences::new()
            }
        };

        Ok(StudentInput {
            profile,
            timeline,
            planned_absences,
        })
    }
}

/// Reason recorded for a learner whose `what` fetch failed.
fn skip_reason(what: &str, err: &anyhow::Error) -> String {
    match err.downcast_ref::<StoreError>() {
        Some(store_err) if store_err.is_denied() => {
            format!("{} fetch denied by event store", what)
        }
        Some(store_err) if store_err.is_not_found() => "student not found".to_string(),
        _ => format!("{} fetch failed: {:#}", what, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::FixedOffset;
    use reqwest::StatusCode;

    use crate::models::{DailyStatus, StudentProfile, TimelineEntry};
    use crate::store::{SnapshotStore, StudentField};

    const SNAPSHOT: &str = r#"{
        "teacherAssignments": {"T-1": ["S1", "GHOST", "S2"]},
        "students": {
            "S1": {
                "name": "Santos, Maria",
                "classHours": "7:30 AM - 8:30 AM",
                "gradeLevel": "7",
                "history": [
                    {"timestamp": "2025-03-03T00:00:00Z", "status": "Outside School"},
                    {"timestamp": "2025-03-02T23:40:00Z", "status": "Inside School"},
                    {"timestamp": "2025-03-04T00:20:00Z", "status": "Inside School"}
                ],
                "plannedAbsences": {"20250305": {"reason": "Fever"}}
            },
            "S2": {"firstName": "Jose", "lastName": "Rizal", "gradeLevel": "7"}
        }
    }"#;

    fn manila() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    fn request() -> ReportRequest {
        ReportRequest {
            teacher_id: "T-1".to_string(),
            school_year: Some("2024-2025".to_string()),
            grade_level: "7 - Rizal".to_string(),
            month: Some(3),
        }
    }

    fn service() -> ReportService<SnapshotStore> {
        let policy = Policy {
            utc_offset_minutes: Some(480),
            ..Default::default()
        };
        ReportService::new(SnapshotStore::from_json(SNAPSHOT).unwrap(), policy)
    }

    #[tokio::test]
    async fn test_generate_month_report() {
        let report = service().generate(&request(), today()).await.unwrap();

        assert_eq!(report.header.teacher_id, "T-1");
        assert_eq!(report.header.grade_level, "7");
        assert_eq!(report.header.section, "Rizal");
        assert_eq!(report.header.month_label, "March 2025");
        assert_eq!(report.header.no_of_class_days, 30);
        assert_eq!(report.header.anchor_date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(report.month.month_days.len(), 21);

        let names: Vec<&str> = report.month.students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Santos, Maria", "Rizal, Jose"]);

        let maria = &report.month.students[0];
        assert_eq!(maria.daily[0].status, DailyStatus::Present);
        assert_eq!(maria.daily[0].minutes, 20);
        assert_eq!(maria.daily[1].status, DailyStatus::Tardy);
        assert_eq!(maria.daily[1].minutes, 10);
        assert_eq!(maria.daily[2].status, DailyStatus::Excused);
        assert_eq!(maria.daily[2].remarks, "Fever");
        assert_eq!(maria.totals.absent, 18);

        let jose = &report.month.students[1];
        assert!(!jose.has_schedule);
        assert_eq!(jose.totals.absent, 21);

        assert_eq!(report.month.skipped.len(), 1);
        assert_eq!(report.month.skipped[0].id, "GHOST");
        assert_eq!(report.month.skipped[0].reason, "student not found");

        let aggregates = &report.month.aggregates;
        assert_eq!(aggregates.total_learners, 2);
        assert_eq!(aggregates.totals.present, 1);
        assert!((aggregates.attendance_rate - 100.0 / 42.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_threshold_from_policy() {
        let policy = Policy {
            present_minutes_threshold: 25,
            ..Default::default()
        };
        let service = ReportService::new(SnapshotStore::from_json(SNAPSHOT).unwrap(), policy);
        let report = service
            .generate_in(&request(), today(), &manila())
            .await
            .unwrap();
        assert_eq!(report.month.students[0].daily[0].status, DailyStatus::Tardy);
    }

    #[tokio::test]
    async fn test_missing_teacher_fails_fast() {
        let mut request = request();
        request.teacher_id = "  ".to_string();
        let err = service().generate(&request, today()).await.unwrap_err();
        assert_eq!(err, ReportError::MissingTeacherId);
    }

    #[tokio::test]
    async fn test_zero_threshold_rejected() {
        let policy = Policy {
            present_minutes_threshold: 0,
            ..Default::default()
        };
        let service = ReportService::new(SnapshotStore::from_json(SNAPSHOT).unwrap(), policy);
        let err = service.generate(&request(), today()).await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidPolicy(_)));
    }

    #[tokio::test]
    async fn test_no_students_in_scope() {
        let mut request = request();
        request.teacher_id = "T-NOBODY".to_string();
        request.grade_level = "12".to_string();
        let report = service().generate(&request, today()).await.unwrap();
        assert!(report.month.students.is_empty());
        assert_eq!(report.month.aggregates.attendance_rate, 0.0);
        assert_eq!(report.month.column_totals.len(), 21);
    }

    /// Store where every lookup except the one under test fails.
    struct FlakyStore;

    fn profile(id: &str) -> StudentProfile {
        StudentProfile {
            id: id.to_string(),
            name: format!("Learner {}", id),
            schedule_text: Some("8:00-9:00".to_string()),
        }
    }

    #[async_trait]
    impl EventStore for FlakyStore {
        async fn fetch_student_profile(&self, student_id: &str) -> Result<Option<StudentProfile>> {
            match student_id {
                "BROKEN-PROFILE" => Err(anyhow!("connection reset")),
                id => Ok(Some(profile(id))),
            }
        }

        async fn fetch_timeline(
            &self,
            student_id: &str,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<TimelineEntry>> {
            match student_id {
                "BROKEN-TIMELINE" => Err(anyhow!("timeout")),
                "DENIED" => Err(StoreError::from_status(StatusCode::FORBIDDEN, "token expired").into()),
                "GONE" => Err(StoreError::from_status(StatusCode::NOT_FOUND, "").into()),
                _ => Ok(Vec::new()),
            }
        }

        async fn fetch_planned_absences(
            &self,
            _student_id: &str,
            _year: i32,
            _month: u32,
        ) -> Result<PlannedAbsences> {
            Err(anyhow!("planned absences unavailable"))
        }

        async fn fetch_assigned_student_ids(&self, _teacher_id: &str) -> Result<Vec<String>> {
            Err(anyhow!("assignments unavailable"))
        }

        async fn query_student_ids(&self, field: StudentField, _value: &str) -> Result<Vec<String>> {
            match field {
                StudentField::GradeLevel => Ok(vec![
                    "OK".to_string(),
                    "BROKEN-PROFILE".to_string(),
                    "BROKEN-TIMELINE".to_string(),
                    "DENIED".to_string(),
                    "GONE".to_string(),
                ]),
                _ => Err(anyhow!("index missing")),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_failures_skip_or_degrade() {
        let service = ReportService::new(FlakyStore, Policy::default());
        let report = service
            .generate_in(&request(), today(), &manila())
            .await
            .unwrap();

        let ids: Vec<&str> = report.month.students.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["OK"]);
        assert_eq!(report.month.students[0].totals.absent, 21);

        let skipped: Vec<&str> = report.month.skipped.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, vec!["BROKEN-PROFILE", "BROKEN-TIMELINE", "DENIED", "GONE"]);
        assert!(report.month.skipped[0].reason.starts_with("profile fetch failed"));
        assert!(report.month.skipped[1].reason.contains("timeout"));
        assert_eq!(report.month.skipped[2].reason, "timeline fetch denied by event store");
        assert_eq!(report.month.skipped[3].reason, "student not found");
    }
}
