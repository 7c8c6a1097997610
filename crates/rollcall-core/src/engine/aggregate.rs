use chrono::{NaiveDate, TimeZone};

use super::calendar::day_bounds;
use super::classify::classify;
use super::presence::calculate_minutes_inside;
use super::schedule::parse_class_schedule;
use super::window::build_class_window;
use crate::models::{
    MonthDay, MonthReport, PlannedAbsences, PresenceStatus, ReportAggregates, SkippedStudent,
    StatusTotals, StudentProfile, StudentReport, TimelineEntry,
};

/// Everything fetched for one learner for the report month.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentInput {
    pub profile: StudentProfile,
    /// Ascending by timestamp, covering the whole month
    pub timeline: Vec<TimelineEntry>,
    pub planned_absences: PlannedAbsences,
}

/// Result of fetching one learner: usable input, or the reason it was skipped.
pub type StudentOutcome = Result<StudentInput, SkippedStudent>;

/// Entries falling on `date` in the school's time zone.
fn entries_for_day<'a, Tz: TimeZone>(
    timeline: &'a [TimelineEntry],
    date: NaiveDate,
    tz: &Tz,
) -> &'a [TimelineEntry] {
    let Some((start, end)) = day_bounds(tz, date) else {
        return &[];
    };
    let lo = timeline.partition_point(|e| e.timestamp < start);
    let hi = timeline.partition_point(|e| e.timestamp <= end);
    if lo >= hi {
        return &[];
    }
    &timeline[lo..hi]
}

/// Classify every school day of the month for one learner.
///
/// Without a usable schedule every day counts zero minutes, so days are
/// absent unless a planned absence excuses them.
pub fn build_student_report<Tz: TimeZone>(
    input: &StudentInput,
    month_days: &[MonthDay],
    tz: &Tz,
    threshold: u32,
) -> StudentReport {
    let schedule = parse_class_schedule(input.profile.schedule_text.as_deref());

    let daily: Vec<_> = month_days
        .iter()
        .map(|md| {
            let minutes = build_class_window(schedule.as_ref(), md.date, md.day, tz)
                .map(|window| {
                    let day_entries = entries_for_day(&input.timeline, md.date, tz);
                    calculate_minutes_inside(day_entries, &window, PresenceStatus::Outside)
                })
                .unwrap_or(0);
            classify(minutes, input.planned_absences.get(&md.day), threshold)
        })
        .collect();

    let totals = daily.iter().map(|r| r.status).collect();

    StudentReport {
        id: input.profile.id.clone(),
        name: input.profile.name.clone(),
        daily,
        totals,
        remarks: String::new(),
        has_schedule: schedule.is_some(),
    }
}

/// Per-day totals across learners, index-aligned with the month's days.
pub fn column_totals(day_count: usize, students: &[StudentReport]) -> Vec<StatusTotals> {
    (0..day_count)
        .map(|idx| {
            students
                .iter()
                .filter_map(|s| s.daily.get(idx))
                .map(|r| r.status)
                .collect()
        })
        .collect()
}

/// Present learner-days as a percentage of all learner-days.
/// Zero when there are no school days or no learners.
pub fn attendance_rate(present: u32, school_days: usize, learners: usize) -> f64 {
    if school_days == 0 || learners == 0 {
        return 0.0;
    }
    f64::from(present) / (school_days as f64 * learners as f64) * 100.0
}

/// Fold per-learner outcomes into the month report.
///
/// Skipped learners are carried in `skipped` and excluded from every total.
pub fn build_report<Tz: TimeZone>(
    month_days: Vec<MonthDay>,
    outcomes: Vec<StudentOutcome>,
    tz: &Tz,
    threshold: u32,
) -> MonthReport {
    let mut students = Vec::new();
    let mut skipped = Vec::new();

    for outcome in outcomes {
        match outcome {
            Ok(input) => students.push(build_student_report(&input, &month_days, tz, threshold)),
            Err(skip) => skipped.push(skip),
        }
    }

    let column_totals = column_totals(month_days.len(), &students);
    let mut totals = StatusTotals::default();
    for day in &column_totals {
        totals.merge(day);
    }

    let aggregates = ReportAggregates {
        total_learners: students.len() as u32,
        totals,
        attendance_rate: attendance_rate(totals.present, month_days.len(), students.len()),
    };

    MonthReport {
        month_days,
        students,
        column_totals,
        aggregates,
        skipped,
    }
}
