use crate::models::{DailyRecord, DailyStatus, PlannedAbsence};

/// Classify one school day.
///
/// A planned absence always wins. Otherwise `threshold` minutes or more is
/// present, any smaller positive amount is tardy, and zero is absent.
pub fn classify(
    minutes_inside: u32,
    planned_absence: Option<&PlannedAbsence>,
    threshold: u32,
) -> DailyRecord {
    if let Some(planned) = planned_absence {
        return DailyRecord::new(DailyStatus::Excused, minutes_inside, planned.remarks());
    }

    let status = if minutes_inside >= threshold {
        DailyStatus::Present
    } else if minutes_inside > 0 {
        DailyStatus::Tardy
    } else {
        DailyStatus::Absent
    };
    DailyRecord::new(status, minutes_inside, String::new())
}
