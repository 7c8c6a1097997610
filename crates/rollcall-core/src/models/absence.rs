use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Remark written on an excused day when no reason was recorded
const DEFAULT_REMARK: &str = "Planned";

/// A pre-approved absence. Its presence alone excuses the day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAbsence {
    #[serde(default)]
    pub reason: Option<String>,
}

impl PlannedAbsence {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }

    /// Remark for the daily record: the reason, or "Planned" when blank.
    pub fn remarks(&self) -> String {
        match self.reason.as_deref() {
            Some(r) if !r.trim().is_empty() => r.to_string(),
            _ => DEFAULT_REMARK.to_string(),
        }
    }
}

/// Planned absences for one month, keyed by day of month.
pub type PlannedAbsences = BTreeMap<u32, PlannedAbsence>;

/// Planned absence document as stored, keyed by a `YYYYMMDD` id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAbsenceRecord {
    pub id: String,
    #[serde(flatten)]
    pub absence: PlannedAbsence,
}

/// Split a `YYYYMMDD` key into (year, month, day).
pub fn parse_absence_key(key: &str) -> Option<(i32, u32, u32)> {
    if key.len() != 8 || !key.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = key[0..4].parse().ok()?;
    let month = key[4..6].parse().ok()?;
    let day = key[6..8].parse().ok()?;
    Some((year, month, day))
}

/// Keep only the records that fall in the requested month.
pub fn planned_absences_for_month<I>(records: I, year: i32, month: u32) -> PlannedAbsences
where
    I: IntoIterator<Item = (String, PlannedAbsence)>,
{
    records
        .into_iter()
        .filter_map(|(key, absence)| match parse_absence_key(&key) {
            Some((y, m, d)) if y == year && m == month => Some((d, absence)),
            _ => None,
        })
        .collect()
}
