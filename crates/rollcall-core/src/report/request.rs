use chrono::{Datelike, NaiveDate};

use super::ReportError;
use crate::engine::calendar::MONTH_NAMES;
use crate::utils::parse_grade_section;

/// Minimum prefix length accepted as a month name ("Mar", "Sept")
const MIN_MONTH_PREFIX: usize = 3;

/// What the user asked for, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRequest {
    pub teacher_id: String,
    /// "2024-2025"; the current year pair when absent
    pub school_year: Option<String>,
    /// Raw "grade - section" text, e.g. "7 - Rizal"
    pub grade_level: String,
    /// 1..=12; today's month when absent or out of range
    pub month: Option<u32>,
}

/// A request with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub teacher_id: String,
    pub school_year: String,
    pub year: i32,
    pub month: u32,
    pub grade: String,
    pub section: String,
}

impl ReportRequest {
    pub fn new(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            ..Default::default()
        }
    }

    /// Apply defaults relative to `today`. Fails only on a blank teacher ID.
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedRequest, ReportError> {
        let teacher_id = self.teacher_id.trim();
        if teacher_id.is_empty() {
            return Err(ReportError::MissingTeacherId);
        }

        let school_year = match self.school_year.as_deref().map(str::trim) {
            Some(sy) if !sy.is_empty() => sy.to_string(),
            _ => format!("{}-{}", today.year(), today.year() + 1),
        };

        let month = self
            .month
            .filter(|m| (1..=12).contains(m))
            .unwrap_or_else(|| today.month());

        let year = anchor_year(&school_year)
            .filter(|y| NaiveDate::from_ymd_opt(*y, month, 1).is_some())
            .unwrap_or_else(|| today.year());

        let (grade, section) = parse_grade_section(&self.grade_level);

        Ok(ResolvedRequest {
            teacher_id: teacher_id.to_string(),
            school_year,
            year,
            month,
            grade,
            section,
        })
    }
}

/// The leading digits before the first `-` of a school year, when positive.
/// Trailing text is ignored, so "2024SY-2025" anchors to 2024.
fn anchor_year(school_year: &str) -> Option<i32> {
    let first = school_year.split('-').next()?.trim_start();
    let digits_end = first
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(first.len());
    first[..digits_end].parse::<i32>().ok().filter(|y| *y > 0)
}

/// Month number from free text: `1`..`12`, an English month name, or a
/// prefix of at least three letters. Anything else yields `fallback`'s month.
pub fn parse_month_input(text: &str, fallback: NaiveDate) -> u32 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return fallback.month();
    }

    if let Ok(n) = trimmed.parse::<u32>() {
        if (1..=12).contains(&n) {
            return n;
        }
        return fallback.month();
    }

    let lower = trimmed.to_lowercase();
    if let Some(idx) = MONTH_NAMES.iter().position(|name| name.to_lowercase() == lower) {
        return idx as u32 + 1;
    }

    if lower.chars().count() >= MIN_MONTH_PREFIX {
        let mut matches = MONTH_NAMES
            .iter()
            .enumerate()
            .filter(|(_, name)| name.to_lowercase().starts_with(&lower));
        if let (Some((idx, _)), None) = (matches.next(), matches.next()) {
            return idx as u32 + 1;
        }
    }

    fallback.month()
}
