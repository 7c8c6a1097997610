use std::io::Write;

use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};

use crate::models::{AttendanceReport, ReportHeader};
use crate::utils::strip_whitespace;

const FILE_PREFIX: &str = "SF2";
const FALLBACK_FILE_STEM: &str = "SF2_Report";

/// Write the attendance grid as CSV: one numbered row per learner with the
/// daily codes, the four totals and remarks. Rows end in CRLF.
pub fn write_csv<W: Write>(report: &AttendanceReport, writer: W) -> Result<()> {
    let month = &report.month;
    let mut csv_writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(writer);

    let mut header = vec!["#".to_string(), "Learner Name".to_string()];
    header.extend(month.month_days.iter().map(|d| format!("Day {}", d.day)));
    header.extend(["Present", "Absent", "Excused", "Tardy", "Remarks"].map(String::from));
    csv_writer.write_record(&header)?;

    for (idx, student) in month.students.iter().enumerate() {
        let mut row = vec![(idx + 1).to_string(), student.name.clone()];
        row.extend(
            (0..month.month_days.len())
                .map(|day| student.daily.get(day).map(|r| r.code.clone()).unwrap_or_default()),
        );
        let totals = &student.totals;
        row.extend([totals.present, totals.absent, totals.excused, totals.tardy].map(|n| n.to_string()));
        row.push(student.remarks.clone());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush().context("Failed to write CSV")?;
    Ok(())
}

pub fn to_csv(report: &AttendanceReport) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(report, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Download name such as `SF2_7_Rizal_March2025.csv`.
pub fn file_name(header: &ReportHeader, extension: &str) -> String {
    let parts: Vec<String> = [&header.grade_level, &header.section, &header.month_label]
        .into_iter()
        .map(|p| strip_whitespace(p))
        .filter(|p| !p.is_empty())
        .collect();

    let stem = if parts.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        format!("{}_{}", FILE_PREFIX, parts.join("_"))
    };
    format!("{}.{}", stem, extension)
}
