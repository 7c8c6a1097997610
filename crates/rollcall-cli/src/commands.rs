use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use rollcall_core::config::ENV_STORE_URL;
use rollcall_core::report::{file_name, parse_month_input, write_csv};
use rollcall_core::utils::format_rate;
use rollcall_core::{
    AttendanceReport, Config, EventStore, HttpEventStore, Policy, ReportRequest, ReportService,
    SnapshotStore,
};

use crate::{ConfigArgs, ReportArgs};

/// Shown in place of a saved API token
const MASKED_TOKEN: &str = "********";

// ============================================================================
// report
// ============================================================================

pub async fn report(args: ReportArgs) -> Result<()> {
    let mut config = Config::load()?;
    let saved_teacher = config.last_teacher_id.clone();
    config.apply_env_overrides();

    let today = Local::now().date_naive();
    let request = ReportRequest {
        teacher_id: args.teacher.clone().or(saved_teacher.clone()).unwrap_or_default(),
        school_year: args.school_year.clone(),
        grade_level: args.grade.clone(),
        month: args.month.as_deref().map(|m| parse_month_input(m, today)),
    };

    let policy = config.policy.clone();
    let report = match args.snapshot.clone().or(config.store.snapshot_path.clone()) {
        Some(path) => generate(SnapshotStore::load(&path)?, policy, &request, today).await?,
        None => {
            let base_url = config.store.base_url.as_deref().ok_or_else(|| {
                anyhow!(
                    "No event store configured. Set {} or pass --snapshot",
                    ENV_STORE_URL
                )
            })?;
            let mut store = HttpEventStore::new(base_url, config.store.timeout())?;
            if let Some(token) = &config.store.api_token {
                store = store.with_token(token.clone());
            }
            generate(store, policy, &request, today).await?
        }
    };

    print_summary(&report);
    export(&report, &args)?;

    if saved_teacher.as_deref() != Some(report.header.teacher_id.as_str()) {
        remember_teacher(&report.header.teacher_id);
    }
    Ok(())
}

async fn generate<S: EventStore>(
    store: S,
    policy: Policy,
    request: &ReportRequest,
    today: NaiveDate,
) -> Result<AttendanceReport> {
    let service = ReportService::new(store, policy);
    Ok(service.generate(request, today).await?)
}

fn print_summary(report: &AttendanceReport) {
    let header = &report.header;
    let aggregates = &report.month.aggregates;
    let totals = &aggregates.totals;

    println!("SF2 {} - {}", header.month_label, header.school_name);
    println!(
        "Teacher: {}  School year: {}  Grade: {}  Section: {}",
        header.teacher_id, header.school_year, header.grade_level, header.section
    );
    println!("School days: {}", report.month.month_days.len());
    println!("Learners: {}", aggregates.total_learners);
    println!(
        "Present: {}  Absent: {}  Excused: {}  Tardy: {}",
        totals.present, totals.absent, totals.excused, totals.tardy
    );
    println!("Attendance rate: {}", format_rate(aggregates.attendance_rate));

    if !report.month.skipped.is_empty() {
        println!("Skipped {} student(s):", report.month.skipped.len());
        for skipped in &report.month.skipped {
            println!("  {}: {}", skipped.id, skipped.reason);
        }
    }
}

fn export(report: &AttendanceReport, args: &ReportArgs) -> Result<()> {
    if let Some(path) = &args.csv {
        let path = output_path(path, report, "csv");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(report, BufWriter::new(file))?;
        info!(path = %path.display(), "Wrote CSV");
        println!("Wrote {}", path.display());
    }

    if let Some(path) = &args.json {
        let path = output_path(path, report, "json");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;
        info!(path = %path.display(), "Wrote JSON");
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn output_path(path: &Option<PathBuf>, report: &AttendanceReport, extension: &str) -> PathBuf {
    path.clone()
        .unwrap_or_else(|| PathBuf::from(file_name(&report.header, extension)))
}

/// Save the teacher for next time, without the environment overrides.
fn remember_teacher(teacher_id: &str) {
    let result = Config::load().and_then(|mut config| {
        config.last_teacher_id = Some(teacher_id.to_string());
        config.save()
    });
    if let Err(e) = result {
        warn!(error = %e, "Failed to save last teacher ID");
    }
}

// ============================================================================
// config
// ============================================================================

pub fn config(args: ConfigArgs) -> Result<()> {
    let mut config = Config::load()?;
    let mut changed = false;

    if let Some(url) = args.store_url {
        config.store.base_url = Some(url);
        changed = true;
    }
    if let Some(path) = args.snapshot {
        config.store.snapshot_path = Some(path);
        changed = true;
    }
    if let Some(threshold) = args.threshold {
        config.policy.present_minutes_threshold = threshold;
        changed = true;
    }
    if let Some(name) = args.school_name {
        config.policy.school_name = name;
        changed = true;
    }
    if let Some(offset) = args.utc_offset {
        config.policy.utc_offset_minutes = Some(offset);
        changed = true;
    }

    if changed {
        config.policy.validate()?;
        config.save()?;
        println!("Saved {}", Config::config_path()?.display());
    }

    if args.show || !changed {
        let mut shown = config;
        if shown.store.api_token.is_some() {
            shown.store.api_token = Some(MASKED_TOKEN.to_string());
        }
        println!("{}", serde_json::to_string_pretty(&shown)?);
    }
    Ok(())
}
