//! Rollcall - monthly SF2 attendance reports from the command line.
//!
//! Reconciles each learner's entry/exit history against their class hours
//! and writes the month's attendance grid as CSV or JSON.

mod commands;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ============================================================================
// Constants
// ============================================================================

/// File name prefix for rotated log files
const LOG_FILE_PREFIX: &str = "rollcall.log";

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "rollcall", version, about = "Generate monthly SF2 attendance reports")]
struct Cli {
    /// Write logs to a daily-rotated file in this directory instead of stderr
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the attendance report for a month
    Report(ReportArgs),
    /// Show or update the saved configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Teacher ID; defaults to the last one used
    #[arg(long)]
    pub teacher: Option<String>,

    /// School year such as 2024-2025
    #[arg(long)]
    pub school_year: Option<String>,

    /// Grade and section such as "7 - Rizal"
    #[arg(long, default_value = "")]
    pub grade: String,

    /// Month as a number or name; defaults to the current month
    #[arg(long)]
    pub month: Option<String>,

    /// Read students from a JSON snapshot instead of the event store
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Write the grid as CSV, named after the report unless a path is given
    #[arg(long, value_name = "PATH")]
    pub csv: Option<Option<PathBuf>>,

    /// Write the full report as JSON, named after the report unless a path is given
    #[arg(long, value_name = "PATH")]
    pub json: Option<Option<PathBuf>>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Print the configuration
    #[arg(long)]
    pub show: bool,

    /// Event store base URL
    #[arg(long)]
    pub store_url: Option<String>,

    /// Default snapshot file
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Minutes inside the class window needed to count as present
    #[arg(long)]
    pub threshold: Option<u32>,

    #[arg(long)]
    pub school_name: Option<String>,

    /// School clock offset from UTC in minutes, e.g. 480
    #[arg(long, allow_negative_numbers = true)]
    pub utc_offset: Option<i32>,
}

// ============================================================================
// Entry point
// ============================================================================

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_deref());

    match cli.command {
        Command::Report(args) => commands::report(args).await,
        Command::Config(args) => commands::config(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_args() {
        let cli = Cli::try_parse_from([
            "rollcall", "report", "--teacher", "T-1", "--grade", "7 - Rizal", "--month", "March",
            "--csv",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.teacher.as_deref(), Some("T-1"));
        assert_eq!(args.grade, "7 - Rizal");
        assert_eq!(args.month.as_deref(), Some("March"));
        assert_eq!(args.csv, Some(None));
        assert_eq!(args.json, None);
    }

    #[test]
    fn test_export_paths() {
        let cli = Cli::try_parse_from([
            "rollcall", "report", "--csv", "out.csv", "--json", "out.json",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.csv, Some(Some(PathBuf::from("out.csv"))));
        assert_eq!(args.json, Some(Some(PathBuf::from("out.json"))));
    }

    #[test]
    fn test_config_negative_offset() {
        let cli = Cli::try_parse_from(["rollcall", "config", "--utc-offset", "-300"]).unwrap();
        let Command::Config(args) = cli.command else {
            panic!("expected config command");
        };
        assert_eq!(args.utc_offset, Some(-300));
        assert!(!args.show);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
