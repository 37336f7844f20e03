//! Batch-runner entry point.
//!
//! # Responsibility
//! - Open the source and report stores and drive full regeneration or a
//!   single-decision deletion cascade from the command line.

use clap::{Args, Parser, Subcommand};
use reportsync_core::db::{open_report_db, open_source_db};
use reportsync_core::{
    default_log_level, init_logging, DecisionKey, LogNotifier, MeetingType, ProgressReporter,
    ReportStore, SqliteReportStore, SqliteSourceRepository, SyncService,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "reportsync",
    about = "Projects the meeting administration into the report store"
)]
struct Cli {
    #[command(flatten)]
    stores: StoreArgs,
    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long)]
    log_dir: Option<String>,
    /// Log level: trace|debug|info|warn|error.
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct StoreArgs {
    /// Path to the canonical source database; only `generate` opens it.
    #[arg(long)]
    source: PathBuf,
    /// Path to the report database (created and migrated when missing).
    #[arg(long)]
    report: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate the report store for every meeting in the source.
    Generate,
    /// Remove one projected decision and its derived records.
    DeleteDecision {
        #[arg(long, value_parser = parse_meeting_type)]
        meeting_type: MeetingType,
        #[arg(long)]
        meeting_number: i32,
        #[arg(long)]
        point: i32,
        #[arg(long)]
        number: i32,
    },
}

fn parse_meeting_type(value: &str) -> Result<MeetingType, String> {
    MeetingType::parse(value).ok_or_else(|| format!("expected AV|BV|VV|Virt, got `{value}`"))
}

struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn on_progress(&mut self, processed: usize, total: usize) {
        eprintln!("meetings projected: {processed}/{total}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("reportsync: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let report_conn = open_report_db(&cli.stores.report).map_err(|err| err.to_string())?;
    let store = SqliteReportStore::try_new(report_conn).map_err(|err| err.to_string())?;
    let mut service = SyncService::new(store, LogNotifier);

    match cli.command {
        Command::Generate => {
            // The deletion cascade never reads the source store, so it
            // is only opened here.
            let source_conn =
                open_source_db(&cli.stores.source).map_err(|err| err.to_string())?;
            let source =
                SqliteSourceRepository::try_new(&source_conn).map_err(|err| err.to_string())?;
            let mut progress = ConsoleProgress;
            service
                .generate(&source, &mut progress)
                .map_err(|err| err.to_string())?;
        }
        Command::DeleteDecision {
            meeting_type,
            meeting_number,
            point,
            number,
        } => {
            let key = DecisionKey {
                meeting_type,
                meeting_number,
                point,
                number,
            };
            service.delete_decision(&key).map_err(|err| err.to_string())?;
            service.store_mut().commit().map_err(|err| err.to_string())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command, StoreArgs};
    use reportsync_core::MeetingType;

    #[test]
    fn delete_decision_does_not_open_the_source_store() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            stores: StoreArgs {
                // Unopenable path; the cascade must never touch it.
                source: "/nonexistent/source.db".into(),
                report: dir.path().join("report.db"),
            },
            log_dir: None,
            log_level: None,
            command: Command::DeleteDecision {
                meeting_type: MeetingType::Av,
                meeting_number: 1,
                point: 1,
                number: 1,
            },
        };

        let message = run(cli).unwrap_err();
        assert!(message.contains("not present in report store"));
    }
}
