use crate::config::AppConfig;
use anyhow::{Context, Result};
use slowpath_core::Error;
use slowpath_core::analysis::Analyzer;
use slowpath_core::locate::{LatestLog, find_latest_log};
use slowpath_core::log::ingest;
use slowpath_core::render::{DEFAULT_TEMPLATE, ReportWriter};
use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

/// How a scheduled report run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No dated access log was found.
    NoLogs,
    /// The report for the latest log already exists.
    UpToDate(PathBuf),
    /// The latest log holds no parsable records.
    NothingToReport(PathBuf),
    Written(PathBuf),
}

fn load_template(config: &AppConfig) -> Result<Cow<'static, str>> {
    match &config.report_template {
        Some(path) => {
            let template = fs::read_to_string(path)
                .with_context(|| format!("Cannot read report template {}", path.display()))?;
            Ok(Cow::Owned(template))
        }
        None => Ok(Cow::Borrowed(DEFAULT_TEMPLATE)),
    }
}

fn latest_log(config: &AppConfig) -> Result<Option<LatestLog>> {
    match find_latest_log(&config.log_dir) {
        Ok(latest) => Ok(latest),
        Err(Error::LogDirNotFound(dir)) => {
            tracing::error!("Directory with log files {} has not been found", dir.display());
            Ok(None)
        }
        Err(e) => Err(e).context("Cannot scan log directory"),
    }
}

/// Build the report for the most recent log unless it already exists.
pub fn run(config: &AppConfig) -> Result<RunOutcome> {
    let Some(latest) = latest_log(config)? else {
        return Ok(RunOutcome::NoLogs);
    };

    let report_path = config.report_dir.join(latest.report_file_name());
    if report_path.exists() {
        return Ok(RunOutcome::UpToDate(report_path));
    }

    // settle every input before reading the log
    let builder = config.report_builder()?;
    let budget = config.error_budget()?;
    let template = load_template(config)?;

    tracing::info!("Collecting data from {}", latest.path.display());
    let (aggregation, stats) = ingest(&latest.path, &budget)
        .with_context(|| format!("Failed to process {}", latest.path.display()))?;
    tracing::debug!(
        "{} lines read, error ratio {:.5}",
        stats.lines(),
        stats.error_ratio()
    );

    let rows = match builder.analyze(&aggregation) {
        Ok(rows) => rows,
        Err(Error::NothingToReport) => return Ok(RunOutcome::NothingToReport(latest.path)),
        Err(e) => return Err(e.into()),
    };

    ReportWriter::to_file(&rows, &template, &report_path)
        .with_context(|| format!("Cannot write report {}", report_path.display()))?;

    Ok(RunOutcome::Written(report_path))
}

pub fn execute(config: &AppConfig) -> Result<()> {
    match run(config)? {
        RunOutcome::NoLogs => tracing::info!("No log files yet"),
        RunOutcome::UpToDate(path) => {
            tracing::info!("Looks like everything is up-to-date: {}", path.display())
        }
        RunOutcome::NothingToReport(path) => {
            tracing::warn!("Nothing to report: no records parsed from {}", path.display())
        }
        RunOutcome::Written(path) => tracing::info!("Report saved to {}", path.display()),
    }
    Ok(())
}
