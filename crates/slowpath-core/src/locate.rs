use crate::{Error, Result};
use chrono::NaiveDate;
use glob::Pattern;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref LOG_FILE_NAME: Regex =
        Regex::new(r"^nginx-access-ui\.log-(?P<date>\d{8})(\.gz)?$").unwrap();
}

/// The most recent dated access log found in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestLog {
    pub path: PathBuf,
    pub date: NaiveDate,
}

impl LatestLog {
    /// Report artifact name derived from the log date, e.g. `report-2017.06.30.html`
    pub fn report_file_name(&self) -> String {
        format!("report-{}.html", self.date.format("%Y.%m.%d"))
    }
}

/// Date encoded in an access log file name, if the name follows the
/// `nginx-access-ui.log-YYYYMMDD[.gz]` convention and the date is valid.
pub fn log_date(file_name: &str) -> Option<NaiveDate> {
    let caps = LOG_FILE_NAME.captures(file_name)?;
    match NaiveDate::parse_from_str(&caps["date"], "%Y%m%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::info!("Skipping {}: invalid date ({})", file_name, e);
            None
        }
    }
}

/// Find the access log with the latest date in `dir`.
///
/// When a plain and a compressed log share a date, the first one in name
/// order (the plain one) wins.
pub fn find_latest_log(dir: &Path) -> Result<Option<LatestLog>> {
    if !dir.is_dir() {
        return Err(Error::LogDirNotFound(dir.to_path_buf()));
    }

    let pattern = format!(
        "{}/nginx-access-ui.log-*",
        Pattern::escape(&dir.to_string_lossy())
    );
    let candidates =
        glob::glob(&pattern).map_err(|e| Error::InvalidPattern(format!("{}: {}", pattern, e)))?;

    let mut latest: Option<LatestLog> = None;
    for candidate in candidates {
        let path = match candidate {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Cannot inspect {}: {}", e.path().display(), e.error());
                continue;
            }
        };

        let Some(date) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(log_date)
        else {
            continue;
        };

        tracing::debug!("Found log {} dated {}", path.display(), date);

        if latest.as_ref().is_some_and(|current| date <= current.date) {
            continue;
        }
        latest = Some(LatestLog { path, date });
    }

    Ok(latest)
}
