use crate::Result;
use crate::analysis::ReportRow;
use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::Path;

/// Built-in HTML report page.
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/report.html");

lazy_static! {
    static ref TABLE_PLACEHOLDER: Regex = Regex::new(r"\$(?:\{table_json\}|table_json\b)").unwrap();
}

pub struct ReportWriter;

impl ReportWriter {
    /// Serialize rows into the JSON blob embedded in the report page
    pub fn to_json(rows: &[ReportRow]) -> Result<String> {
        let json = serde_json::to_string(rows)?;
        // keep the blob from closing a surrounding <script> element
        Ok(json.replace("</", "<\\/"))
    }

    /// Substitute the rows for `$table_json` in the template.
    ///
    /// Any other `$` sequence is left as is.
    pub fn render(rows: &[ReportRow], template: &str) -> Result<String> {
        tracing::debug!("Rendering {} report rows", rows.len());

        let json = Self::to_json(rows)?;
        if !TABLE_PLACEHOLDER.is_match(template) {
            tracing::warn!("Report template has no $table_json placeholder");
        }

        Ok(TABLE_PLACEHOLDER
            .replace_all(template, NoExpand(&json))
            .into_owned())
    }

    /// Render and write the report to `path`.
    ///
    /// The page is written to a temporary sibling first and then renamed, so
    /// `path` either holds a complete report or does not exist.
    pub fn to_file(rows: &[ReportRow], template: &str, path: &Path) -> Result<()> {
        tracing::debug!("Writing report to: {}", path.display());

        let contents = Self::render(rows, template)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.html".to_string());
        let staging = path.with_file_name(format!(".{}.tmp", file_name));

        fs::write(&staging, contents)
            .and_then(|_| fs::rename(&staging, path))
            .inspect_err(|_| {
                let _ = fs::remove_file(&staging);
            })?;

        tracing::info!(
            "Wrote report with {} rows to {}",
            rows.len(),
            path.display()
        );

        Ok(())
    }
}
