use crate::OutputFormat;
use anyhow::Result;
use slowpath_core::Error;
use slowpath_core::analysis::{AnalysisReport, Analyzer, ReportBuilder, SummaryAnalyzer};
use slowpath_core::log::{ErrorBudget, ingest};
use std::path::Path;

/// Run the pipeline over one log file and return the top `top` rows
pub fn analyze_log(file: &Path, top: usize, errors_limit: Option<f64>) -> Result<AnalysisReport> {
    tracing::debug!("Analyzing log file: {}", file.display());

    let builder = ReportBuilder::new(top)?;
    let budget = ErrorBudget::new(errors_limit)?;

    let (aggregation, stream) = ingest(file, &budget)?;
    let summary = SummaryAnalyzer.analyze(&aggregation)?;

    let rows = match builder.analyze(&aggregation) {
        Ok(rows) => rows,
        Err(Error::NothingToReport) => {
            tracing::warn!("No records parsed from {}", file.display());
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(AnalysisReport {
        stream,
        summary,
        rows,
    })
}

pub fn execute(
    file: &Path,
    top: usize,
    errors_limit: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Analyzing log file: {}", file.display());

    let report = analyze_log(file, top, errors_limit)?;

    tracing::debug!("Writing {} rows as {}", report.rows.len(), format.as_str());
    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report)?,
        OutputFormat::Pretty => output_pretty(&report)?,
    }

    Ok(())
}

fn output_pretty(report: &AnalysisReport) -> Result<()> {
    use console::style;

    println!("\n{}", style("Access Log Latency Report").bold().cyan());
    println!("{}", style("=========================").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  Records:            {}", report.stream.records);
    println!("  Unparsable Lines:   {}", report.stream.errors);
    println!("  Unique Paths:       {}", report.summary.unique_paths);
    println!(
        "  Total Latency:      {:.3} s",
        report.summary.totals.total_latency
    );
    if let Some(slowest) = report.summary.slowest_latency {
        println!("  Slowest Request:    {:.3} s", slowest);
    }

    if !report.rows.is_empty() {
        println!("\n{}", style("Slowest Paths:").bold());
        for (i, row) in report.rows.iter().enumerate() {
            println!(
                "  {}. [{:.3} s, {:.2}%] x{} avg {:.3} med {:.3} max {:.3} - {}",
                i + 1,
                row.latency_sum,
                row.latency_share_pct,
                row.count,
                row.latency_avg,
                row.latency_median,
                row.latency_max,
                row.key
            );
        }
    }

    println!();
    Ok(())
}

fn output_json(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &AnalysisReport) -> Result<()> {
    println!("url,count,count_perc,time_sum,time_perc,time_avg,time_max,time_med");
    for row in &report.rows {
        println!(
            "{},{},{},{},{},{},{},{}",
            csv_field(&row.key),
            row.count,
            row.count_share_pct,
            row.latency_sum,
            row.latency_share_pct,
            row.latency_avg,
            row.latency_max,
            row.latency_median
        );
    }
    Ok(())
}

/// Quote a field when it holds a separator or a quote.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
