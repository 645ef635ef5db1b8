use super::stats;
use super::{Aggregation, AggregationEntry, Analyzer, ReportRow, Totals};
use crate::{Error, Result};

/// Ranks aggregated paths by total latency and keeps the top `max_records`.
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder {
    max_records: usize,
}

impl ReportBuilder {
    pub fn new(max_records: usize) -> Result<Self> {
        if max_records == 0 {
            return Err(Error::InvalidMaxRecords(
                "report size must be a positive integer, got 0".to_string(),
            ));
        }
        Ok(Self { max_records })
    }

    /// Build from a textual setting such as a config value or CLI argument.
    pub fn from_setting(value: &str) -> Result<Self> {
        let max_records = value.trim().parse::<usize>().map_err(|_| {
            Error::InvalidMaxRecords(format!(
                "report size must be a positive integer, got '{}'",
                value
            ))
        })?;
        Self::new(max_records)
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    fn row(entry: &AggregationEntry, totals: &Totals) -> ReportRow {
        ReportRow {
            key: entry.key.clone(),
            count: entry.count,
            count_share_pct: stats::share_pct(entry.count as f64, totals.total_records as f64),
            latency_sum: entry.latency_sum,
            latency_share_pct: stats::share_pct(entry.latency_sum, totals.total_latency),
            latency_avg: stats::round(stats::mean(&entry.latencies).unwrap_or_default()),
            latency_max: stats::max(&entry.latencies).unwrap_or_default(),
            latency_median: stats::round(stats::median(&entry.latencies).unwrap_or_default()),
        }
    }
}

impl Analyzer for ReportBuilder {
    type Output = Vec<ReportRow>;

    fn analyze(&self, aggregation: &Aggregation) -> Result<Self::Output> {
        tracing::debug!("Building report over {} paths", aggregation.len());

        if aggregation.is_empty() {
            return Err(Error::NothingToReport);
        }

        let totals = aggregation.totals();
        if totals.total_latency == 0.0 {
            tracing::warn!("Total latency is zero, latency shares are reported as 0");
        }

        let mut rows: Vec<ReportRow> = aggregation
            .entries()
            .iter()
            .map(|entry| Self::row(entry, &totals))
            .collect();

        // stable: equal sums keep first-seen order
        rows.sort_by(|a, b| b.latency_sum.total_cmp(&a.latency_sum));
        rows.truncate(self.max_records);

        tracing::info!(
            "Report built: {} of {} paths, {} records, {:.3}s total latency",
            rows.len(),
            aggregation.len(),
            totals.total_records,
            totals.total_latency
        );

        Ok(rows)
    }
}
