mod aggregate;
mod report;
pub mod stats;
mod summary;

pub use aggregate::{Aggregation, AggregationEntry};
pub use report::ReportBuilder;
pub use summary::SummaryAnalyzer;

use crate::log::StreamStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub stream: StreamStats,
    pub summary: SummaryStats,
    pub rows: Vec<ReportRow>,
}

/// Run-wide denominators for share percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_records: u64,
    pub total_latency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub totals: Totals,
    pub unique_paths: usize,
    pub slowest_latency: Option<f64>,
}

/// One ranked line of the report.
///
/// Serialized field names are the ones the HTML report table reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "url")]
    pub key: String,
    pub count: u64,
    #[serde(rename = "count_perc")]
    pub count_share_pct: f64,
    #[serde(rename = "time_sum")]
    pub latency_sum: f64,
    #[serde(rename = "time_perc")]
    pub latency_share_pct: f64,
    #[serde(rename = "time_avg")]
    pub latency_avg: f64,
    #[serde(rename = "time_max")]
    pub latency_max: f64,
    #[serde(rename = "time_med")]
    pub latency_median: f64,
}

pub trait Analyzer {
    type Output;

    fn analyze(&self, aggregation: &Aggregation) -> crate::Result<Self::Output>;
}
