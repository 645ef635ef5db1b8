use super::{Aggregation, Analyzer, SummaryStats, stats};
use crate::Result;

pub struct SummaryAnalyzer;

impl Analyzer for SummaryAnalyzer {
    type Output = SummaryStats;

    fn analyze(&self, aggregation: &Aggregation) -> Result<Self::Output> {
        tracing::debug!("Computing summary totals");

        let totals = aggregation.totals();
        let slowest_latency = aggregation
            .entries()
            .iter()
            .filter_map(|entry| stats::max(&entry.latencies))
            .reduce(f64::max);

        tracing::info!(
            "Summary complete: {} records across {} paths",
            totals.total_records,
            aggregation.len()
        );

        Ok(SummaryStats {
            totals,
            unique_paths: aggregation.len(),
            slowest_latency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Observation;

    #[test]
    fn test_summary_of_aggregation() {
        let aggregation: Aggregation = [
            Observation::new("/a", 0.2),
            Observation::new("/b", 1.25),
            Observation::new("/a", 0.4),
        ]
        .into_iter()
        .collect();

        let summary = SummaryAnalyzer.analyze(&aggregation).unwrap();
        assert_eq!(summary.totals.total_records, 3);
        assert!((summary.totals.total_latency - 1.85).abs() < 1e-9);
        assert_eq!(summary.unique_paths, 2);
        assert_eq!(summary.slowest_latency, Some(1.25));
    }

    #[test]
    fn test_summary_of_empty_aggregation() {
        let summary = SummaryAnalyzer.analyze(&Aggregation::new()).unwrap();
        assert_eq!(summary.totals.total_records, 0);
        assert_eq!(summary.unique_paths, 0);
        assert_eq!(summary.slowest_latency, None);
    }
}
