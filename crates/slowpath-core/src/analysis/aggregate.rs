use super::Totals;
use crate::log::Observation;
use std::collections::HashMap;

/// Running statistics for one request path.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationEntry {
    pub key: String,
    pub count: u64,
    pub latency_sum: f64,
    /// Every observed latency, kept for the exact median.
    pub latencies: Vec<f64>,
}

impl AggregationEntry {
    fn new(key: String, latency: f64) -> Self {
        Self {
            key,
            count: 1,
            latency_sum: latency,
            latencies: vec![latency],
        }
    }

    fn push(&mut self, latency: f64) {
        self.count += 1;
        self.latency_sum += latency;
        self.latencies.push(latency);
    }
}

/// Path -> statistics mapping, iterated in first-seen order.
///
/// Memory grows with the number of observations since raw latencies are
/// retained until the report is built.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    entries: Vec<AggregationEntry>,
    index: HashMap<String, usize>,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, observation: Observation) {
        let Observation { key, latency } = observation;

        match self.index.get(&key) {
            Some(&position) => self.entries[position].push(latency),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(AggregationEntry::new(key, latency));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&AggregationEntry> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    pub fn entries(&self) -> &[AggregationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn totals(&self) -> Totals {
        self.entries.iter().fold(Totals::default(), |acc, entry| Totals {
            total_records: acc.total_records + entry.count,
            total_latency: acc.total_latency + entry.latency_sum,
        })
    }
}

impl Extend<Observation> for Aggregation {
    fn extend<I: IntoIterator<Item = Observation>>(&mut self, iter: I) {
        for observation in iter {
            self.record(observation);
        }
    }
}

impl FromIterator<Observation> for Aggregation {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        let mut aggregation = Self::new();
        aggregation.extend(iter);
        aggregation
    }
}
