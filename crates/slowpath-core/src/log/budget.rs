use crate::{Error, Result};
use serde::Serialize;

/// Line tallies collected while traversing a log source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Lines that produced an observation.
    pub records: u64,
    /// Lines that failed to decode or parse.
    pub errors: u64,
}

impl StreamStats {
    pub fn lines(&self) -> u64 {
        self.records + self.errors
    }

    /// Share of traversed lines that failed, in `[0, 1]`.
    pub fn error_ratio(&self) -> f64 {
        if self.lines() == 0 {
            return 0.0;
        }
        self.errors as f64 / self.lines() as f64
    }
}

/// Upper bound on the share of unparsable lines a run tolerates.
///
/// A budget without a limit (or with a limit of zero) never fails a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorBudget {
    limit: Option<f64>,
}

impl ErrorBudget {
    pub fn new(limit: Option<f64>) -> Result<Self> {
        if let Some(limit) = limit
            && !(limit.is_finite() && (0.0..=1.0).contains(&limit))
        {
            return Err(Error::InvalidErrorLimit(format!(
                "expected a fraction between 0 and 1, got {}",
                limit
            )));
        }
        Ok(Self { limit })
    }

    pub fn unlimited() -> Self {
        Self { limit: None }
    }

    pub fn limit(&self) -> Option<f64> {
        self.limit.filter(|limit| *limit > 0.0)
    }

    /// Fail when at least one record was parsed and the error ratio is above
    /// the limit.
    pub fn check(&self, stats: &StreamStats) -> Result<()> {
        let Some(limit) = self.limit() else {
            return Ok(());
        };

        let ratio = stats.error_ratio();
        if stats.records > 0 && ratio > limit {
            return Err(Error::ErrorBudgetExceeded {
                records: stats.records,
                errors: stats.errors,
                ratio,
                limit,
            });
        }

        Ok(())
    }
}
