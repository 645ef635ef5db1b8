use super::budget::{ErrorBudget, StreamStats};
use super::record::{Observation, ParseOutcome, RejectReason, parse_line};
use crate::analysis::Aggregation;
use crate::{Error, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

pub struct LogSource;

impl LogSource {
    /// Whether the source is gzip-compressed, judged by its `.gz` suffix.
    pub fn is_compressed(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "gz")
    }

    /// Open a log file for line-by-line reading, decompressing transparently
    pub fn open(path: &Path) -> Result<Box<dyn BufRead>> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::SourceNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        if Self::is_compressed(path) {
            tracing::debug!("Opening gzip log source: {}", path.display());
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
        } else {
            tracing::debug!("Opening plain log source: {}", path.display());
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Lazy sequence of observations read from one log source.
///
/// Lines that fail to decode or parse are counted and skipped. Read or
/// decompression failures are yielded once as `Err`, after which the stream
/// is over. The source is released when the stream is dropped or finished.
pub struct ObservationStream<R> {
    reader: R,
    line: Vec<u8>,
    stats: StreamStats,
    exhausted: bool,
}

impl ObservationStream<Box<dyn BufRead>> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(LogSource::open(path)?))
    }
}

impl<R: BufRead> ObservationStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            stats: StreamStats::default(),
            exhausted: false,
        }
    }

    /// Tallies for the lines traversed so far.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Release the source and apply the error budget to the traversed lines.
    pub fn finish(self, budget: &ErrorBudget) -> Result<StreamStats> {
        let stats = self.stats;
        drop(self);

        tracing::debug!(
            "Stream finished: {} records, {} errors",
            stats.records,
            stats.errors
        );

        budget.check(&stats)?;
        Ok(stats)
    }

    fn classify(&self) -> ParseOutcome {
        match std::str::from_utf8(&self.line) {
            Ok(text) => parse_line(text),
            Err(_) => ParseOutcome::Rejected(RejectReason::InvalidEncoding),
        }
    }
}

impl<R: BufRead> Iterator for ObservationStream<R> {
    type Item = Result<Observation>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => self.exhausted = true,
                Ok(_) => match self.classify() {
                    ParseOutcome::Parsed(observation) => {
                        self.stats.records += 1;
                        return Some(Ok(observation));
                    }
                    ParseOutcome::Rejected(reason) => {
                        self.stats.errors += 1;
                        tracing::trace!("Skipping unparsable line ({:?})", reason);
                    }
                },
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(Error::Io(e)));
                }
            }
        }
        None
    }
}

/// Read a whole log source into an aggregation.
///
/// Nothing is returned when the source fails or the error budget is exceeded.
pub fn ingest(path: &Path, budget: &ErrorBudget) -> Result<(Aggregation, StreamStats)> {
    tracing::debug!("Collecting records from: {}", path.display());

    let mut stream = ObservationStream::open(path)?;
    let mut aggregation = Aggregation::new();
    for observation in stream.by_ref() {
        aggregation.record(observation?);
    }
    let stats = stream.finish(budget)?;

    tracing::info!(
        "Collected {} records ({} unique paths), {} unparsable lines",
        stats.records,
        aggregation.len(),
        stats.errors
    );

    Ok((aggregation, stats))
}
