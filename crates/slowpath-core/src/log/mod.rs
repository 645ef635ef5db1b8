mod budget;
mod reader;
mod record;

pub use budget::{ErrorBudget, StreamStats};
pub use reader::{LogSource, ObservationStream, ingest};
pub use record::{Observation, ParseOutcome, RejectReason, parse_line};
