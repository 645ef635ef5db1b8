use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// nginx `ui_short` layout, anchored at the start of the line.
    static ref LOG_RECORD_PATTERN: Regex = Regex::new(concat!(
        r"^",
        r"\S+ ",                        // remote_addr
        r"\S+\s+",                      // remote_user (may be followed by two spaces)
        r"\S+ ",                        // http_x_real_ip
        r"\[\S+ \S+\] ",                // [time_local]
        r#""\S+ (?P<path>\S+) \S+" "#,  // "METHOD path PROTO"
        r"\d+ ",                        // status
        r"\d+ ",                        // body_bytes_sent
        r#""\S+" "#,                    // http_referer
        r#"".*" "#,                     // http_user_agent
        r#""\S+" "#,                    // http_x_forwarded_for
        r#""\S+" "#,                    // http_X_REQUEST_ID
        r#""\S+" "#,                    // http_X_RB_USER
        r"(?P<latency>\d+\.\d+)",       // request_time
    ))
    .unwrap();
}

/// One (path, latency) pair extracted from a log line.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub key: String,
    pub latency: f64,
}

impl Observation {
    pub fn new(key: impl Into<String>, latency: f64) -> Self {
        Self {
            key: key.into(),
            latency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The line does not follow the expected field layout.
    LayoutMismatch,
    /// The latency field matched but could not be read as a number.
    InvalidLatency,
    /// The raw line is not valid UTF-8.
    InvalidEncoding,
}

/// Outcome of parsing a single line. A rejected line is an expected result,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Observation),
    Rejected(RejectReason),
}

impl ParseOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    pub fn into_observation(self) -> Option<Observation> {
        match self {
            ParseOutcome::Parsed(observation) => Some(observation),
            ParseOutcome::Rejected(_) => None,
        }
    }
}

/// Extract the request path and the trailing request time from one line.
pub fn parse_line(line: &str) -> ParseOutcome {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(caps) = LOG_RECORD_PATTERN.captures(line) else {
        return ParseOutcome::Rejected(RejectReason::LayoutMismatch);
    };

    let latency = match caps["latency"].parse::<f64>() {
        Ok(latency) if latency.is_finite() => latency,
        _ => return ParseOutcome::Rejected(RejectReason::InvalidLatency),
    };

    ParseOutcome::Parsed(Observation::new(&caps["path"], latency))
}
