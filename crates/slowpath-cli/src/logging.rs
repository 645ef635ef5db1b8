use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter directives for our crates at `level`.
fn directives(level: &str) -> String {
    format!("slowpath={level},slowpath_cli={level},slowpath_core={level}")
}

/// Build the event filter: `RUST_LOG` wins, then `--verbose`, then the
/// configured level.
pub fn env_filter(verbose: bool, level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = if verbose {
        "debug".to_string()
    } else {
        tracing::Level::from_str(level)
            .map(|level| level.as_str().to_lowercase())
            .unwrap_or_else(|_| "info".to_string())
    };
    EnvFilter::new(directives(&level))
}

/// Install the global subscriber, writing to `log_file` (appending) or stderr.
pub fn init_logging(verbose: bool, level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = env_filter(verbose, level);

    let installed = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Cannot create log directory {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Cannot install logger: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_cover_all_crates() {
        let d = directives("warn");
        assert!(d.contains("slowpath=warn"));
        assert!(d.contains("slowpath_cli=warn"));
        assert!(d.contains("slowpath_core=warn"));
    }
}
