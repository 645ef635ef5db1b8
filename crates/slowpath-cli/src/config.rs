use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use slowpath_core::analysis::ReportBuilder;
use slowpath_core::log::ErrorBudget;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file read when `--config` is not given. It is optional.
pub const DEFAULT_CONFIG_PATH: &str = "./config/config.toml";

/// Run settings. Keys missing from the config file keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Maximum number of rows in the report
    #[serde(deserialize_with = "positive_integer")]
    pub report_size: usize,
    pub report_dir: PathBuf,
    /// HTML template with a `$table_json` placeholder; built-in page when unset
    pub report_template: Option<PathBuf>,
    pub log_dir: PathBuf,
    /// Append diagnostics to this file instead of stderr
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    /// Tolerated share of unparsable lines, between 0 and 1
    pub errors_limit: Option<f64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            report_size: 1000,
            report_dir: PathBuf::from("./reports"),
            report_template: None,
            log_dir: PathBuf::from("./log"),
            log_file: None,
            log_level: "info".to_string(),
            errors_limit: None,
        }
    }
}

/// Values given on the command line; each one replaces the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub report_size: Option<usize>,
    pub report_dir: Option<PathBuf>,
    pub report_template: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub errors_limit: Option<f64>,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Invalid config file")?;
        Ok(config)
    }

    /// Load the config file at `path`, or the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !path.is_file() {
            if required {
                bail!("Cannot read config file {}: not found", path.display());
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("In config file {}", path.display()))
    }

    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(report_size) = overrides.report_size {
            self.report_size = report_size;
        }
        if let Some(report_dir) = overrides.report_dir {
            self.report_dir = report_dir;
        }
        if let Some(report_template) = overrides.report_template {
            self.report_template = Some(report_template);
        }
        if let Some(log_dir) = overrides.log_dir {
            self.log_dir = log_dir;
        }
        if let Some(errors_limit) = overrides.errors_limit {
            self.errors_limit = Some(errors_limit);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.report_builder()?;
        self.error_budget()?;
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("Invalid log_level '{}'", self.log_level))?;
        Ok(())
    }

    pub fn report_builder(&self) -> Result<ReportBuilder> {
        Ok(ReportBuilder::new(self.report_size)?)
    }

    pub fn error_budget(&self) -> Result<ErrorBudget> {
        Ok(ErrorBudget::new(self.errors_limit)?)
    }
}

/// Accept the report size as a TOML integer or as a numeric string.
fn positive_integer<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Setting {
        Number(i64),
        Text(String),
    }

    let setting = match Setting::deserialize(deserializer)? {
        Setting::Number(n) => n.to_string(),
        Setting::Text(s) => s,
    };
    ReportBuilder::from_setting(&setting)
        .map(|builder| builder.max_records())
        .map_err(serde::de::Error::custom)
}
