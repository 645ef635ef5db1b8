use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use slowpath_cli::OutputFormat;
use slowpath_cli::commands;
use slowpath_cli::config::{AppConfig, ConfigOverrides};
use slowpath_cli::logging::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slowpath")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Rank the slowest endpoints in an nginx access log",
    long_about = "slowpath reads an nginx access log (plain or gzip), groups request times by \
                  URL path and renders a ranked HTML report of the most expensive endpoints."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format for console output (pretty, json, table)
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the HTML report for the most recent log in the log directory
    Report {
        /// Path to the TOML config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Directory holding nginx-access-ui.log-YYYYMMDD[.gz] files
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Directory the report is written to
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Maximum number of paths in the report
        #[arg(long)]
        report_size: Option<usize>,

        /// Abort when the share of unparsable lines exceeds this fraction
        #[arg(long)]
        errors_limit: Option<f64>,

        /// HTML template with a $table_json placeholder
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
    },

    /// Print the slowest paths of a single log file
    Analyze {
        /// Path to the access log (plain or .gz)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of paths to show
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Abort when the share of unparsable lines exceeds this fraction
        #[arg(long)]
        errors_limit: Option<f64>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            config,
            log_dir,
            report_dir,
            report_size,
            errors_limit,
            template,
        } => {
            let config = AppConfig::load(config.as_deref())?.merge(ConfigOverrides {
                report_size,
                report_dir,
                report_template: template,
                log_dir,
                errors_limit,
            });
            config.validate()?;

            init_logging(cli.verbose, &config.log_level, config.log_file.as_deref())?;
            tracing::debug!("Running with {:?}", config);

            commands::report::execute(&config).inspect_err(|e| {
                if config.log_file.is_some() {
                    tracing::error!("Report run failed: {:#}", e);
                }
            })
        }
        Commands::Analyze {
            file,
            top,
            errors_limit,
        } => {
            init_logging(cli.verbose, "info", None)?;
            commands::analyze::execute(&file, top, errors_limit, cli.format)
        }
        Commands::Completion { shell } => {
            init_logging(cli.verbose, "warn", None)?;
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}
