use flate2::Compression;
use flate2::write::GzEncoder;
use slowpath_cli::commands::report::{RunOutcome, run};
use slowpath_cli::config::AppConfig;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LINE_A1: &str = r#"1.1.1.1 - - [29/Jun/2017:03:50:25 +0300] "GET /a HTTP/1.1" 200 1 "-" "-" "-" "-" "-" 0.200"#;
const LINE_A2: &str = r#"1.1.1.1 - - [29/Jun/2017:03:50:26 +0300] "GET /a HTTP/1.1" 200 1 "-" "-" "-" "-" "-" 0.400"#;
const LINE_B: &str = r#"1.1.1.1 - - [29/Jun/2017:03:50:27 +0300] "GET /b HTTP/1.1" 200 1 "-" "-" "-" "-" "-" 0.100"#;
const BROKEN: &str = r#"1.1.1.1 - - [29/Jun/2017:03:50:28 +0300] 200 1 "-" "-" "-" "-" "-" 0.300"#;

/// Temporary log and report directories plus a config pointing at them
struct Workspace {
    _dir: TempDir,
    log_dir: PathBuf,
    report_dir: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("log");
        let report_dir = dir.path().join("reports");
        fs::create_dir_all(&log_dir).unwrap();
        Self {
            _dir: dir,
            log_dir,
            report_dir,
        }
    }

    fn config(&self) -> AppConfig {
        AppConfig {
            log_dir: self.log_dir.clone(),
            report_dir: self.report_dir.clone(),
            ..Default::default()
        }
    }

    fn write_log(&self, name: &str, lines: &[&str]) -> PathBuf {
        let path = self.log_dir.join(name);
        fs::write(&path, join(lines)).unwrap();
        path
    }

    fn write_gz_log(&self, name: &str, lines: &[&str]) -> PathBuf {
        let path = self.log_dir.join(name);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(join(lines).as_bytes()).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();
        path
    }
}

fn join(lines: &[&str]) -> String {
    lines.iter().map(|l| format!("{}\n", l)).collect()
}

fn embedded_rows(report: &Path) -> Vec<serde_json::Value> {
    let html = fs::read_to_string(report).unwrap();
    let start = html.find("var table = ").unwrap() + "var table = ".len();
    let end = start + html[start..].find(";\n").unwrap();
    serde_json::from_str(&html[start..end]).unwrap()
}

/// Test that a run writes the dated report with ranked rows
#[test]
fn test_report_written_for_latest_log() {
    // Arrange
    let ws = Workspace::new();
    ws.write_log("nginx-access-ui.log-20170629", &[LINE_B]);
    ws.write_log("nginx-access-ui.log-20170630", &[LINE_A1, LINE_A2, LINE_B]);

    // Act
    let outcome = run(&ws.config()).unwrap();

    // Assert
    let expected = ws.report_dir.join("report-2017.06.30.html");
    assert_eq!(outcome, RunOutcome::Written(expected.clone()));

    let rows = embedded_rows(&expected);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["url"], "/a");
    assert_eq!(rows[0]["count"], 2);
    assert_eq!(rows[0]["count_perc"], 66.66667);
    assert_eq!(rows[0]["time_perc"], 85.71429);
    assert_eq!(rows[0]["time_med"], 0.3);
    assert_eq!(rows[1]["url"], "/b");
    assert_eq!(rows[1]["time_perc"], 14.28571);
}

/// Test that report_size bounds the rows in the artifact
#[test]
fn test_report_size_truncates() {
    let ws = Workspace::new();
    ws.write_log("nginx-access-ui.log-20170630", &[LINE_A1, LINE_A2, LINE_B]);

    let config = AppConfig {
        report_size: 1,
        ..ws.config()
    };
    let RunOutcome::Written(path) = run(&config).unwrap() else {
        panic!("report should be written");
    };

    let rows = embedded_rows(&path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["url"], "/a");
}

/// Test that gzip logs are picked up and decompressed
#[test]
fn test_report_from_gzip_log() {
    let ws = Workspace::new();
    ws.write_log("nginx-access-ui.log-20170630", &[LINE_B]);
    ws.write_gz_log("nginx-access-ui.log-20170701.gz", &[LINE_A1, LINE_B, LINE_A2]);

    let outcome = run(&ws.config()).unwrap();

    let expected = ws.report_dir.join("report-2017.07.01.html");
    assert_eq!(outcome, RunOutcome::Written(expected.clone()));
    assert_eq!(embedded_rows(&expected).len(), 2);
}

/// Test that an existing report short-circuits the run
#[test]
fn test_existing_report_is_not_rebuilt() {
    let ws = Workspace::new();
    ws.write_log("nginx-access-ui.log-20170630", &[LINE_A1]);
    fs::create_dir_all(&ws.report_dir).unwrap();
    let existing = ws.report_dir.join("report-2017.06.30.html");
    fs::write(&existing, "previous run").unwrap();

    let outcome = run(&ws.config()).unwrap();

    assert_eq!(outcome, RunOutcome::UpToDate(existing.clone()));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "previous run");
}

/// Test that an empty or missing log directory is not an error
#[test]
fn test_no_logs() {
    let ws = Workspace::new();
    assert_eq!(run(&ws.config()).unwrap(), RunOutcome::NoLogs);

    let config = AppConfig {
        log_dir: ws.log_dir.join("missing"),
        ..ws.config()
    };
    assert_eq!(run(&config).unwrap(), RunOutcome::NoLogs);
}

/// Test that exceeding the error budget aborts without an artifact
#[test]
fn test_error_budget_exceeded_writes_nothing() {
    let ws = Workspace::new();
    ws.write_log("nginx-access-ui.log-20170630", &[LINE_A1, BROKEN]);

    let strict = AppConfig {
        errors_limit: Some(0.4),
        ..ws.config()
    };
    let result = run(&strict);
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("Error limit exceeded"));
    assert!(!ws.report_dir.join("report-2017.06.30.html").exists());

    let lenient = AppConfig {
        errors_limit: Some(0.5),
        ..ws.config()
    };
    assert!(matches!(run(&lenient).unwrap(), RunOutcome::Written(_)));
}

/// Test that a log without parsable lines produces no report
#[test]
fn test_nothing_to_report() {
    let ws = Workspace::new();
    let log = ws.write_log("nginx-access-ui.log-20170630", &[BROKEN, BROKEN]);

    let outcome = run(&ws.config()).unwrap();

    assert_eq!(outcome, RunOutcome::NothingToReport(log));
    assert!(!ws.report_dir.join("report-2017.06.30.html").exists());
}

/// Test that a custom template is used for the artifact
#[test]
fn test_custom_template() {
    let ws = Workspace::new();
    ws.write_log("nginx-access-ui.log-20170630", &[LINE_B]);
    let template = ws.log_dir.join("tpl.html");
    fs::write(&template, "<pre>${table_json}</pre>").unwrap();

    let config = AppConfig {
        report_template: Some(template),
        ..ws.config()
    };
    let RunOutcome::Written(path) = run(&config).unwrap() else {
        panic!("report should be written");
    };

    let html = fs::read_to_string(path).unwrap();
    assert!(html.starts_with("<pre>[{\"url\":\"/b\""));
    assert!(html.ends_with("}]</pre>"));
}

/// Test that a missing template fails before the log is read
#[test]
fn test_missing_template_is_fatal() {
    let ws = Workspace::new();
    ws.write_log("nginx-access-ui.log-20170630", &[LINE_B]);

    let config = AppConfig {
        report_template: Some(ws.log_dir.join("absent.html")),
        ..ws.config()
    };
    let result = run(&config);
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("Cannot read report template"));
}
