//! End-to-End CLI Integration Tests
//!
//! Drives the `lint_cli` library the way the binary does: arguments in,
//! files on disk, printed reports out.

use clap::Parser;
use lint_cli::{collect_sources, exit_code, lint_file, write_reports, Cli, FileReport};
use std::fs;
use std::path::Path;

fn check(args: &[&str]) -> (Vec<FileReport>, String) {
    let cli = Cli::try_parse_from(args).expect("valid arguments");
    let config = cli.load_config().expect("valid config");
    let reports: Vec<FileReport> = collect_sources(&cli.files)
        .expect("sources")
        .iter()
        .map(|path| lint_file(path, &config).expect("readable"))
        .collect();
    let reports = if cli.quiet {
        reports.into_iter().map(FileReport::errors_only).collect()
    } else {
        reports
    };
    let mut out = Vec::new();
    write_reports(&mut out, &reports, cli.format).expect("written");
    (reports, String::from_utf8(out).expect("utf-8"))
}

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.to_str().unwrap().to_string()
}

/// Test: a project directory with a config file
#[test]
fn test_e2e_project_directory() {
    let dir = tempfile::tempdir().unwrap();
    let rc = write(dir.path(), ".jshintrc", r#"{"undef": true, "browser": true}"#);
    write(dir.path(), "app.js", "document.title = \"ok\";\nwindow.alert(title);\n");
    write(dir.path(), "util.js", "var helper = function (a) {\n  return a;\n};\nhelper(1);\n");
    let root = dir.path().to_str().unwrap().to_string();

    let (reports, text) = check(&["corten-lint", "--config", &rc, &root]);
    assert_eq!(reports.len(), 2);
    assert_eq!(exit_code(&reports), 1);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("app.js:2:14: warning [W117] 'title' is not defined."));
}

/// Test: JSON output carries the summary for every file
#[test]
fn test_e2e_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "main.js", "function run(x) {\n  return x * 2;\n}\nrun(1);\n");

    let (reports, text) = check(&["corten-lint", "--format", "json", &script]);
    assert_eq!(exit_code(&reports), 0);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value[0]["diagnostics"].as_array().unwrap().len(), 0);
    assert_eq!(value[0]["summary"]["functions"][0]["name"], "run");
    assert_eq!(value[0]["summary"]["functions"][0]["metrics"]["parameters"], 1);
}

/// Test: --quiet keeps only errors
#[test]
fn test_e2e_quiet() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "main.js", "var a = 1\nvar b = 2 b++;\n");

    let (reports, text) = check(&["corten-lint", "--quiet", &script]);
    assert_eq!(reports[0].report.codes(), vec!["E058"]);
    assert!(text.contains("[E058] Missing \";\" before statement"));
}

/// Test: option and global flags change the findings
#[test]
fn test_e2e_option_flags() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "main.js", "if (ready == true) {\n  start();\n}\n");

    let (reports, _) = check(&["corten-lint", &script]);
    assert_eq!(reports[0].report.codes(), vec!["W041"]);

    let (reports, _) = check(&[
        "corten-lint",
        "-o",
        "undef=true",
        "-g",
        "ready",
        "-g",
        "start",
        &script,
    ]);
    assert_eq!(reports[0].report.codes(), vec!["W041"]);

    let (reports, _) = check(&["corten-lint", "-o", "undef=true", &script]);
    assert_eq!(reports[0].report.codes(), vec!["W041", "W117", "W117"]);
}
