//! Exit code tests for the `corten-lint` binary

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

fn corten_lint() -> Command {
    Command::new(env!("CARGO_BIN_EXE_corten-lint"))
}

/// Clean input exits with 0
#[test]
fn binary_clean_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ok.js");
    fs::write(&path, "var a = 1;\na++;\n").unwrap();

    let output = corten_lint().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

/// Findings exit with 1 and are printed to stdout
#[test]
fn binary_findings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.js");
    fs::write(&path, "var a = 1;\n").unwrap();

    let output = corten_lint().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("bad.js:1:5: info [W098]"));
}

/// Missing files and bad flags exit with 2
#[test]
fn binary_failures() {
    let output = corten_lint().arg("/nonexistent/missing.js").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8(output.stderr).unwrap().starts_with("corten-lint: "));

    let output = corten_lint().arg("--format").arg("xml").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

/// An unreadable file is reported and the other files are still checked
#[test]
fn binary_continues_past_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.js");
    fs::write(&good, "var a = 1;\n").unwrap();
    let missing = dir.path().join("missing.js");

    let output = corten_lint().arg(&missing).arg(&good).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8(output.stderr).unwrap().contains("missing.js"));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("good.js:1:5: info [W098]"));
}

/// Source can come from standard input
#[test]
fn binary_reads_stdin() {
    let mut child = corten_lint()
        .arg("--format")
        .arg("json")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"x = 1;\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["file"], "<stdin>");
}
