//! Checking files and printing results

use core_types::Severity;
use linter::{lint, Config, LintReport, MAIN_SCOPE};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

/// Name shown for source read from standard input.
pub const STDIN_NAME: &str = "<stdin>";

/// The report for one checked file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Path as given or discovered
    pub file: String,
    /// Analysis result
    #[serde(flatten)]
    pub report: LintReport,
}

impl FileReport {
    /// Drop everything below error severity.
    pub fn errors_only(mut self) -> Self {
        self.report
            .diagnostics
            .retain(|d| d.severity == Severity::Error);
        self
    }
}

/// Expand the given paths into the `.js` files to check.
///
/// Files are kept as given whatever their extension; directories are
/// walked recursively in name order.
pub fn collect_sources(paths: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for path in paths {
        if !path.is_dir() {
            sources.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|source| CliError::Walk {
                path: path.clone(),
                source,
            })?;
            if entry.file_type().is_file() && is_script(entry.path()) {
                sources.push(entry.path().to_path_buf());
            }
        }
    }
    debug!(count = sources.len(), "sources collected");
    Ok(sources)
}

/// Whether `path` names a JavaScript source.
pub fn is_script(path: &Path) -> bool {
    path.extension().map(|ext| ext == "js").unwrap_or(false)
}

/// Check one file.
pub fn lint_file(path: &Path, config: &Config) -> CliResult<FileReport> {
    let source = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    info!(file = %path.display(), "checking");
    Ok(FileReport {
        file: path.display().to_string(),
        report: lint(&source, config),
    })
}

/// Check every file in `paths`.
///
/// A file that cannot be read is skipped; its error is returned alongside
/// the reports of the files that were checked.
pub fn lint_files(paths: &[PathBuf], config: &Config) -> (Vec<FileReport>, Vec<CliError>) {
    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for path in paths {
        match lint_file(path, config) {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping file");
                failures.push(e);
            }
        }
    }
    (reports, failures)
}

/// Check source read from `input`.
pub fn lint_reader(mut input: impl Read, config: &Config) -> CliResult<FileReport> {
    let mut source = String::new();
    input
        .read_to_string(&mut source)
        .map_err(|e| CliError::io(STDIN_NAME, e))?;
    Ok(FileReport {
        file: STDIN_NAME.to_string(),
        report: lint(&source, config),
    })
}

/// Print `reports` in the requested format.
pub fn write_reports(out: &mut impl Write, reports: &[FileReport], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => {
            for file in reports {
                for diag in &file.report.diagnostics {
                    if diag.scope == MAIN_SCOPE {
                        writeln!(out, "{}:{}", file.file, diag)?;
                    } else {
                        writeln!(out, "{}:{} (in {})", file.file, diag, diag.scope)?;
                    }
                }
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, reports)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Process exit code for a finished check: 0 when every report is clean,
/// 1 otherwise.
pub fn exit_code(reports: &[FileReport]) -> i32 {
    if reports.iter().all(|file| file.report.is_clean()) {
        0
    } else {
        1
    }
}
