//! Watch mode
//!
//! Re-checks a source every time it changes on disk. Each check reads
//! and analyzes the entire file again.

use linter::Config;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::runner::{is_script, lint_file, write_reports};

/// How long to wait for more events before re-checking.
pub const DEBOUNCE: Duration = Duration::from_millis(150);

/// Sources touched by a file system event.
pub fn changed_sources(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => event
            .paths
            .iter()
            .filter(|path| is_script(path))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Watch `roots` and print a fresh report for every changed source.
///
/// Returns when the watcher shuts down.
pub fn watch(
    roots: &[PathBuf],
    config: &Config,
    format: OutputFormat,
    quiet: bool,
    out: &mut impl Write,
) -> CliResult<()> {
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx)?;
    for root in roots {
        let mode = if root.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(root, mode)?;
        debug!(path = %root.display(), "watching");
    }

    while let Ok(first) = rx.recv() {
        let mut changed = BTreeSet::new();
        let mut pending = Some(first);
        while let Some(result) = pending.take() {
            match result {
                Ok(event) => changed.extend(changed_sources(&event)),
                Err(e) => warn!(error = %e, "watch event failed"),
            }
            pending = rx.recv_timeout(DEBOUNCE).ok();
        }
        for path in changed {
            recheck(&path, config, format, quiet, out)?;
        }
    }
    Ok(())
}

fn recheck(
    path: &Path,
    config: &Config,
    format: OutputFormat,
    quiet: bool,
    out: &mut impl Write,
) -> CliResult<()> {
    if !path.is_file() {
        return Ok(());
    }
    let report = match lint_file(path, config) {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "skipping changed file");
            return Ok(());
        }
    };
    let report = if quiet { report.errors_only() } else { report };
    write_reports(out, &[report], format)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn test_only_script_changes_count() {
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("src/app.js"))
            .add_path(PathBuf::from("README.md"));
        assert_eq!(changed_sources(&event), vec![PathBuf::from("src/app.js")]);

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("new.js"));
        assert_eq!(changed_sources(&created), vec![PathBuf::from("new.js")]);
    }

    #[test]
    fn test_removals_are_ignored() {
        let event = Event::new(EventKind::Remove(RemoveKind::File)).add_path(PathBuf::from("gone.js"));
        assert!(changed_sources(&event).is_empty());
    }

    #[test]
    fn test_recheck_prints_fresh_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.js");
        std::fs::write(&path, "var x = 1;").unwrap();

        let mut out = Vec::new();
        recheck(&path, &Config::default(), OutputFormat::Text, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with(":1:5: info [W098] 'x' is defined but never used.\n"));

        let mut out = Vec::new();
        recheck(&path, &Config::default(), OutputFormat::Text, true, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
