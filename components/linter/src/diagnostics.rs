//! Diagnostics sink
//!
//! Collects findings in the order they are raised and decides when a run
//! has produced enough of them to stop.

use core_types::{Diagnostic, Severity, SourcePosition};
use std::collections::HashSet;

use crate::error::{Abort, ParseResult};
use crate::messages::{self, Message};
use crate::options::Ceiling;

/// Scope name of the top-level analysis.
pub const MAIN_SCOPE: &str = "(main)";

/// Append-only store of diagnostics with a termination threshold.
#[derive(Debug, Clone)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    counted: u32,
    ignored: HashSet<String>,
    scope: String,
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        DiagnosticSink::new(std::iter::empty::<String>())
    }
}

impl DiagnosticSink {
    /// Create a sink that drops the given rule codes.
    pub fn new<I, S>(ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DiagnosticSink {
            diagnostics: Vec::new(),
            counted: 0,
            ignored: ignored.into_iter().map(Into::into).collect(),
            scope: MAIN_SCOPE.to_string(),
        }
    }

    /// Start attributing findings to another analysis scope.
    ///
    /// The ceiling counts per scope, so a nested fragment gets its own
    /// allowance.
    pub fn enter_scope(&mut self, scope: &str) {
        self.scope = scope.to_string();
        self.counted = 0;
    }

    /// Record a finding.
    ///
    /// Returns `Err` when the run has to stop: right away under `passfail`,
    /// or once the number of findings in this scope reaches the ceiling.
    pub fn report(
        &mut self,
        message: &Message,
        severity: Severity,
        position: SourcePosition,
        args: &[&str],
        ceiling: Ceiling,
    ) -> ParseResult<()> {
        if self.ignored.contains(message.code) || messages::is_suppressed(message.template) {
            return Ok(());
        }
        self.diagnostics.push(Diagnostic {
            severity,
            code: message.code.to_string(),
            message: message.format(args),
            template: message.template.to_string(),
            position,
            scope: self.scope.clone(),
        });
        self.counted += 1;

        if ceiling.stop_on_first {
            return Err(Abort::Stopping(position));
        }
        if self.counted >= ceiling.max {
            return Err(Abort::TooManyErrors(position));
        }
        Ok(())
    }

    /// Append the terminal diagnostic for an aborted run.
    pub fn terminate(&mut self, abort: Abort, percent_scanned: u32) {
        let message = abort.message();
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            code: message.code.to_string(),
            message: format!("{} ({}% scanned).", message.template, percent_scanned),
            template: message.template.to_string(),
            position: abort.position(),
            scope: self.scope.clone(),
        });
    }

    /// Findings so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of findings so far
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take the findings out of the sink
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ceiling(max: u32) -> Ceiling {
        Ceiling {
            max,
            stop_on_first: false,
        }
    }

    #[test]
    fn test_report_and_interpolate() {
        let mut sink = DiagnosticSink::default();
        sink.report(
            &messages::NOT_DEFINED,
            Severity::Warning,
            SourcePosition::new(2, 5),
            &["foo"],
            ceiling(50),
        )
        .unwrap();
        let diag = &sink.diagnostics()[0];
        assert_eq!(diag.message, "'foo' is not defined.");
        assert_eq!(diag.code, "W117");
        assert_eq!(diag.scope, MAIN_SCOPE);
    }

    #[test]
    fn test_ceiling_terminates() {
        let mut sink = DiagnosticSink::default();
        let pos = SourcePosition::new(1, 1);
        assert!(sink
            .report(&messages::EMPTY_BLOCK, Severity::Warning, pos, &[], ceiling(2))
            .is_ok());
        let result = sink.report(&messages::EMPTY_BLOCK, Severity::Warning, pos, &[], ceiling(2));
        assert_eq!(result, Err(Abort::TooManyErrors(pos)));
        sink.terminate(Abort::TooManyErrors(pos), 40);
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.diagnostics()[2].message, "Too many errors. (40% scanned).");
    }

    #[test]
    fn test_passfail_stops_at_first() {
        let mut sink = DiagnosticSink::default();
        let pos = SourcePosition::new(3, 1);
        let result = sink.report(
            &messages::DEBUGGER,
            Severity::Warning,
            pos,
            &[],
            Ceiling {
                max: 50,
                stop_on_first: true,
            },
        );
        assert_eq!(result, Err(Abort::Stopping(pos)));
    }

    #[test]
    fn test_ignored_codes_are_not_counted() {
        let mut sink = DiagnosticSink::new(["W035"]);
        let pos = SourcePosition::new(1, 1);
        for _ in 0..5 {
            sink.report(&messages::EMPTY_BLOCK, Severity::Warning, pos, &[], ceiling(2))
                .unwrap();
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_suppressed_findings_are_dropped() {
        let mut sink = DiagnosticSink::default();
        let pos = SourcePosition::new(3, 16);
        for _ in 0..3 {
            sink.report(&messages::MISSING_USE_STRICT, Severity::Warning, pos, &[], ceiling(2))
                .unwrap();
        }
        sink.report(&messages::BAD_FOR_IN_VARIABLE, Severity::Warning, pos, &["k"], ceiling(2))
            .unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_enter_scope_resets_count() {
        let mut sink = DiagnosticSink::default();
        let pos = SourcePosition::new(1, 1);
        sink.report(&messages::EMPTY_BLOCK, Severity::Warning, pos, &[], ceiling(2))
            .unwrap();
        sink.enter_scope("setTimeout");
        sink.report(&messages::EMPTY_BLOCK, Severity::Warning, pos, &[], ceiling(2))
            .unwrap();
        assert_eq!(sink.diagnostics()[1].scope, "setTimeout");
    }
}
