//! Analysis results
//!
//! A [`LintReport`] holds the diagnostics of a run, fragments included, and
//! a [`Summary`] of what the main run saw. Everything serializes with
//! `serde` so front ends can emit it as JSON unchanged.

use core_types::{Diagnostic, Severity};
use indexmap::IndexMap;
use serde::Serialize;

use crate::parser::Parser;
use crate::scope::{FunctionKind, Metrics, UnusedBinding};

/// Result of analyzing one source.
#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    /// Findings in the order they were reported
    pub diagnostics: Vec<Diagnostic>,
    /// What the analysis learned about the program
    pub summary: Summary,
}

impl LintReport {
    /// Whether no diagnostics were reported
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of error-severity diagnostics
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of diagnostics with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    /// Codes of all diagnostics, in order.
    pub fn codes(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }
}

/// Program-level data collected during the main run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Every function, in the order they were opened
    pub functions: Vec<FunctionSummary>,
    /// Names declared or used at the top level, sorted
    pub globals: Vec<String>,
    /// Names used without a declaration, with the lines they appear on
    pub implieds: Vec<ImpliedGlobal>,
    /// Bindings that were declared and never read
    pub unused: Vec<UnusedBinding>,
    /// How often each property name was used
    pub members: IndexMap<String, u32>,
    /// Whether the input was read as JSON
    pub json: bool,
}

/// One function of the program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSummary {
    /// Declared name, or the quoted name it was assigned to
    pub name: String,
    /// Parameter names
    pub params: Vec<String>,
    /// Line where the function starts
    pub line: u32,
    /// Column where the function starts
    pub character: u32,
    /// Line of the closing brace
    pub last: u32,
    /// Column after the closing brace
    pub last_character: u32,
    /// Size counters
    pub metrics: Metrics,
}

/// A name that was read without being declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpliedGlobal {
    /// The name
    pub name: String,
    /// Lines it was read on
    pub lines: Vec<u32>,
}

impl Summary {
    pub(crate) fn collect(parser: &Parser) -> Summary {
        let functions = parser
            .scope
            .records()
            .iter()
            .filter(|record| record.kind == FunctionKind::Function)
            .map(|record| FunctionSummary {
                name: record.name.clone(),
                params: record.params.clone().unwrap_or_default(),
                line: record.line,
                character: record.character,
                last: record.last,
                last_character: record.last_character,
                metrics: record.metrics.clone(),
            })
            .collect();

        let mut globals: Vec<String> = parser.scope.global_names().cloned().collect();
        globals.sort();

        let implieds = parser
            .scope
            .implied
            .iter()
            .map(|(name, lines)| ImpliedGlobal {
                name: name.clone(),
                lines: lines.clone(),
            })
            .collect();

        Summary {
            functions,
            globals,
            implieds,
            unused: parser.scope.unused.clone(),
            members: parser.members.clone(),
            json: parser.json_mode,
        }
    }
}
