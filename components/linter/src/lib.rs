//! JavaScript static analyzer
//!
//! A single-pass checker in the JSHint tradition: the scanner feeds a
//! precedence parser that checks each construct as soon as it is read,
//! tracks scopes as it goes and writes classified findings to a sink.
//! No syntax tree outlives the statement being parsed.
//!
//! # Overview
//!
//! - [`lint`] / [`lint_lines`] - Analyze source text with a [`Config`]
//! - [`LintReport`] - Diagnostics plus a [`Summary`] of the program
//! - [`Config`] - `.jshintrc` style options, globals and ignored codes
//! - [`Parser`] - One analysis run, for callers that drive it directly
//! - [`messages`] - Every message the analyzer can raise, by code
//!
//! Comments such as `/*jshint undef:true */` or `/*global app*/` in the
//! source adjust the options from that point on.
//!
//! # Example
//!
//! ```
//! use linter::{lint, Config, Severity};
//!
//! let config = Config::from_json(r#"{ "undef": true }"#).unwrap();
//! let report = lint("function f() {\n  return missing;\n}\nf();", &config);
//!
//! assert_eq!(report.diagnostics.len(), 1);
//! assert_eq!(report.diagnostics[0].code, "W117");
//! assert_eq!(report.diagnostics[0].severity, Severity::Warning);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod environments;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod linter;
pub mod messages;
pub mod options;
pub mod parser;
pub mod pattern;
pub mod report;
pub mod scope;

mod directives;
mod expressions;
mod json;
mod statements;

pub use core_types::{Diagnostic, Severity, SourcePosition};
pub use diagnostics::{DiagnosticSink, MAIN_SCOPE};
pub use environments::Globals;
pub use error::{Abort, ConfigError, ParseResult};
pub use lexer::{Lexer, Token, TokenKind};
pub use linter::{lint, lint_lines, MAX_FRAGMENT_DEPTH};
pub use messages::Message;
pub use options::{Config, Flags, Limit, OptionValue, Options, QuotMark};
pub use parser::{Fragment, Parser};
pub use report::{FunctionSummary, ImpliedGlobal, LintReport, Summary};
pub use scope::{Binding, Metrics, UnusedBinding};
