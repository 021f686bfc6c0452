//! Analysis driver
//!
//! Turns a [`Config`] into run options, runs the parser over the source and
//! then over every string handed to an evaluating call, and assembles the
//! [`LintReport`].

use core_types::SourcePosition;
use tracing::{debug, trace};

use crate::diagnostics::DiagnosticSink;
use crate::environments::{self, Globals};
use crate::error::ParseResult;
use crate::lexer;
use crate::messages::{self, Message};
use crate::options::{Config, OptionIssue, Options};
use crate::parser::{Fragment, Parser};
use crate::report::{LintReport, Summary};

/// How deep fragments found inside fragments are followed.
pub const MAX_FRAGMENT_DEPTH: u32 = 4;

/// Analyze `source` with `config`.
///
/// ```
/// use linter::{lint, Config};
///
/// let report = lint("var x = 1;", &Config::default());
/// assert_eq!(report.diagnostics.len(), 1);
/// assert_eq!(report.diagnostics[0].message, "'x' is defined but never used.");
/// ```
pub fn lint(source: &str, config: &Config) -> LintReport {
    if source.is_empty() {
        return empty_input(&messages::EMPTY_INPUT, config);
    }
    analyze(lexer::split_lines(source), config)
}

/// Analyze source given as a list of lines.
pub fn lint_lines<S: AsRef<str>>(lines: &[S], config: &Config) -> LintReport {
    if lines.is_empty() {
        return empty_input(&messages::EMPTY_INPUT_LINES, config);
    }
    let lines = lines
        .iter()
        .flat_map(|line| lexer::split_lines(line.as_ref()))
        .collect();
    analyze(lines, config)
}

fn empty_input(message: &Message, config: &Config) -> LintReport {
    let mut sink = DiagnosticSink::new(config.ignore.iter().cloned());
    let ceiling = Options::default().ceiling();
    // A single finding never reaches the default ceiling.
    let _ = sink.report(message, message.severity, SourcePosition::detached(), &[], ceiling);
    LintReport {
        diagnostics: sink.into_diagnostics(),
        summary: Summary::default(),
    }
}

/// Build run options and globals from `config`, reporting bad entries.
fn configure(config: &Config, sink: &mut DiagnosticSink) -> ParseResult<(Options, Globals)> {
    let mut options = Options::default();
    let mut globals = Globals::standard();

    for (name, value) in &config.options {
        let issue = match options.apply(name, value) {
            Ok(()) => continue,
            Err(issue) => issue,
        };
        let at = SourcePosition::detached();
        let ceiling = options.ceiling();
        match issue {
            OptionIssue::UnknownName => sink.report(
                &messages::BAD_OPTION,
                messages::BAD_OPTION.severity,
                at,
                &[name.as_str()],
                ceiling,
            )?,
            OptionIssue::BadValue => sink.report(
                &messages::BAD_OPTION_VALUE,
                messages::BAD_OPTION_VALUE.severity,
                at,
                &[],
                ceiling,
            )?,
            OptionIssue::NotSmallInteger(seen) => sink.report(
                &messages::EXPECTED_SMALL_INTEGER,
                messages::EXPECTED_SMALL_INTEGER.severity,
                at,
                &[&seen],
                ceiling,
            )?,
        }
    }

    for (name, writable) in config.predef_entries() {
        globals.declare(&name, writable);
    }
    environments::assume(&mut options, &mut globals);
    Ok((options, globals))
}

fn analyze(lines: Vec<String>, config: &Config) -> LintReport {
    debug!(lines = lines.len(), "lint run started");
    let mut sink = DiagnosticSink::new(config.ignore.iter().cloned());
    let (options, globals) = match configure(config, &mut sink) {
        Ok(configured) => configured,
        Err(abort) => {
            sink.terminate(abort, 0);
            return LintReport {
                diagnostics: sink.into_diagnostics(),
                summary: Summary::default(),
            };
        }
    };

    let mut main = Parser::new(lines, options.clone(), globals.clone(), sink);
    let finished = run_to_end(&mut main);
    let summary = Summary::collect(&main);
    let mut sink = std::mem::take(&mut main.sink);

    if finished {
        let mut work: Vec<(Fragment, u32)> =
            main.fragments.drain(..).rev().map(|fragment| (fragment, 1)).collect();
        while let Some((fragment, depth)) = work.pop() {
            debug!(scope = %fragment.scope, depth, "analyzing fragment");
            sink.enter_scope(&fragment.scope);
            let mut nested = Parser::new(
                lexer::split_lines(&fragment.source),
                options.clone(),
                globals.clone(),
                sink,
            );
            let nested_finished = run_to_end(&mut nested);
            if nested_finished && depth < MAX_FRAGMENT_DEPTH {
                work.extend(nested.fragments.drain(..).rev().map(|inner| (inner, depth + 1)));
            } else if !nested.fragments.is_empty() {
                trace!(dropped = nested.fragments.len(), "fragments not followed");
            }
            sink = std::mem::take(&mut nested.sink);
        }
    }

    let diagnostics = sink.into_diagnostics();
    debug!(diagnostics = diagnostics.len(), "lint run finished");
    LintReport { diagnostics, summary }
}

/// Run `parser` over its whole input; an abort is turned into the
/// terminal diagnostic. Returns whether the run reached the end.
fn run_to_end(parser: &mut Parser) -> bool {
    match parser.run() {
        Ok(()) => true,
        Err(abort) => {
            let percent = parser.percent_scanned();
            debug!(code = abort.message().code, percent, "run terminated");
            parser.sink.terminate(abort, percent);
            false
        }
    }
}
