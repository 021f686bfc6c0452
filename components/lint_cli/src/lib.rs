//! Command-line front end for the Corten JavaScript linter
//!
//! Collects sources from files, directories or standard input, runs
//! [`linter::lint`] over each one and prints the findings as text or JSON.
//!
//! # Example
//!
//! ```
//! use lint_cli::{lint_reader, write_reports, OutputFormat};
//! use linter::Config;
//!
//! let report = lint_reader("var unused;".as_bytes(), &Config::default()).unwrap();
//! let mut out = Vec::new();
//! write_reports(&mut out, &[report], OutputFormat::Text).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("[W098]"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod runner;
pub mod watch;

pub use cli::{Cli, OutputFormat};
pub use error::{CliError, CliResult};
pub use runner::{
    collect_sources, exit_code, lint_file, lint_files, lint_reader, write_reports, FileReport,
};
