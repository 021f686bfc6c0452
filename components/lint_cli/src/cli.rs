//! Command-line arguments

use clap::{Parser, ValueEnum};
use linter::Config;
use std::path::PathBuf;

use crate::error::{CliError, CliResult};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `file:line:col: severity [code] message` line per finding
    #[default]
    Text,
    /// A JSON array with one report per file
    Json,
}

/// Static analysis for JavaScript sources
#[derive(Debug, Parser)]
#[command(name = "corten-lint", version, about)]
pub struct Cli {
    /// Files or directories to check; reads standard input when empty
    pub files: Vec<PathBuf>,

    /// JSON configuration file (`.jshintrc` format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Set an option, e.g. `--option undef=true`
    #[arg(short, long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Declare a read-only global; `-NAME` removes a predefined one
    #[arg(short, long = "global", value_name = "NAME", allow_hyphen_values = true)]
    pub globals: Vec<String>,

    /// Re-check files whenever they change
    #[arg(short, long)]
    pub watch: bool,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Build the analysis configuration from the config file and flags.
    ///
    /// Flags override values from the file.
    pub fn load_config(&self) -> CliResult<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
                Config::from_json(&text).map_err(|source| CliError::ConfigFile {
                    path: path.clone(),
                    source,
                })?
            }
            None => Config::default(),
        };
        for assignment in &self.options {
            config.set_assignment(assignment)?;
        }
        config.predef.extend(self.globals.iter().cloned());
        Ok(config)
    }
}
