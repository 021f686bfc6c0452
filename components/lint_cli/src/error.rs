//! Error types for the CLI

use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// A source or configuration file could not be read
    #[error("could not read '{path}': {source}")]
    Io {
        /// The file involved
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Writing results failed
    #[error("could not write output: {0}")]
    Output(#[from] std::io::Error),

    /// Configuration file or option flags are invalid
    #[error(transparent)]
    Config(#[from] linter::ConfigError),

    /// A configuration file is not valid JSON
    #[error("invalid configuration file '{path}': {source}")]
    ConfigFile {
        /// The configuration file
        path: PathBuf,
        /// Parse failure
        #[source]
        source: linter::ConfigError,
    },

    /// Results could not be serialized
    #[error("could not serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// A directory could not be walked
    #[error("could not list '{path}': {source}")]
    Walk {
        /// The directory
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: walkdir::Error,
    },

    /// The file watcher failed
    #[error("watch failed: {0}")]
    Watch(#[from] notify::Error),
}

impl CliError {
    /// Wrap an I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
