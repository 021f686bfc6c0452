//! Error types for the analyzer
//!
//! [`Abort`] is the only way a run ends early; it travels up through every
//! parse function as the `Err` side of [`ParseResult`]. [`ConfigError`]
//! covers configuration that cannot be turned into options at all.

use core_types::SourcePosition;
use thiserror::Error;

use crate::messages::{self, Message};

/// Why a run terminated before reaching the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Abort {
    /// The diagnostic ceiling (`maxerr`) was reached
    #[error("too many errors at {0}")]
    TooManyErrors(SourcePosition),
    /// `passfail` is set and a diagnostic was raised
    #[error("stopped at first diagnostic at {0}")]
    Stopping(SourcePosition),
    /// Input nests deeper than the analyzer is willing to recurse
    #[error("nesting too deep at {0}")]
    NestingTooDeep(SourcePosition),
}

impl Abort {
    /// Where the run stopped
    pub fn position(&self) -> SourcePosition {
        match self {
            Abort::TooManyErrors(pos) | Abort::Stopping(pos) | Abort::NestingTooDeep(pos) => *pos,
        }
    }

    /// The terminal message appended to the diagnostic list
    pub fn message(&self) -> &'static Message {
        match self {
            Abort::TooManyErrors(_) => &messages::TOO_MANY_ERRORS,
            Abort::Stopping(_) => &messages::STOPPING,
            Abort::NestingTooDeep(_) => &messages::NESTING_TOO_DEEP,
        }
    }
}

/// Result type threaded through the scanner and parser
pub type ParseResult<T> = Result<T, Abort>;

/// Configuration that cannot be applied
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON or has the wrong shape
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A `key=value` pair given on the command line is malformed
    #[error("invalid option assignment '{0}', expected KEY=VALUE")]
    Assignment(String),
}
