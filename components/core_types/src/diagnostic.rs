//! Diagnostic types shared by the analyzer and its front ends.
//!
//! A [`Diagnostic`] is one classified finding. Diagnostics are produced in
//! source order by the analyzer and never mutated afterwards.

use crate::SourcePosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is.
///
/// Ordered so that `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Stylistic note
    Info,
    /// Suspicious construct
    Warning,
    /// Code that is broken or cannot be analyzed further
    Error,
}

impl Severity {
    /// Lowercase name used in text output
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classified finding.
///
/// # Examples
///
/// ```
/// use core_types::{Diagnostic, Severity, SourcePosition};
///
/// let diag = Diagnostic {
///     severity: Severity::Warning,
///     code: "W117".to_string(),
///     message: "'foo' is not defined.".to_string(),
///     template: "'{0}' is not defined.".to_string(),
///     position: SourcePosition::new(3, 9),
///     scope: "(main)".to_string(),
/// };
///
/// assert_eq!(diag.to_string(), "3:9: warning [W117] 'foo' is not defined.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity class
    pub severity: Severity,
    /// Stable rule code, usable for allow/deny lists
    pub code: String,
    /// Message with its placeholders filled in
    pub message: String,
    /// Message template before interpolation
    pub template: String,
    /// Where the finding was raised
    pub position: SourcePosition,
    /// Analysis scope: `(main)` or the call that carried a nested fragment
    pub scope: String,
}

impl Diagnostic {
    /// Line of the finding
    pub fn line(&self) -> u32 {
        self.position.line
    }

    /// Column of the finding
    pub fn column(&self) -> u32 {
        self.position.column
    }

    /// Whether this diagnostic is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.position, self.severity, self.code, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(severity: Severity) -> Diagnostic {
        Diagnostic {
            severity,
            code: "W033".to_string(),
            message: "Missing semicolon.".to_string(),
            template: "Missing semicolon.".to_string(),
            position: SourcePosition::new(1, 10),
            scope: "(main)".to_string(),
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_diagnostic_accessors() {
        let diag = sample(Severity::Error);
        assert_eq!(diag.line(), 1);
        assert_eq!(diag.column(), 10);
        assert!(diag.is_error());
        assert!(!sample(Severity::Info).is_error());
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_diagnostic_json_shape() {
        let value = serde_json::to_value(sample(Severity::Info)).unwrap();
        assert_eq!(value["code"], "W033");
        assert_eq!(value["position"]["line"], 1);
        assert_eq!(value["severity"], "info");
    }
}
