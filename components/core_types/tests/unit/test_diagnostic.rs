//! Unit tests for Diagnostic and Severity

use core_types::{Diagnostic, Severity, SourcePosition};

fn diagnostic(severity: Severity, code: &str, line: u32, column: u32) -> Diagnostic {
    Diagnostic {
        severity,
        code: code.to_string(),
        message: format!("message for {}", code),
        template: format!("message for {}", code),
        position: SourcePosition::new(line, column),
        scope: "(main)".to_string(),
    }
}

#[cfg(test)]
mod severity_tests {
    use super::*;

    #[test]
    fn test_severity_names() {
        assert_eq!(Severity::Info.as_str(), "info");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
    }

    #[test]
    fn test_severity_max_picks_error() {
        let worst = [Severity::Info, Severity::Error, Severity::Warning]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::Error));
    }

    #[test]
    fn test_severity_deserializes_lowercase() {
        let severity: Severity = serde_json::from_str("\"info\"").unwrap();
        assert_eq!(severity, Severity::Info);
        assert!(serde_json::from_str::<Severity>("\"Info\"").is_err());
    }
}

#[cfg(test)]
mod diagnostic_tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = diagnostic(Severity::Error, "E019", 7, 3);
        assert_eq!(diag.to_string(), "7:3: error [E019] message for E019");
    }

    #[test]
    fn test_detached_diagnostic_display() {
        let mut diag = diagnostic(Severity::Error, "E001", 0, 0);
        diag.position = SourcePosition::detached();
        assert!(diag.to_string().starts_with("0:0: error [E001]"));
    }

    #[test]
    fn test_diagnostic_roundtrip_preserves_scope() {
        let mut diag = diagnostic(Severity::Warning, "W061", 2, 1);
        diag.scope = "eval".to_string();
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
        assert_eq!(back.scope, "eval");
    }

    #[test]
    fn test_diagnostics_filter_by_severity() {
        let all = vec![
            diagnostic(Severity::Info, "W098", 1, 5),
            diagnostic(Severity::Error, "E020", 2, 1),
            diagnostic(Severity::Warning, "W117", 3, 9),
        ];
        let errors: Vec<_> = all.iter().filter(|d| d.is_error()).map(|d| d.code.as_str()).collect();
        assert_eq!(errors, vec!["E020"]);
    }
}
