//! Full Pipeline Integration Tests
//!
//! Source text through scanner, parser, scope resolver and sink to the
//! final report, using only the public `linter` API.

use core_types::{Severity, SourcePosition};
use linter::{lint, messages, Config};

fn config(json: &str) -> Config {
    Config::from_json(json).expect("valid config")
}

fn codes(source: &str, cfg: &Config) -> Vec<String> {
    lint(source, cfg).diagnostics.into_iter().map(|d| d.code).collect()
}

/// Test: a realistic module passes with a strict configuration
#[test]
fn test_pipeline_clean_module() {
    let source = r#"/*global module*/
(function () {
    "use strict";

    function counter(start) {
        var value = start;
        return {
            next: function () {
                value += 1;
                return value;
            },
            reset: function () {
                value = start;
            }
        };
    }

    module.exports = counter;
}());
"#;
    let cfg = config(r#"{"undef": true, "eqeqeq": true, "curly": true}"#);
    let report = lint(source, &cfg);
    assert!(report.is_clean(), "{:?}", report.diagnostics);
    assert_eq!(report.summary.functions.len(), 4);
    assert_eq!(report.summary.functions[1].name, "counter");
    assert_eq!(report.summary.functions[1].params, vec!["start".to_string()]);
}

/// Test: strict mode turns on undefined-name checks inside the function
#[test]
fn test_pipeline_function_strict_mode() {
    let source = "function f() {\n  \"use strict\";\n  return undeclared;\n}\nf();";
    let report = lint(source, &Config::default());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].code, "W117");
    assert_eq!(report.diagnostics[0].position, SourcePosition::new(3, 10));
}

/// Test: top-level "use strict" needs globalstrict
#[test]
fn test_pipeline_global_strict() {
    let source = "\"use strict\";\nvar a = 1;\na++;";
    assert_eq!(codes(source, &Config::default()), vec!["W097"]);
    assert!(codes(source, &config(r#"{"globalstrict": true}"#)).is_empty());
}

/// Test: pattern literal findings surface through the report
#[test]
fn test_pipeline_pattern_literal() {
    let report = lint("var re = /(ab/;\nre.test(\"ab\");", &Config::default());
    let diag = &report.diagnostics[0];
    assert_eq!(diag.code, "E037");
    assert_eq!(diag.message, "1 unterminated regular expression group(s).");
    assert_eq!(diag.severity, Severity::Error);
}

/// Test: the message table and report codes agree
#[test]
fn test_pipeline_message_lookup() {
    let report = lint("var x = 1;", &Config::default());
    let message = messages::by_code(&report.diagnostics[0].code).expect("known code");
    assert_eq!(message.template, report.diagnostics[0].template);
}

/// Test: strings passed to eval are analyzed under the call name
#[test]
fn test_pipeline_eval_fragment() {
    let report = lint("setTimeout(\"var t = 1;\", 10);", &Config::default());
    let scoped: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.scope == "setTimeout")
        .map(|d| d.code.as_str())
        .collect();
    assert_eq!(scoped, vec!["W098"]);
}

/// Test: metrics limits are reported against the function
#[test]
fn test_pipeline_metric_limits() {
    let source = "function f(a, b, c) {\n  if (a) {\n    if (b) {\n      return c;\n    }\n  }\n}\nf(1, 2, 3);";
    let found = codes(source, &config(r#"{"maxparams": 2, "maxdepth": 1}"#));
    assert_eq!(found, vec!["W072", "W073"]);

    let report = lint(source, &Config::default());
    let metrics = &report.summary.functions[0].metrics;
    assert_eq!(metrics.parameters, 3);
    assert_eq!(metrics.complexity, 3);
    assert_eq!(metrics.max_depth, 2);
}

/// Test: JSON documents are validated as JSON
#[test]
fn test_pipeline_json_document() {
    let report = lint("{\n  \"a\": 1,\n  \"a\": 2\n}", &Config::default());
    assert!(report.summary.json);
    assert_eq!(report.codes(), vec!["W012"]);
}

/// Test: a diagnostic ceiling leaves exactly ceiling + 1 findings
#[test]
fn test_pipeline_ceiling() {
    let source = (0..10).map(|i| format!("v{};", i)).collect::<Vec<_>>().join("\n");
    for ceiling in [1u32, 3, 7] {
        let cfg = config(&format!("{{\"maxerr\": {}}}", ceiling));
        let report = lint(&source, &cfg);
        assert_eq!(report.diagnostics.len(), ceiling as usize + 1);
        assert_eq!(report.diagnostics.last().unwrap().code, "E043");
    }
}
