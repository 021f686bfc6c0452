//! JSON mode
//!
//! A source whose first token is `{` or `[` is checked as a JSON document
//! instead of a program. The scanner switches to its JSON rules at the
//! same time (double quotes only, no `\v`, `\x` or `\'` escapes).

use std::collections::HashSet;

use crate::error::ParseResult;
use crate::lexer::TokenKind;
use crate::messages;
use crate::options::Flags;
use crate::parser::{display, Parser};

impl Parser {
    /// Check one JSON value starting at the next token.
    pub(crate) fn json_value(&mut self) -> ParseResult<()> {
        self.enter()?;
        let result = self.json_value_body();
        self.leave();
        result
    }

    fn json_value_body(&mut self) -> ParseResult<()> {
        match self.next_id() {
            "{" => self.json_object(),
            "[" => self.json_array(),
            "true" | "false" | "null" | "(number)" | "(string)" => self.advance(None),
            "-" => {
                self.advance(Some("-"))?;
                if self.token.character != self.next.from {
                    self.warn_token(&messages::UNEXPECTED_SPACE_AFTER, &["-"])?;
                }
                self.advance(Some("(number)"))
            }
            _ => self.warn_next(&messages::EXPECTED_JSON_VALUE, &[]),
        }
    }

    fn json_object(&mut self) -> ParseResult<()> {
        let opener_line = self.next.line.to_string();
        self.advance(Some("{"))?;
        let mut keys: HashSet<String> = HashSet::new();
        if self.next_id() != "}" {
            loop {
                if self.next.kind == TokenKind::End {
                    self.warn_next(&messages::JSON_UNCLOSED, &["}", "{", &opener_line])?;
                    break;
                }
                if self.next_id() == "}" {
                    self.warn_token(&messages::COMMA_OPERATOR, &[])?;
                    break;
                }
                if self.next_id() == "," {
                    self.warn_next(&messages::COMMA_OPERATOR, &[])?;
                } else if self.next.kind != TokenKind::String {
                    let saw = display(&self.next);
                    self.warn_next(&messages::JSON_EXPECTED_STRING, &[&saw])?;
                }

                let key = display(&self.next);
                let unsafe_key = (key == "__proto__" && !self.options.has(Flags::PROTO))
                    || (key == "__iterator__" && !self.options.has(Flags::ITERATOR));
                if keys.contains(&key) {
                    self.warn_next(&messages::DUPLICATE_KEY, &[&key])?;
                } else if unsafe_key {
                    self.warn_next(&messages::UNSAFE_KEY, &[&key])?;
                } else {
                    keys.insert(key);
                }
                self.advance(None)?;
                self.advance(Some(":"))?;
                self.json_value()?;
                if self.next_id() != "," {
                    break;
                }
                self.advance(Some(","))?;
            }
        }
        self.advance(Some("}"))
    }

    fn json_array(&mut self) -> ParseResult<()> {
        let opener_line = self.next.line.to_string();
        self.advance(Some("["))?;
        if self.next_id() != "]" {
            loop {
                if self.next.kind == TokenKind::End {
                    self.warn_next(&messages::JSON_UNCLOSED, &["]", "[", &opener_line])?;
                    break;
                }
                if self.next_id() == "]" {
                    self.warn_token(&messages::COMMA_OPERATOR, &[])?;
                    break;
                }
                if self.next_id() == "," {
                    self.warn_next(&messages::COMMA_OPERATOR, &[])?;
                }
                self.json_value()?;
                if self.next_id() != "," {
                    break;
                }
                self.advance(Some(","))?;
            }
        }
        self.advance(Some("]"))
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::DiagnosticSink;
    use crate::environments::Globals;
    use crate::lexer;
    use crate::options::Options;
    use crate::parser::Parser;
    use core_types::Diagnostic;

    fn check(source: &str) -> (bool, Vec<Diagnostic>) {
        let mut parser = Parser::new(
            lexer::split_lines(source),
            Options::default(),
            Globals::standard(),
            DiagnosticSink::default(),
        );
        parser.run().expect("run completes");
        (parser.json_mode, parser.sink.into_diagnostics())
    }

    fn codes(source: &str) -> Vec<String> {
        check(source).1.into_iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_valid_document() {
        let (json, diags) = check("{\n  \"a\": [1, -2, true, null],\n  \"b\": {\"c\": \"d\"}\n}");
        assert!(json);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_program_is_not_json() {
        let (json, _) = check("var a = 1;");
        assert!(!json);
    }

    #[test]
    fn test_duplicate_and_unsafe_keys() {
        assert_eq!(codes("{\"a\": 1, \"a\": 2}"), vec!["W012"]);
        assert_eq!(codes("{\"__proto__\": 1}"), vec!["W013"]);
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(codes("[1, 2,]"), vec!["W094"]);
        assert_eq!(codes("{\"a\": 1,}"), vec!["W094"]);
    }

    #[test]
    fn test_unquoted_key() {
        let (_, diags) = check("{a: 1}");
        assert_eq!(diags[0].code, "E052");
        assert_eq!(diags[0].message, "Expected a string and instead saw a.");
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(codes("[1, }]")[0], "E003");
    }

    #[test]
    fn test_space_after_minus() {
        assert_eq!(codes("[- 1]"), vec!["W023"]);
    }

    #[test]
    fn test_unclosed_array() {
        let diags = codes("[1,\n2,");
        assert!(diags.contains(&"E051".to_string()));
    }
}
