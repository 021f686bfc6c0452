//! Pattern literal scanner
//!
//! Walks the body of a `/.../flags` literal after its opening slash. The
//! walk never fails: suspicious constructs become findings and scanning
//! carries on, so the lexer can always hand a token to the parser.

use crate::messages::{self, Message};

/// Options that change how patterns are judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternOptions {
    /// Tolerate an unescaped `-` at the edge of a character class
    pub regexdash: bool,
    /// Report `.` as insecure
    pub regexp: bool,
}

/// A finding raised while scanning a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFinding {
    /// What was found
    pub message: &'static Message,
    /// Offset from the opening slash, in characters
    pub offset: usize,
    /// Template arguments
    pub args: Vec<String>,
}

/// Result of scanning a pattern literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternLiteral {
    /// Pattern body without slashes or flags
    pub body: String,
    /// Flag suffix
    pub flags: String,
    /// Characters consumed after the opening slash
    pub consumed: usize,
    /// Whether the closing slash was found on this line
    pub terminated: bool,
    /// Findings in scan order
    pub findings: Vec<PatternFinding>,
}

struct Scanner<'a> {
    chars: &'a [char],
    options: PatternOptions,
    findings: Vec<PatternFinding>,
}

impl<'a> Scanner<'a> {
    fn at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn report(&mut self, message: &'static Message, offset: usize, args: &[&str]) {
        self.findings.push(PatternFinding {
            message,
            offset,
            args: args.iter().map(|a| a.to_string()).collect(),
        });
    }

    fn is_digit_at(&self, index: usize) -> bool {
        self.at(index).map_or(false, |c| c.is_ascii_digit())
    }

    fn number_at(&self, l: &mut usize) -> u64 {
        let mut value: u64 = 0;
        while let Some(d) = self.at(*l).and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(d as u64);
            *l += 1;
        }
        value
    }

    /// Escape inside or outside a class; `l` points past the backslash.
    fn escape(&mut self, l: &mut usize) -> Option<char> {
        let c = self.at(*l);
        if let Some(ch) = c {
            if (ch as u32) < 0x20 {
                self.report(&messages::REGEXP_CONTROL_CHARACTER, *l, &[]);
            }
        }
        *l += 1;
        c
    }

    fn class(&mut self, l: &mut usize) {
        if self.at(*l) == Some('^') {
            *l += 1;
            if self.at(*l) == Some(']') {
                self.report(&messages::REGEXP_UNESCAPED, *l, &["^"]);
            }
        }
        if self.at(*l) == Some(']') {
            self.report(&messages::REGEXP_EMPTY_CLASS, *l, &[]);
        }
        let first = *l;
        let mut is_literal = false;
        let mut is_in_range = false;

        loop {
            let c = self.at(*l);
            *l += 1;
            match c {
                None => break,
                Some(']') => {
                    if is_in_range && !self.options.regexdash {
                        self.report(&messages::REGEXP_UNESCAPED, *l - 1, &["-"]);
                    }
                    break;
                }
                Some(ch @ ('[' | '^')) => {
                    self.report(&messages::REGEXP_UNESCAPED, *l, &[&ch.to_string()]);
                    toggle(&mut is_literal, &mut is_in_range);
                }
                Some('-') => {
                    if is_literal && !is_in_range {
                        is_literal = false;
                        is_in_range = true;
                    } else if is_in_range {
                        is_in_range = false;
                    } else if self.at(*l) == Some(']') {
                        is_in_range = true;
                    } else {
                        let at_edge = *l == first + 1;
                        if self.options.regexdash != at_edge {
                            self.report(&messages::REGEXP_UNESCAPED, *l - 1, &["-"]);
                        }
                        is_literal = true;
                    }
                }
                Some('\\') => {
                    let escaped = self.escape(l);
                    if matches!(escaped, Some('w' | 'W' | 's' | 'S' | 'd' | 'D')) {
                        if is_in_range {
                            self.report(&messages::REGEXP_UNESCAPED, *l, &["-"]);
                            is_in_range = false;
                        }
                        is_literal = false;
                    } else {
                        toggle(&mut is_literal, &mut is_in_range);
                    }
                }
                Some('/') => {
                    self.report(&messages::REGEXP_UNESCAPED, *l - 1, &["/"]);
                    toggle(&mut is_literal, &mut is_in_range);
                }
                Some(_) => toggle(&mut is_literal, &mut is_in_range),
            }
        }
    }

    fn quantifier(&mut self, l: &mut usize) {
        match self.at(*l) {
            Some('?' | '+' | '*') => {
                *l += 1;
                if self.at(*l) == Some('?') {
                    *l += 1;
                }
            }
            Some('{') => {
                *l += 1;
                if !self.is_digit_at(*l) {
                    let seen = self.at(*l).map(String::from).unwrap_or_default();
                    self.report(&messages::EXPECTED_NUMBER, *l, &[&seen]);
                    return;
                }
                let low = self.number_at(l);
                let mut high = Some(low);
                if self.at(*l) == Some(',') {
                    *l += 1;
                    high = if self.is_digit_at(*l) {
                        Some(self.number_at(l))
                    } else {
                        None
                    };
                }
                if self.at(*l) == Some('}') {
                    *l += 1;
                } else {
                    let seen = self.at(*l).map(String::from).unwrap_or_default();
                    self.report(&messages::EXPECTED_STYLE, *l, &["}", &seen]);
                }
                if self.at(*l) == Some('?') {
                    *l += 1;
                }
                if let Some(high) = high {
                    if low > high {
                        let (low, high) = (low.to_string(), high.to_string());
                        self.report(&messages::BOUND_ORDER, *l, &[&low, &high]);
                    }
                }
            }
            _ => {}
        }
    }
}

fn toggle(is_literal: &mut bool, is_in_range: &mut bool) {
    if *is_in_range {
        *is_in_range = false;
    } else {
        *is_literal = true;
    }
}

/// Scan a pattern literal. `chars` starts right after the opening slash and
/// runs to the end of the physical line.
pub fn scan(chars: &[char], options: PatternOptions) -> PatternLiteral {
    let mut scanner = Scanner {
        chars,
        options,
        findings: Vec::new(),
    };
    let mut depth: usize = 0;
    let mut l = 0;

    loop {
        let mut quantifiable = true;
        let c = scanner.at(l);
        l += 1;
        match c {
            None => {
                return PatternLiteral {
                    body: chars.iter().collect(),
                    flags: String::new(),
                    consumed: chars.len(),
                    terminated: false,
                    findings: scanner.findings,
                };
            }
            Some('/') => {
                if depth > 0 {
                    scanner.report(&messages::UNTERMINATED_GROUPS, l, &[&depth.to_string()]);
                }
                let body: String = chars[..l - 1].iter().collect();
                let mut flags = String::new();
                while let Some(flag @ ('g' | 'i' | 'm')) = scanner.at(l) {
                    if flags.contains(flag) {
                        break;
                    }
                    flags.push(flag);
                    l += 1;
                }
                if matches!(scanner.at(l), Some('/' | '*')) {
                    scanner.report(&messages::REGEXP_CONFUSING, 0, &[]);
                }
                return PatternLiteral {
                    body,
                    flags,
                    consumed: l,
                    terminated: true,
                    findings: scanner.findings,
                };
            }
            Some('\\') => {
                scanner.escape(&mut l);
            }
            Some('(') => {
                depth += 1;
                quantifiable = false;
                if scanner.at(l) == Some('?') {
                    l += 1;
                    match scanner.at(l) {
                        Some(':' | '=' | '!') => l += 1,
                        other => {
                            let seen = other.map(String::from).unwrap_or_default();
                            scanner.report(&messages::EXPECTED_STYLE, l, &[":", &seen]);
                        }
                    }
                }
            }
            Some('|') => quantifiable = false,
            Some(')') => {
                if depth == 0 {
                    scanner.report(&messages::REGEXP_UNESCAPED, l, &[")"]);
                } else {
                    depth -= 1;
                }
            }
            Some(' ') => {
                let mut count = 1;
                while scanner.at(l) == Some(' ') {
                    l += 1;
                    count += 1;
                }
                if count > 1 {
                    scanner.report(&messages::REGEXP_SPACES, l, &[&count.to_string()]);
                }
            }
            Some('[') => scanner.class(&mut l),
            Some('.') => {
                if options.regexp {
                    scanner.report(&messages::REGEXP_INSECURE, l, &["."]);
                }
            }
            Some(ch @ (']' | '?' | '{' | '}' | '+' | '*')) => {
                scanner.report(&messages::REGEXP_UNESCAPED, l, &[&ch.to_string()]);
            }
            Some(_) => {}
        }
        if quantifiable {
            scanner.quantifier(&mut l);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> PatternLiteral {
        let chars: Vec<char> = source.chars().collect();
        scan(&chars, PatternOptions::default())
    }

    fn codes(literal: &PatternLiteral) -> Vec<&'static str> {
        literal.findings.iter().map(|f| f.message.code).collect()
    }

    #[test]
    fn test_simple_pattern() {
        let literal = run("ab+c/gi;");
        assert!(literal.terminated);
        assert_eq!(literal.body, "ab+c");
        assert_eq!(literal.flags, "gi");
        assert_eq!(literal.consumed, 7);
        assert!(literal.findings.is_empty());
    }

    #[test]
    fn test_repeated_flag_stops_flags() {
        let literal = run("a/gg");
        assert_eq!(literal.flags, "g");
        assert_eq!(literal.consumed, 3);
    }

    #[test]
    fn test_unterminated() {
        let literal = run("abc");
        assert!(!literal.terminated);
        assert_eq!(literal.consumed, 3);
    }

    #[test]
    fn test_unterminated_group() {
        let literal = run("(ab/");
        assert_eq!(codes(&literal), vec!["E037"]);
        assert_eq!(literal.findings[0].args, vec!["1".to_string()]);
    }

    #[test]
    fn test_unescaped_paren() {
        let literal = run("a)/");
        assert_eq!(codes(&literal), vec!["W131"]);
    }

    #[test]
    fn test_spaces_are_hard_to_count() {
        let literal = run("a   b/");
        assert_eq!(codes(&literal), vec!["W132"]);
        assert_eq!(literal.findings[0].args, vec!["3".to_string()]);
    }

    #[test]
    fn test_empty_class() {
        let literal = run("[]/");
        assert_eq!(codes(&literal), vec!["W133"]);
    }

    #[test]
    fn test_class_with_ranges_is_clean() {
        let literal = run("[a-z0-9_]+/");
        assert!(literal.findings.is_empty(), "{:?}", literal.findings);
    }

    #[test]
    fn test_range_ending_in_class_escape() {
        let literal = run("[a-\\w]/");
        assert_eq!(codes(&literal), vec!["W131"]);
    }

    #[test]
    fn test_leading_dash_with_regexdash() {
        let chars: Vec<char> = "[-a]/".chars().collect();
        let literal = scan(
            &chars,
            PatternOptions {
                regexdash: true,
                regexp: false,
            },
        );
        assert!(literal.findings.is_empty());
        let literal = run("[-a]/");
        assert_eq!(codes(&literal), vec!["W131"]);
    }

    #[test]
    fn test_insecure_dot() {
        let chars: Vec<char> = "a.b/".chars().collect();
        let literal = scan(
            &chars,
            PatternOptions {
                regexdash: false,
                regexp: true,
            },
        );
        assert_eq!(codes(&literal), vec!["W134"]);
        assert!(run("a.b/").findings.is_empty());
    }

    #[test]
    fn test_bounds() {
        assert!(run("a{2,5}/").findings.is_empty());
        assert!(run("a{2,}/").findings.is_empty());
        assert_eq!(codes(&run("a{5,2}/")), vec!["W136"]);
        assert_eq!(codes(&run("a{x}/")), vec!["W135", "W131"]);
    }

    #[test]
    fn test_lookahead_groups() {
        assert!(run("(?:a)(?=b)(?!c)/").findings.is_empty());
        assert_eq!(codes(&run("(?<a)/")), vec!["W116"]);
    }

    #[test]
    fn test_confusing_suffix() {
        assert_eq!(codes(&run("a/*")), vec!["W130"]);
    }

    #[test]
    fn test_escaped_slash_does_not_terminate() {
        let literal = run("a\\/b/");
        assert_eq!(literal.body, "a\\/b");
        assert!(literal.terminated);
    }
}
