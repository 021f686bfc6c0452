//! Scanner
//!
//! Turns source lines into [`Token`]s on demand. The scanner works one
//! physical line at a time: every line is checked for layout problems when
//! it is entered, and a lexeme that cannot be finished on its line is
//! reported and cut off there so the parser always gets a token back.
//!
//! Literals are validated while they are scanned. Strings are decoded,
//! numbers checked for ambiguous forms and pattern literals handed to the
//! [`pattern`](crate::pattern) state machine.

use core_types::SourcePosition;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::DiagnosticSink;
use crate::error::ParseResult;
use crate::messages::{self, Message};
use crate::options::{Flags, Limit, Options, QuotMark};
use crate::pattern::{self, PatternOptions};

static MIXED_TABS: Lazy<Regex> = Lazy::new(|| Regex::new(r" \t|\t [^*]").unwrap());
static SMART_TABS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(//)? \t").unwrap());
pub(crate) static SCRIPT_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:javascript|jscript|ecmascript|vbscript|mocha|livescript)\s*:").unwrap()
});

/// Words after which a slash opens a pattern literal.
const OPERATOR_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "case",
    "in",
    "instanceof",
    "new",
    "delete",
    "void",
    "throw",
    "else",
    "do",
];

/// Which directive comment a token opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveTag {
    /// `/*jshint`
    Options,
    /// `/*jslint`
    LegacyOptions,
    /// `/*global` or `/*globals`
    Globals,
    /// `/*members` or `/*member`
    Members,
    /// `*/` outside of any comment
    Close,
}

impl DirectiveTag {
    fn from_word(word: &str) -> Option<DirectiveTag> {
        match word {
            "jshint" => Some(DirectiveTag::Options),
            "jslint" => Some(DirectiveTag::LegacyOptions),
            "global" | "globals" => Some(DirectiveTag::Globals),
            "members" | "member" => Some(DirectiveTag::Members),
            _ => None,
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Names and keywords
    Identifier,
    /// Numeric literal
    Number,
    /// String literal
    String,
    /// Pattern literal
    RegExp,
    /// Operators and separators
    Punctuator,
    /// Directive comment opener or a stray `*/`
    Directive(DirectiveTag),
    /// End of input
    End,
}

/// A scanned token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of lexeme this is
    pub kind: TokenKind,
    /// Source text of the lexeme
    pub text: String,
    /// Decoded value of string and pattern literals
    pub value: Option<String>,
    /// Line number, starting at 1
    pub line: u32,
    /// Column of the first character, starting at 1
    pub from: u32,
    /// Column just past the last character
    pub character: u32,
    /// Whether a slash right after this token opens a pattern literal
    pub regex_allowed: bool,
}

impl Token {
    /// The end-of-input token at the given place
    pub fn end(line: u32, character: u32) -> Self {
        Token {
            kind: TokenKind::End,
            text: String::new(),
            value: None,
            line,
            from: character,
            character,
            regex_allowed: true,
        }
    }

    /// Whether this is an identifier spelled `word`
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == word
    }

    /// Whether this is the punctuator `text`
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuator && self.text == text
    }

    /// Start of the token
    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.from)
    }
}

fn opens_pattern_after(kind: TokenKind, text: &str) -> bool {
    match kind {
        TokenKind::Identifier => OPERATOR_KEYWORDS.contains(&text),
        TokenKind::Number | TokenKind::String | TokenKind::RegExp => false,
        TokenKind::Punctuator => !matches!(text, ")" | "]" | "++" | "--"),
        TokenKind::Directive(_) | TokenKind::End => true,
    }
}

/// What the scanner needs from the rest of the run for one call.
pub struct ScanContext<'a> {
    /// Live options
    pub options: &'a Options,
    /// Where findings go
    pub sink: &'a mut DiagnosticSink,
    /// Whether strict mode is in effect at this point
    pub strict: bool,
    /// Whether the input is being read as JSON
    pub json: bool,
}

impl<'a> ScanContext<'a> {
    fn warn(&mut self, message: &Message, line: u32, column: u32, args: &[&str]) -> ParseResult<()> {
        self.sink.report(
            message,
            message.severity,
            SourcePosition::new(line, column),
            args,
            self.options.ceiling(),
        )
    }

    fn has(&self, flag: Flags) -> bool {
        self.options.has(flag)
    }
}

/// Split source text into physical lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(String::from)
        .collect()
}

fn is_unsafe_char(c: char) -> bool {
    matches!(c,
        '\u{0000}'..='\u{0008}' | '\u{000a}'..='\u{001f}' | '\u{007f}'..='\u{009f}' |
        '\u{00ad}' | '\u{0600}'..='\u{0604}' | '\u{070f}' | '\u{17b4}' | '\u{17b5}' |
        '\u{200c}'..='\u{200f}' | '\u{2028}'..='\u{202f}' | '\u{2060}'..='\u{206f}' |
        '\u{feff}' | '\u{fff0}'..='\u{ffff}')
}

fn is_space(c: char) -> bool {
    c <= ' ' || c.is_whitespace() || c == '\u{feff}'
}

/// Whether `ch` can start a name
pub fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

/// Whether `ch` can continue a name
pub fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphanumeric() || ch == '\u{200c}' || ch == '\u{200d}'
}

/// Line-oriented scanner.
#[derive(Debug)]
pub struct Lexer {
    lines: Vec<String>,
    /// Number of the line held in `chars`, 0 before the first one
    line: usize,
    chars: Vec<char>,
    pos: usize,
    regex_allowed: bool,
    prev: String,
    first_quote: Option<char>,
}

impl Lexer {
    /// Create a scanner over physical lines. A `#!` first line is blanked.
    pub fn new(mut lines: Vec<String>) -> Self {
        if let Some(first) = lines.first_mut() {
            if first.starts_with("#!") {
                first.clear();
            }
        }
        Lexer {
            lines,
            line: 0,
            chars: Vec::new(),
            pos: 0,
            regex_allowed: true,
            prev: String::new(),
            first_quote: None,
        }
    }

    /// Enter the first line. Must be called once before [`Lexer::next_token`].
    pub fn start(&mut self, cx: &mut ScanContext<'_>) -> ParseResult<()> {
        self.next_line(cx).map(|_| ())
    }

    /// Text of a line by number, starting at 1
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        self.lines.get(index).map(String::as_str)
    }

    /// Share of the input scanned so far, in whole percent
    pub fn percent_scanned(&self) -> u32 {
        if self.lines.is_empty() {
            return 100;
        }
        ((self.line * 100) / self.lines.len()).min(100) as u32
    }

    fn at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn next_line(&mut self, cx: &mut ScanContext<'_>) -> ParseResult<bool> {
        if self.line >= self.lines.len() {
            self.chars.clear();
            self.pos = 0;
            return Ok(false);
        }
        let text = self.lines[self.line].clone();
        self.line += 1;
        self.chars = text.chars().collect();
        self.pos = 0;
        let line = self.line as u32;

        let tabs_at = if cx.has(Flags::SMARTTABS) {
            SMART_TABS
                .captures(&text)
                .filter(|caps| caps.get(1).is_none())
                .map(|_| 0)
        } else {
            MIXED_TABS.find(&text).map(|m| text[..m.start()].chars().count())
        };
        if let Some(at) = tabs_at {
            cx.warn(&messages::MIXED_TABS, line, at as u32 + 1, &[])?;
        }

        if let Some(at) = self.chars.iter().position(|c| is_unsafe_char(*c)) {
            cx.warn(&messages::UNSAFE_CHARACTER, line, at as u32 + 1, &[])?;
        }

        if let Some(max) = cx.options.limit(Limit::MaxLen) {
            if self.chars.len() > max as usize {
                cx.warn(&messages::LINE_TOO_LONG, line, self.chars.len() as u32, &[])?;
            }
        }

        if cx.has(Flags::TRAILING) {
            let kept = text.trim_end();
            if kept.len() != text.len() && !kept.trim_start().is_empty() {
                let column = kept.chars().count() as u32 + 1;
                cx.warn(&messages::TRAILING_WHITESPACE, line, column, &[])?;
            }
        }
        Ok(true)
    }

    fn make(&mut self, kind: TokenKind, start: usize, value: Option<String>) -> Token {
        let text: String = self.chars[start..self.pos].iter().collect();
        self.finish(kind, text, start, value)
    }

    fn finish(&mut self, kind: TokenKind, text: String, start: usize, value: Option<String>) -> Token {
        let regex_allowed = opens_pattern_after(kind, &text);
        if !matches!(kind, TokenKind::Directive(_)) {
            self.regex_allowed = regex_allowed;
            self.prev = text.clone();
        }
        Token {
            kind,
            text,
            value,
            line: self.line as u32,
            from: start as u32 + 1,
            character: self.pos as u32 + 1,
            regex_allowed,
        }
    }

    /// Scan the next token, skipping whitespace and ordinary comments.
    pub fn next_token(&mut self, cx: &mut ScanContext<'_>) -> ParseResult<Token> {
        loop {
            while self.at(self.pos).map_or(false, is_space) {
                self.pos += 1;
            }
            let c = match self.at(self.pos) {
                Some(c) => c,
                None => {
                    if self.next_line(cx)? {
                        continue;
                    }
                    return Ok(Token::end(self.line as u32, self.pos as u32 + 1));
                }
            };
            let start = self.pos;

            if is_id_start(c) {
                return self.identifier(cx, start);
            }
            if c.is_ascii_digit() {
                return self.number(cx, start);
            }

            match c {
                '"' | '\'' => return self.string(cx, start, c),
                '/' => match self.at(start + 1) {
                    Some('/') => {
                        self.pos = self.chars.len();
                        continue;
                    }
                    Some('*') => {
                        if let Some(token) = self.block_comment(cx, start)? {
                            return Ok(token);
                        }
                        continue;
                    }
                    _ if self.regex_allowed => return self.pattern_literal(cx, start),
                    Some('=') => {
                        self.pos += 2;
                        return Ok(self.make(TokenKind::Punctuator, start, None));
                    }
                    _ => {
                        self.pos += 1;
                        return Ok(self.make(TokenKind::Punctuator, start, None));
                    }
                },
                '*' if self.at(start + 1) == Some('/') => {
                    self.pos += 2;
                    return Ok(self.make(TokenKind::Directive(DirectiveTag::Close), start, None));
                }
                _ => {}
            }

            if let Some(len) = self.punctuator_len(c, start) {
                self.pos += len;
                return Ok(self.make(TokenKind::Punctuator, start, None));
            }

            let line = self.line as u32;
            cx.warn(&messages::UNEXPECTED, line, start as u32 + 1, &[&c.to_string()])?;
            self.pos = self.chars.len();
        }
    }

    fn punctuator_len(&self, c: char, start: usize) -> Option<usize> {
        let next = self.at(start + 1);
        let third = self.at(start + 2);
        let len = match c {
            '(' | ')' | '{' | '}' | '[' | ']' | '.' | ',' | ':' | ';' | '~' | '?' | '#' | '@' => 1,
            '=' | '!' => match (next, third) {
                (Some('='), Some('=')) => 3,
                (Some('='), _) => 2,
                _ => 1,
            },
            '+' | '-' => match next {
                Some('=') => 2,
                Some(n) if n == c => {
                    if third == Some(c) {
                        3
                    } else {
                        2
                    }
                }
                _ => 1,
            },
            '*' | '%' | '^' => {
                if next == Some('=') {
                    2
                } else {
                    1
                }
            }
            '&' | '|' => match next {
                Some(n) if n == c || n == '=' => 2,
                _ => 1,
            },
            '<' => match (next, third) {
                (Some('<'), Some('=')) => 3,
                (Some('<' | '='), _) => 2,
                _ => 1,
            },
            '>' => {
                let mut len = 1;
                while len < 3 && self.at(start + len) == Some('>') {
                    len += 1;
                }
                if self.at(start + len) == Some('=') {
                    len += 1;
                }
                len
            }
            _ => return None,
        };
        Some(len)
    }

    fn identifier(&mut self, cx: &mut ScanContext<'_>, start: usize) -> ParseResult<Token> {
        self.pos += 1;
        while self.at(self.pos).map_or(false, is_id_continue) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        self.check_name(cx, &name, start as u32 + 1)?;
        Ok(self.finish(TokenKind::Identifier, name, start, None))
    }

    fn check_name(&self, cx: &mut ScanContext<'_>, name: &str, from: u32) -> ParseResult<()> {
        let line = self.line as u32;
        if !cx.has(Flags::PROTO) && name == "__proto__" {
            cx.warn(&messages::DEPRECATED_PROPERTY, line, from, &[name])?;
            return Ok(());
        }
        if !cx.has(Flags::ITERATOR) && name == "__iterator__" {
            cx.warn(&messages::JS17_ONLY, line, from, &[name])?;
            return Ok(());
        }
        let dangling = name.starts_with('_') || name.ends_with('_');
        if cx.has(Flags::NOMEN) && dangling && name != "_" {
            let node_name = name == "__dirname" || name == "__filename";
            if !(cx.has(Flags::NODE) && self.prev != "." && node_name) {
                cx.warn(&messages::DANGLING_UNDERSCORE, line, from, &[name])?;
            }
            return Ok(());
        }
        if cx.has(Flags::CAMELCASE)
            && name.trim_start_matches('_').contains('_')
            && !name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            cx.warn(&messages::NOT_CAMEL_CASE, line, from, &[name])?;
        }
        Ok(())
    }

    fn is_digit_at(&self, index: usize) -> bool {
        self.at(index).map_or(false, |c| c.is_ascii_digit())
    }

    fn number(&mut self, cx: &mut ScanContext<'_>, start: usize) -> ParseResult<Token> {
        let mut j = start;
        while self.is_digit_at(j) {
            j += 1;
        }
        let mut hex = false;
        if matches!(self.at(j), Some('x' | 'X'))
            && self.at(j + 1).map_or(false, |c| c.is_ascii_hexdigit())
        {
            hex = true;
            j += 1;
            while self.at(j).map_or(false, |c| c.is_ascii_hexdigit()) {
                j += 1;
            }
        } else if self.at(j) == Some('.') {
            j += 1;
            while self.is_digit_at(j) {
                j += 1;
            }
        }
        let mut malformed = false;
        if !hex && matches!(self.at(j), Some('e' | 'E')) {
            let mut k = j + 1;
            if matches!(self.at(k), Some('+' | '-')) {
                k += 1;
            }
            malformed = !self.is_digit_at(k);
            while self.is_digit_at(k) {
                k += 1;
            }
            j = k;
        }
        self.pos = j;

        let text: String = self.chars[start..j].iter().collect();
        let line = self.line as u32;
        let from = start as u32 + 1;

        if self.at(j).map_or(false, char::is_alphabetic) {
            cx.warn(&messages::MISSING_SPACE_AFTER, line, j as u32 + 1, &[&text])?;
        }
        let mut digits = text.chars();
        if digits.next() == Some('0') && digits.next().map_or(false, |c| c.is_ascii_digit()) && self.prev != "." {
            cx.warn(&messages::LEADING_ZEROS, line, from, &[&text])?;
        }
        if hex && cx.json {
            cx.warn(&messages::AVOID, line, from, &["0x-"])?;
        }
        if text.ends_with('.') {
            cx.warn(&messages::TRAILING_DECIMAL, line, from, &[&text])?;
        }
        if malformed || !number_value(&text, hex).is_finite() {
            cx.warn(&messages::BAD_NUMBER, line, from, &[&text])?;
        }
        Ok(self.finish(TokenKind::Number, text, start, None))
    }

    fn string(&mut self, cx: &mut ScanContext<'_>, start: usize, quote: char) -> ParseResult<Token> {
        let start_line = self.line as u32;
        let from = start as u32 + 1;
        let after_quote = from + 1;

        if cx.json && quote != '"' {
            cx.warn(&messages::USE_DOUBLE_QUOTE, start_line, after_quote, &[])?;
        }
        match cx.options.quotmark {
            QuotMark::Single if quote != '\'' => {
                cx.warn(&messages::USE_SINGLE_QUOTE, start_line, after_quote, &[])?;
            }
            QuotMark::Double if quote != '"' => {
                cx.warn(&messages::USE_DOUBLE_QUOTE, start_line, after_quote, &[])?;
            }
            QuotMark::Consistent => {
                let first = *self.first_quote.get_or_insert(quote);
                if first != quote {
                    cx.warn(&messages::MIXED_QUOTES, start_line, after_quote, &[])?;
                }
            }
            _ => {}
        }

        let mut raw: String = quote.to_string();
        let mut value = String::new();
        let mut j = start + 1;
        let mut continued = false;
        loop {
            let c = match self.at(j) {
                Some(c) => c,
                None => {
                    if continued && self.next_line(cx)? {
                        continued = false;
                        raw.push('\n');
                        j = 0;
                        continue;
                    }
                    if !continued {
                        cx.warn(&messages::UNCLOSED_STRING, start_line, from, &[])?;
                    } else {
                        cx.warn(&messages::UNCLOSED_STRING, self.line as u32, j as u32 + 1, &[])?;
                    }
                    self.pos = self.chars.len();
                    return Ok(self.string_token(raw, value, start_line, from));
                }
            };
            let line = self.line as u32;
            if c == quote {
                raw.push(c);
                self.pos = j + 1;
                let token = self.string_token(raw, value, start_line, from);
                if !cx.has(Flags::SCRIPTURL) && SCRIPT_URL.is_match(token.value.as_deref().unwrap_or("")) {
                    cx.warn(&messages::SCRIPT_URL, start_line, from, &[])?;
                }
                return Ok(token);
            }
            if (c as u32) < 0x20 {
                if c == '\t' {
                    raw.push(c);
                    value.push(c);
                    j += 1;
                    continue;
                }
                let shown = format!("\\u{:04x}", c as u32);
                cx.warn(&messages::CONTROL_CHARACTER, line, j as u32 + 1, &[&shown])?;
            }
            if c != '\\' {
                raw.push(c);
                value.push(c);
                j += 1;
                continue;
            }

            raw.push('\\');
            j += 1;
            let escaped = match self.at(j) {
                Some(e) => e,
                None => {
                    if cx.has(Flags::MULTISTR) {
                        if cx.json {
                            cx.warn(&messages::AVOID_EOL_ESCAPE, line, j as u32, &[])?;
                        }
                    } else {
                        cx.warn(&messages::BAD_EOL_ESCAPE, line, j as u32, &[])?;
                    }
                    continued = true;
                    continue;
                }
            };
            raw.push(escaped);
            j += 1;
            let column = j as u32;
            match escaped {
                '\\' | '"' | '/' => value.push(escaped),
                '\'' => {
                    if cx.json {
                        cx.warn(&messages::AVOID, line, column, &["\\'"])?;
                    }
                    value.push('\'');
                }
                'b' => value.push('\u{8}'),
                'f' => value.push('\u{c}'),
                'n' => value.push('\n'),
                'r' => value.push('\r'),
                't' => value.push('\t'),
                '0' => {
                    if cx.strict && self.is_digit_at(j) {
                        cx.warn(&messages::OCTAL_IN_STRICT, line, column, &[])?;
                    }
                    value.push('\0');
                }
                'u' | 'x' => {
                    if escaped == 'x' && cx.json {
                        cx.warn(&messages::AVOID, line, column, &["\\x-"])?;
                    }
                    let width = if escaped == 'u' { 4 } else { 2 };
                    let digits: String = self.chars.iter().skip(j).take(width).collect();
                    match u32::from_str_radix(&digits, 16) {
                        Ok(code) if digits.len() == width && digits.chars().all(|d| d.is_ascii_hexdigit()) => {
                            raw.push_str(&digits);
                            j += width;
                            if (32..=126).contains(&code) && !matches!(code, 0x22 | 0x27 | 0x5c) {
                                cx.warn(&messages::UNNECESSARY_ESCAPE, line, column, &[])?;
                            }
                            value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                        }
                        _ => {
                            cx.warn(&messages::BAD_ESCAPE, line, column, &[])?;
                            value.push(escaped);
                        }
                    }
                }
                'v' => {
                    if cx.json {
                        cx.warn(&messages::AVOID, line, column, &["\\v"])?;
                    }
                    value.push('\u{b}');
                }
                '!' if j >= 3 && self.at(j - 3) == Some('<') => value.push('!'),
                other => {
                    cx.warn(&messages::BAD_ESCAPE, line, column, &[])?;
                    value.push(other);
                }
            }
        }
    }

    fn string_token(&mut self, raw: String, value: String, line: u32, from: u32) -> Token {
        let mut token = self.finish(TokenKind::String, raw, from as usize - 1, Some(value));
        token.line = line;
        token
    }

    fn pattern_literal(&mut self, cx: &mut ScanContext<'_>, start: usize) -> ParseResult<Token> {
        let line = self.line as u32;
        let from = start as u32 + 1;
        let options = PatternOptions {
            regexdash: cx.has(Flags::REGEXDASH),
            regexp: cx.has(Flags::REGEXP),
        };
        let literal = pattern::scan(&self.chars[start + 1..], options);

        if literal.body.starts_with('=') {
            cx.warn(&messages::REGEXP_SLASH_EQUAL, line, from, &[])?;
        }
        for finding in &literal.findings {
            let args: Vec<&str> = finding.args.iter().map(String::as_str).collect();
            cx.warn(finding.message, line, from + finding.offset as u32, &args)?;
        }
        if !literal.terminated {
            cx.warn(&messages::UNCLOSED_REGEXP, line, from, &[])?;
        }
        self.pos = start + 1 + literal.consumed;
        Ok(self.make(TokenKind::RegExp, start, Some(literal.body)))
    }

    /// Skip a block comment, or return the directive token it opens.
    fn block_comment(&mut self, cx: &mut ScanContext<'_>, start: usize) -> ParseResult<Option<Token>> {
        let mut end = start + 2;
        while self.at(end).map_or(false, |c| c.is_ascii_alphabetic()) {
            end += 1;
        }
        let word: String = self.chars[start + 2..end].iter().collect();
        if let Some(tag) = DirectiveTag::from_word(&word) {
            self.pos = end;
            return Ok(Some(self.make(TokenKind::Directive(tag), start, None)));
        }

        let mut j = start + 2;
        loop {
            while j + 1 < self.chars.len() {
                if self.chars[j] == '*' && self.chars[j + 1] == '/' {
                    self.pos = j + 2;
                    return Ok(None);
                }
                j += 1;
            }
            if !self.next_line(cx)? {
                let line = self.line as u32;
                cx.warn(&messages::UNCLOSED_COMMENT, line, self.chars.len() as u32 + 1, &[])?;
                self.pos = self.chars.len();
                return Ok(None);
            }
            j = 0;
        }
    }
}

pub(crate) fn number_value(text: &str, hex: bool) -> f64 {
    if hex {
        text[2..]
            .chars()
            .filter_map(|c| c.to_digit(16))
            .fold(0.0, |acc, d| acc * 16.0 + d as f64)
    } else {
        text.parse::<f64>().unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Diagnostic;

    fn scan_with(source: &str, options: &Options) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut sink = DiagnosticSink::default();
        let mut lexer = Lexer::new(split_lines(source));
        let mut tokens = Vec::new();
        {
            let mut cx = ScanContext {
                options,
                sink: &mut sink,
                strict: false,
                json: false,
            };
            lexer.start(&mut cx).unwrap();
            loop {
                let token = lexer.next_token(&mut cx).unwrap();
                if token.kind == TokenKind::End {
                    break;
                }
                tokens.push(token);
            }
        }
        (tokens, sink.into_diagnostics())
    }

    fn scan(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        scan_with(source, &Options::default())
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn test_punctuators_and_positions() {
        let (tokens, diags) = scan("a >>>= b === c;");
        assert!(diags.is_empty());
        assert_eq!(texts(&tokens), vec!["a", ">>>=", "b", "===", "c", ";"]);
        assert_eq!(tokens[1].from, 3);
        assert_eq!(tokens[1].character, 7);
        assert_eq!(tokens[1].line, 1);
    }

    #[test]
    fn test_split_lines_handles_all_breaks() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_division_after_operand() {
        let (tokens, _) = scan("(a) / b / c");
        assert_eq!(texts(&tokens), vec!["(", "a", ")", "/", "b", "/", "c"]);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::RegExp));
    }

    #[test]
    fn test_pattern_after_operator() {
        let (tokens, diags) = scan("x = /re/g;");
        assert!(diags.is_empty());
        assert_eq!(tokens[2].kind, TokenKind::RegExp);
        assert_eq!(tokens[2].text, "/re/g");
        assert_eq!(tokens[2].value.as_deref(), Some("re"));
    }

    #[test]
    fn test_pattern_after_return_keyword() {
        let (tokens, _) = scan("return /x/.test(s)");
        assert_eq!(tokens[1].kind, TokenKind::RegExp);
    }

    #[test]
    fn test_divide_assign_after_operand() {
        let (tokens, _) = scan("a /= 2");
        assert_eq!(texts(&tokens), vec!["a", "/=", "2"]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let (tokens, diags) = scan("a // note\n/* block\n still */ b");
        assert!(diags.is_empty());
        assert_eq!(texts(&tokens), vec!["a", "b"]);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_directive_tokens() {
        let (tokens, _) = scan("/*global foo*/ /*jshint curly:true */ /* plain */");
        assert_eq!(tokens[0].kind, TokenKind::Directive(DirectiveTag::Globals));
        assert_eq!(tokens[1].text, "foo");
        assert_eq!(tokens[2].kind, TokenKind::Directive(DirectiveTag::Close));
        assert_eq!(tokens[3].kind, TokenKind::Directive(DirectiveTag::Options));
        assert_eq!(texts(&tokens[4..]), vec!["curly", ":", "true", "*/"]);
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_unclosed_comment() {
        let (tokens, diags) = scan("a /* never\nclosed");
        assert_eq!(texts(&tokens), vec!["a"]);
        assert_eq!(codes(&diags), vec!["E017"]);
    }

    #[test]
    fn test_string_decoding() {
        let (tokens, diags) = scan(r#"'a\tb\u0041\\'"#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value.as_deref(), Some("a\tbA\\"));
        assert_eq!(codes(&diags), vec!["W049"]);
    }

    #[test]
    fn test_unclosed_string_resyncs_at_line_end() {
        let (tokens, diags) = scan("x = 'abc\ny;");
        assert_eq!(codes(&diags), vec!["E029"]);
        assert_eq!(texts(&tokens), vec!["x", "=", "'abc", "y", ";"]);
    }

    #[test]
    fn test_multiline_string_needs_multistr() {
        let (tokens, diags) = scan("'abc\\\ndef'");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value.as_deref(), Some("abcdef"));
        assert_eq!(codes(&diags), vec!["W043"]);

        let mut options = Options::default();
        options.set(Flags::MULTISTR, true);
        let (_, diags) = scan_with("'abc\\\ndef'", &options);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_bad_escape() {
        let (_, diags) = scan(r#""\q""#);
        assert_eq!(codes(&diags), vec!["W044"]);
    }

    #[test]
    fn test_script_url() {
        let (_, diags) = scan("'javascript:void(0)'");
        assert_eq!(codes(&diags), vec!["W107"]);
        let mut options = Options::default();
        options.set(Flags::SCRIPTURL, true);
        assert!(scan_with("'javascript:void(0)'", &options).1.is_empty());
    }

    #[test]
    fn test_quotmark() {
        let mut options = Options::default();
        options.quotmark = QuotMark::Consistent;
        let (_, diags) = scan_with("'a' + \"b\"", &options);
        assert_eq!(codes(&diags), vec!["W110"]);

        options.quotmark = QuotMark::Double;
        let (_, diags) = scan_with("'a'", &options);
        assert_eq!(codes(&diags), vec!["W108"]);
    }

    #[test]
    fn test_number_checks() {
        assert_eq!(codes(&scan("007").1), vec!["W046"]);
        assert_eq!(codes(&scan("1.").1), vec!["W047"]);
        assert_eq!(codes(&scan("1e").1), vec!["W045"]);
        assert_eq!(codes(&scan("1e+").1), vec!["W045"]);
        assert_eq!(codes(&scan("3in").1), vec!["E045"]);
        assert!(scan("0x1F 1.5e-3 10").1.is_empty());
        assert_eq!(codes(&scan("1e999").1), vec!["W045"]);
    }

    #[test]
    fn test_unexpected_character_skips_line() {
        let (tokens, diags) = scan("a \u{60} b\nc");
        assert_eq!(codes(&diags), vec!["E024"]);
        assert_eq!(texts(&tokens), vec!["a", "c"]);
    }

    #[test]
    fn test_line_checks() {
        let mut options = Options::default();
        options.set(Flags::TRAILING, true);
        options.set_limit(Limit::MaxLen, 10);
        let (_, diags) = scan_with("var a = 1;   \n\t var b;\nvar longer_name = 2;", &options);
        assert_eq!(codes(&diags), vec!["W101", "W102", "W099", "W101"]);
    }

    #[test]
    fn test_shebang_line_is_blank() {
        let (tokens, diags) = scan("#!/usr/bin/env node\nrun();");
        assert!(diags.is_empty());
        assert_eq!(texts(&tokens), vec!["run", "(", ")", ";"]);
    }

    #[test]
    fn test_name_checks() {
        let mut options = Options::default();
        options.set(Flags::NOMEN, true);
        options.set(Flags::CAMELCASE, true);
        let (_, diags) = scan_with("_private snake_case CONST_OK __proto__", &options);
        assert_eq!(codes(&diags), vec!["W105", "W106", "W103"]);
    }

    #[test]
    fn test_pattern_findings_are_reported() {
        let (tokens, diags) = scan("x = /a   b/;");
        assert_eq!(tokens[2].kind, TokenKind::RegExp);
        assert_eq!(codes(&diags), vec!["W132"]);
    }

    #[test]
    fn test_unclosed_pattern() {
        let (tokens, diags) = scan("x = /abc\ny");
        assert_eq!(codes(&diags), vec!["E015"]);
        assert_eq!(texts(&tokens), vec!["x", "=", "/abc", "y"]);
    }

    #[test]
    fn test_confusing_plusses_are_single_token() {
        let (tokens, _) = scan("a +++ b");
        assert_eq!(texts(&tokens), vec!["a", "+++", "b"]);
    }
}
