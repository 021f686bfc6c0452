//! Precedence parser
//!
//! A top-down operator precedence parser that never builds a full tree:
//! each handler in the [grammar](crate::grammar) checks its construct as
//! soon as it has read it and hands a small [`Expr`] back to its caller.
//!
//! The parser keeps three tokens in view (`prev`, `token`, `next`) plus an
//! on-demand lookahead queue. Directive comments are applied the moment
//! the scanner produces them and never reach the handlers.
//!
//! Recovery is local: a mismatched token is reported and consumed, so the
//! only ways a run ends early are the diagnostic ceiling, `passfail` and
//! the nesting ceiling, all of which surface as [`Abort`].

use core_types::SourcePosition;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::diagnostics::DiagnosticSink;
use crate::environments::Globals;
use crate::error::{Abort, ParseResult};
use crate::grammar::{self, Expr, RuleFlags};
use crate::lexer::{self, Lexer, ScanContext, Token, TokenKind};
use crate::messages::{self, Message};
use crate::options::{Flags, Limit, Options};
use crate::scope::{Binding, FunctionKind, FunctionRecord, Resolver};

/// How many nested expressions and statements a run accepts.
pub const MAX_DEPTH: u32 = 100;

/// Source text handed to an evaluating call, queued for its own run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Name of the call that received the text
    pub scope: String,
    /// The string argument
    pub source: String,
}

/// Where an expression starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start {
    /// Inside another expression
    Operand,
    /// At the start of a statement; statement handlers apply
    Statement,
    /// At the start of a loop clause
    Clause,
}

/// The token that opened a bracketed construct.
#[derive(Debug, Clone, Copy)]
pub struct Opener {
    id: &'static str,
    line: u32,
    at: SourcePosition,
}

impl Opener {
    /// Opener for a scanned token
    pub fn of_token(token: &Token) -> Self {
        Opener {
            id: grammar::rule_for(token).id,
            line: token.line,
            at: token.position(),
        }
    }

    /// Opener for a parsed node
    pub fn of_expr(node: &Expr) -> Self {
        Opener {
            id: node.id,
            line: node.line,
            at: node.position(),
        }
    }
}

/// How a token is shown in messages.
pub fn display(token: &Token) -> String {
    match token.kind {
        TokenKind::End => "(end)".to_string(),
        _ => token.value.clone().unwrap_or_else(|| token.text.clone()),
    }
}

fn starts_statement(text: &str) -> bool {
    text.chars().next().map_or(false, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '\'' | '"' | '{' | '(' | '[')
    })
}

fn begin_token() -> Token {
    Token {
        kind: TokenKind::Punctuator,
        text: "(begin)".to_string(),
        value: None,
        line: 0,
        from: 0,
        character: 0,
        regex_allowed: true,
    }
}

/// State of one analysis run.
pub struct Parser {
    lexer: Lexer,
    pub(crate) options: Options,
    pub(crate) globals: Globals,
    pub(crate) sink: DiagnosticSink,
    pub(crate) scope: Resolver,
    pub(crate) directives: HashSet<String>,
    pub(crate) prev: Token,
    pub(crate) token: Token,
    pub(crate) next: Token,
    lookahead: VecDeque<Token>,
    pub(crate) anon_name: String,
    depth: u32,
    early_end: bool,
    comma_warned: bool,
    pub(crate) in_block: bool,
    pub(crate) no_reach: bool,
    pub(crate) wrap_pending: bool,
    pub(crate) json_mode: bool,
    pub(crate) members: IndexMap<String, u32>,
    pub(crate) members_only: Option<HashSet<String>>,
    pub(crate) fragments: Vec<Fragment>,
}

impl Parser {
    /// Prepare a run over `lines`.
    pub fn new(lines: Vec<String>, options: Options, globals: Globals, sink: DiagnosticSink) -> Self {
        Parser {
            lexer: Lexer::new(lines),
            options,
            globals,
            sink,
            scope: Resolver::new(),
            directives: HashSet::new(),
            prev: begin_token(),
            token: begin_token(),
            next: begin_token(),
            lookahead: VecDeque::new(),
            anon_name: "anonymous".to_string(),
            depth: 0,
            early_end: false,
            comma_warned: false,
            in_block: false,
            no_reach: false,
            wrap_pending: false,
            json_mode: false,
            members: IndexMap::new(),
            members_only: None,
            fragments: Vec::new(),
        }
    }

    /// Share of the input scanned so far
    pub fn percent_scanned(&self) -> u32 {
        self.lexer.percent_scanned()
    }

    /// Text of a source line, starting at 1
    pub fn line_text(&self, line: u32) -> Option<&str> {
        self.lexer.line_text(line)
    }

    /// Parse and check the whole input.
    pub fn run(&mut self) -> ParseResult<()> {
        {
            let mut cx = ScanContext {
                options: &self.options,
                sink: &mut self.sink,
                strict: false,
                json: false,
            };
            self.lexer.start(&mut cx)?;
        }
        self.advance(None)?;

        if self.next.is_punct("{") || self.next.is_punct("[") {
            debug!("input read as JSON");
            self.options.set(Flags::LAXBREAK, true);
            self.json_mode = true;
            self.json_value()?;
            if self.next.kind != TokenKind::End {
                self.advance(Some("(end)"))?;
            }
        } else {
            self.directive_prologue()?;
            if self.strict_active() && !self.options.has(Flags::GLOBALSTRICT) {
                self.warn_at(&messages::FUNCTION_FORM_STRICT, self.prev.position(), &[])?;
            }
            self.statements()?;
            while self.next.kind != TokenKind::End {
                if self.next.is_punct(".") {
                    self.advance(None)?;
                } else {
                    self.advance(Some("(end)"))?;
                }
                self.statements()?;
            }
        }
        self.close_global()
    }

    // ---- diagnostics -------------------------------------------------

    /// Report `message` at `at`.
    pub(crate) fn warn_at(&mut self, message: &Message, at: SourcePosition, args: &[&str]) -> ParseResult<()> {
        let ceiling = self.options.ceiling();
        self.sink.report(message, message.severity, at, args, ceiling)
    }

    /// Report `message` at the next token, or the current one at the end.
    pub(crate) fn warn_next(&mut self, message: &Message, args: &[&str]) -> ParseResult<()> {
        let at = self.next_pos();
        self.warn_at(message, at, args)
    }

    /// Report `message` at the current token.
    pub(crate) fn warn_token(&mut self, message: &Message, args: &[&str]) -> ParseResult<()> {
        let at = self.token.position();
        self.warn_at(message, at, args)
    }

    /// Where a diagnostic about the next token goes.
    pub(crate) fn next_pos(&self) -> SourcePosition {
        if self.next.kind == TokenKind::End {
            self.token.position()
        } else {
            self.next.position()
        }
    }

    /// Report a statement that ended without `;`.
    ///
    /// When the next token sits on the same line and could start a
    /// statement, the finding is the stronger "missing before statement".
    pub(crate) fn missing_semicolon(&mut self) -> ParseResult<()> {
        let at = SourcePosition::new(self.token.line, self.token.character);
        let crowded = self.next.kind != TokenKind::End
            && self.next.line == self.token.line
            && starts_statement(&self.next.text);
        if crowded {
            self.warn_at(&messages::MISSING_SEMICOLON_BEFORE_STATEMENT, at, &[])
        } else {
            self.warn_at(&messages::MISSING_SEMICOLON, at, &[])
        }
    }

    // ---- option state ------------------------------------------------

    /// Whether a `"use strict"` directive is in effect.
    pub(crate) fn strict_active(&self) -> bool {
        self.directives.contains("use strict")
    }

    /// Whether constructor capitalization is checked.
    pub(crate) fn newcap_enabled(&self) -> bool {
        self.options.has(Flags::NEWCAP)
            || (self.strict_active() && !self.options.is_disabled(Flags::NEWCAP))
    }

    // ---- token feed --------------------------------------------------

    /// Scan one raw token, directives included.
    pub(crate) fn scan(&mut self) -> ParseResult<Token> {
        let strict = self.strict_active();
        let mut cx = ScanContext {
            options: &self.options,
            sink: &mut self.sink,
            strict,
            json: self.json_mode,
        };
        self.lexer.next_token(&mut cx)
    }

    fn significant(&mut self) -> ParseResult<Token> {
        loop {
            let token = self.scan()?;
            match token.kind {
                TokenKind::Directive(tag) => self.apply_directive(tag, &token)?,
                _ => return Ok(token),
            }
        }
    }

    fn pull(&mut self) -> ParseResult<Token> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => self.significant(),
        }
    }

    /// The token `n` places after `next`.
    pub(crate) fn peek(&mut self, n: usize) -> ParseResult<Token> {
        while self.lookahead.len() <= n {
            let token = self.significant()?;
            self.lookahead.push_back(token);
        }
        Ok(self.lookahead[n].clone())
    }

    /// Rule id of the next token
    pub(crate) fn next_id(&self) -> &'static str {
        grammar::rule_for(&self.next).id
    }

    /// Move one token forward, checking that the next token is `expected`.
    pub(crate) fn advance(&mut self, expected: Option<&str>) -> ParseResult<()> {
        self.step(expected, None)
    }

    /// Move past the token closing `opener`.
    pub(crate) fn advance_matching(&mut self, expected: &str, opener: Opener) -> ParseResult<()> {
        self.step(Some(expected), Some(opener))
    }

    fn step(&mut self, expected: Option<&str>, opener: Option<Opener>) -> ParseResult<()> {
        let current = grammar::rule_for(&self.token).id;
        let next_id = self.next_id();
        match current {
            "(number)" if next_id == "." => {
                self.warn_token(&messages::DOT_AFTER_NUMBER, &[])?;
            }
            "-" if matches!(next_id, "-" | "--") => {
                self.warn_next(&messages::CONFUSING_MINUSSES, &[])?;
            }
            "+" if matches!(next_id, "+" | "++") => {
                self.warn_next(&messages::CONFUSING_PLUSSES, &[])?;
            }
            _ => {}
        }
        if matches!(self.token.kind, TokenKind::String | TokenKind::Identifier) {
            self.anon_name = display(&self.token);
        }
        if let Some(id) = expected {
            if next_id != id {
                self.mismatch(id, opener)?;
            }
        }
        let incoming = self.pull()?;
        let current = std::mem::replace(&mut self.next, incoming);
        self.prev = std::mem::replace(&mut self.token, current);
        Ok(())
    }

    fn mismatch(&mut self, id: &str, opener: Option<Opener>) -> ParseResult<()> {
        let at_end = self.next.kind == TokenKind::End;
        let saw = display(&self.next);
        match opener {
            Some(opener) if at_end => self.warn_at(&messages::UNMATCHED, opener.at, &[opener.id]),
            Some(opener) => {
                let line = opener.line.to_string();
                self.warn_next(&messages::EXPECTED_MATCH, &[id, opener.id, &line, &saw])
            }
            None if at_end && self.early_end => Ok(()),
            None if self.next.is_word(id) => Ok(()),
            None => self.warn_next(&messages::EXPECTED_TOKEN, &[id, &saw]),
        }
    }

    // ---- expressions -------------------------------------------------

    /// Count one level of nesting, failing past [`MAX_DEPTH`].
    pub(crate) fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Abort::NestingTooDeep(self.next_pos()));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parse an operand expression binding tighter than `rbp`.
    pub(crate) fn expression(&mut self, rbp: u8) -> ParseResult<Expr> {
        self.parse_expression(rbp, Start::Operand)
    }

    /// Parse an expression from a given starting position.
    pub(crate) fn parse_expression(&mut self, rbp: u8, start: Start) -> ParseResult<Expr> {
        self.enter()?;
        let result = self.expression_body(rbp, start);
        self.leave();
        result
    }

    fn expression_body(&mut self, rbp: u8, start: Start) -> ParseResult<Expr> {
        if self.next.kind == TokenKind::End {
            if !self.early_end {
                self.early_end = true;
                self.warn_token(&messages::EARLY_END, &[])?;
            }
            return Ok(Expr::from_token(grammar::rule_for(&self.next), &self.next));
        }
        self.advance(None)?;
        if start != Start::Operand {
            self.anon_name = "anonymous".to_string();
            let verb = display(&self.token);
            self.scope.current_mut().verb = Some(verb);
        }

        let rule = grammar::rule_for(&self.token);
        let this = Expr::from_token(rule, &self.token);
        if start == Start::Statement {
            if let Some(fud) = rule.fud {
                return fud(self, rule, this);
            }
        }
        let mut left = match rule.nud {
            Some(nud) => nud(self, rule, this)?,
            None => {
                if rule.id == "." && self.next.kind == TokenKind::Number {
                    let digits = display(&self.next);
                    self.warn_token(&messages::LEADING_DECIMAL, &[&digits])?;
                    self.advance(None)?;
                    return Ok(Expr::from_token(grammar::rule_for(&self.token), &self.token));
                }
                let shown = if rule.id == "(error)" {
                    display(&self.token)
                } else {
                    rule.id.to_string()
                };
                self.warn_token(&messages::EXPECTED_IDENTIFIER, &[&shown])?;
                return Ok(this);
            }
        };

        while rbp < grammar::rule_for(&self.next).lbp {
            let last = display(&self.token);
            let mut is_array = last == "Array";
            let mut is_object = last == "Object";
            let operand_named = !left.value.is_empty()
                || left.left().map_or(false, |inner| !inner.value.is_empty());
            if operand_named
                && (left.value != "new" || left.left().map_or(false, |inner| inner.value == "."))
            {
                is_array = false;
                if left.value != last {
                    is_object = false;
                }
            }

            self.advance(None)?;
            if self.token.is_punct("(") && self.next.is_punct(")") {
                if is_array {
                    self.warn_token(&messages::USE_ARRAY_LITERAL, &[])?;
                }
                if is_object {
                    self.warn_token(&messages::USE_OBJECT_LITERAL, &[])?;
                }
            }
            let rule = grammar::rule_for(&self.token);
            let this = Expr::from_token(rule, &self.token);
            match rule.led {
                Some(led) => left = led(self, rule, this, left)?,
                None => {
                    self.warn_token(&messages::EXPECTED_OPERATOR, &[rule.id])?;
                    break;
                }
            }
        }
        Ok(left)
    }

    /// Report an operator that starts a new line, unless `laxbreak` is set.
    pub(crate) fn operator_line_break(&mut self) -> ParseResult<()> {
        if !self.options.has(Flags::LAXBREAK) && self.prev.line != self.token.line {
            let id = grammar::rule_for(&self.token).id;
            self.warn_token(&messages::BAD_LINE_BREAK, &[id])?;
        }
        Ok(())
    }

    /// Report a line break between the current token and the next one.
    pub(crate) fn no_line_break(&mut self) -> ParseResult<()> {
        if self.token.line != self.next.line {
            let value = display(&self.token);
            self.warn_token(&messages::LINE_BREAKING, &[&value])?;
        }
        Ok(())
    }

    /// Consume a `,` separator.
    pub(crate) fn comma(&mut self) -> ParseResult<()> {
        if self.token.line != self.next.line && !self.options.has(Flags::LAXCOMMA) {
            if !self.comma_warned {
                self.comma_warned = true;
                self.warn_next(&messages::COMMA_FIRST, &[])?;
            }
            self.warn_token(&messages::BAD_LINE_BREAK, &[","])?;
        }
        self.advance(Some(","))
    }

    /// Parse a condition, flagging a top-level assignment.
    pub(crate) fn condition(&mut self) -> ParseResult<Expr> {
        let test = self.expression(20)?;
        if self.next.is_punct("=") {
            if !self.options.has(Flags::BOSS) {
                self.warn_next(&messages::ASSIGNMENT_IN_CONDITION, &[])?;
            }
            self.advance(Some("="))?;
            self.expression(20)?;
        }
        Ok(test)
    }

    /// Count a property name and check it against `/*members*/`.
    pub(crate) fn count_member(&mut self, name: &str) -> ParseResult<()> {
        let unexpected = self
            .members_only
            .as_ref()
            .map_or(false, |only| !only.contains(name));
        if unexpected {
            self.warn_token(&messages::UNEXPECTED_MEMBER, &[name])?;
        }
        *self.members.entry(name.to_string()).or_insert(0) += 1;
        Ok(())
    }

    // ---- names -------------------------------------------------------

    /// Consume a name if the next token is one.
    pub(crate) fn optional_identifier(&mut self, param: bool) -> ParseResult<Option<String>> {
        if self.next.kind != TokenKind::Identifier {
            return Ok(None);
        }
        self.advance(None)?;
        let name = self.token.text.clone();
        let rule = grammar::rule_for(&self.token);
        if rule.has(RuleFlags::RESERVED) && !self.options.has(Flags::ES5) && !(param && name == "undefined") {
            self.warn_token(&messages::RESERVED_WORD, &[rule.id])?;
        }
        Ok(Some(name))
    }

    /// Consume a required name.
    pub(crate) fn identifier(&mut self, param: bool) -> ParseResult<Option<String>> {
        if let Some(name) = self.optional_identifier(param)? {
            return Ok(Some(name));
        }
        if self.token.is_word("function") && self.next.is_punct("(") {
            self.warn_next(&messages::MISSING_FUNCTION_NAME, &[])?;
        } else {
            let saw = display(&self.next);
            self.warn_next(&messages::EXPECTED_IDENTIFIER, &[&saw])?;
        }
        Ok(None)
    }

    // ---- statements --------------------------------------------------

    /// Parse one statement.
    pub(crate) fn statement(&mut self) -> ParseResult<Option<Expr>> {
        self.enter()?;
        let frames = self.scope.frame_depth();
        let result = self.statement_body();
        self.scope.truncate_frames(frames);
        self.leave();
        result
    }

    fn statement_body(&mut self) -> ParseResult<Option<Expr>> {
        if self.next.is_punct(";") {
            self.advance(Some(";"))?;
            return Ok(None);
        }

        let mut first = grammar::rule_for(&self.next);
        if self.next.kind == TokenKind::Identifier
            && !first.has(RuleFlags::RESERVED)
            && self.peek(0)?.is_punct(":")
        {
            let label = self.next.clone();
            self.advance(None)?;
            self.advance(Some(":"))?;
            self.scope.push_frame();
            self.declare(&label.text, Binding::Label, label.position())?;
            first = grammar::rule_for(&self.next);
            if !first.has(RuleFlags::LABELLED) && !self.next.is_punct("{") {
                let target = display(&self.next);
                self.warn_next(&messages::LABEL_ON_STATEMENT, &[&label.text, &target])?;
            }
            if lexer::SCRIPT_URL.is_match(&format!("{}:", label.text)) {
                self.warn_at(&messages::LABEL_SCRIPT_URL, label.position(), &[&label.text])?;
            }
        }

        if first.id == "{" {
            self.block(true, true, false)?;
            return Ok(None);
        }

        let start = self.next.position();
        let result = self.parse_expression(0, Start::Statement)?;
        if !first.has(RuleFlags::BLOCK) {
            if !self.options.has(Flags::EXPR) && !result.exps {
                self.warn_token(&messages::EXPRESSION_STATEMENT, &[])?;
            } else if self.options.has(Flags::NONEW)
                && result.id == "("
                && result.left().map_or(false, |callee| callee.id == "new")
            {
                self.warn_at(&messages::NEW_SIDE_EFFECTS, start, &[])?;
            }

            if self.next.is_punct(",") {
                self.comma()?;
                return Ok(Some(result));
            }
            if self.next.is_punct(";") {
                self.advance(Some(";"))?;
            } else if !self.options.has(Flags::ASI) {
                let last_in_block = self.options.has(Flags::LASTSEMIC)
                    && self.next.is_punct("}")
                    && self.next.line == self.token.line;
                if !last_in_block {
                    self.missing_semicolon()?;
                }
            }
        }
        Ok(Some(result))
    }

    /// Parse statements up to a closing token.
    pub(crate) fn statements(&mut self) -> ParseResult<Vec<Option<Expr>>> {
        let mut list = Vec::new();
        loop {
            let rule = grammar::rule_for(&self.next);
            if rule.has(RuleFlags::REACH) || self.next.kind == TokenKind::End {
                break;
            }
            if self.next.is_punct(";") {
                if !self.peek(0)?.is_punct("(") {
                    self.warn_next(&messages::UNNECESSARY_SEMICOLON, &[])?;
                }
                self.advance(Some(";"))?;
            } else {
                list.push(self.statement()?);
            }
        }
        Ok(list)
    }

    /// Parse a block or, for `ordinary` blocks, a single statement.
    ///
    /// `stmt` allows an unbraced body without a warning unless `curly` is
    /// set; `isfunc` reads a directive prologue first.
    pub(crate) fn block(&mut self, ordinary: bool, stmt: bool, isfunc: bool) -> ParseResult<Vec<Option<Expr>>> {
        let was_in_block = self.in_block;
        self.in_block = ordinary;
        let frames = self.scope.frame_depth();
        if !ordinary || !self.options.has(Flags::FUNCSCOPE) {
            self.scope.push_frame();
        }
        let opener = Opener::of_token(&self.next);
        self.enter_block()?;

        let mut list = None;
        if self.next.is_punct("{") {
            self.advance(Some("{"))?;
            if !self.next.is_punct("}") {
                let saved = if isfunc {
                    let saved = self.directives.clone();
                    self.directive_prologue()?;
                    let parent_is_global = self
                        .scope
                        .current()
                        .parent
                        .map_or(false, |parent| self.scope.record(parent).is_global());
                    if self.options.has(Flags::STRICT)
                        && parent_is_global
                        && !saved.contains("use strict")
                        && !self.strict_active()
                    {
                        self.warn_next(&messages::MISSING_USE_STRICT, &[])?;
                    }
                    Some(saved)
                } else {
                    None
                };
                let body = self.statements()?;
                self.scope.current_mut().metrics.statements += body.len() as u32;
                if let Some(saved) = saved {
                    self.directives = saved;
                }
                list = Some(body);
            }
            self.advance_matching("}", opener)?;
        } else if !ordinary {
            let saw = display(&self.next);
            self.warn_next(&messages::EXPECTED_TOKEN, &["{", &saw])?;
        } else {
            if !stmt || self.options.has(Flags::CURLY) {
                let saw = display(&self.next);
                self.warn_next(&messages::EXPECTED_TOKEN, &["{", &saw])?;
            }
            self.no_reach = true;
            let single = self.statement()?;
            self.no_reach = false;
            list = Some(vec![single]);
        }

        self.scope.current_mut().verb = None;
        self.scope.truncate_frames(frames);
        self.in_block = was_in_block;
        if ordinary && self.options.has(Flags::NOEMPTY) && list.as_ref().map_or(true, Vec::is_empty) {
            self.warn_next(&messages::EMPTY_BLOCK, &[])?;
        }
        self.scope.current_mut().metrics.nested_block_depth -= 1;
        Ok(list.unwrap_or_default())
    }

    fn enter_block(&mut self) -> ParseResult<()> {
        let metrics = &mut self.scope.current_mut().metrics;
        metrics.nested_block_depth += 1;
        let depth = metrics.nested_block_depth;
        if depth > 0 {
            metrics.max_depth = metrics.max_depth.max(depth as u32);
        }
        if let Some(max) = self.options.limit(Limit::MaxDepth) {
            if depth > 0 && depth == max as i32 + 1 {
                let shown = depth.to_string();
                self.warn_next(&messages::NESTED_TOO_DEEPLY, &[&shown])?;
            }
        }
        Ok(())
    }

    /// Read leading string statements as directives.
    pub(crate) fn directive_prologue(&mut self) -> ParseResult<()> {
        while self.next.kind == TokenKind::String {
            let after = self.peek(0)?;
            let terminated = if after.is_punct(";") {
                true
            } else if after.line != self.next.line {
                let continues = matches!(
                    after.kind,
                    TokenKind::String | TokenKind::Number | TokenKind::RegExp | TokenKind::Identifier
                ) || after.is_punct("}");
                if !continues {
                    break;
                }
                false
            } else if after.is_punct("}") {
                false
            } else {
                break;
            };

            self.advance(None)?;
            if !terminated {
                self.missing_semicolon()?;
            }
            let directive = display(&self.token);
            if self.directives.contains(&directive) {
                self.warn_token(&messages::UNNECESSARY_DIRECTIVE, &[&directive])?;
            }
            debug!(directive = directive.as_str(), "directive in effect");
            self.directives.insert(directive);
            if terminated {
                self.advance(Some(";"))?;
            }
        }
        Ok(())
    }

    /// Flag code after a statement that leaves the block.
    pub(crate) fn reachable(&mut self, verb: &str) -> ParseResult<()> {
        if !self.next.is_punct(";") || self.no_reach {
            return Ok(());
        }
        let after = self.peek(0)?;
        let rule = grammar::rule_for(&after);
        if rule.has(RuleFlags::REACH) {
            return Ok(());
        }
        if rule.id == "function" {
            if self.options.has(Flags::LATEDEF) {
                self.warn_at(&messages::INNER_FUNCTIONS_FIRST, after.position(), &[])?;
            }
        } else {
            let shown = display(&after);
            self.warn_at(&messages::UNREACHABLE, after.position(), &[&shown, verb])?;
        }
        Ok(())
    }

    // ---- functions ---------------------------------------------------

    /// Parse a parameter list and body.
    ///
    /// `name` is the declared name, if any; anonymous functions are named
    /// after the last name or string seen before them.
    pub(crate) fn function_body(&mut self, name: Option<&str>, is_statement: bool) -> ParseResult<Option<Vec<String>>> {
        let frames = self.scope.frame_depth();
        self.scope.push_frame();
        let record_name = match name {
            Some(name) => name.to_string(),
            None => format!("\"{}\"", self.anon_name),
        };
        let opened_at = self.next_pos();
        let mut record = FunctionRecord::new(record_name, FunctionKind::Function, None, opened_at);
        record.character = self.next.character;
        record.is_statement = is_statement;
        self.scope.open(record);
        if let Some(name) = name {
            let at = self.token.position();
            self.declare(name, Binding::Function, at)?;
        }

        let params = self.function_params()?;
        let count = params.as_ref().map_or(0, Vec::len) as u32;
        self.scope.current_mut().params = params.clone();
        self.scope.current_mut().metrics.parameters = count;
        if let Some(max) = self.options.limit(Limit::MaxParams) {
            if count > max {
                let shown = count.to_string();
                self.warn_at(&messages::TOO_MANY_PARAMETERS, opened_at, &[&shown])?;
            }
        }

        self.block(false, false, true)?;

        let metrics = self.scope.current().metrics.clone();
        if let Some(max) = self.options.limit(Limit::MaxStatements) {
            if metrics.statements > max {
                let shown = metrics.statements.to_string();
                self.warn_at(&messages::TOO_MANY_STATEMENTS, opened_at, &[&shown])?;
            }
        }
        if let Some(max) = self.options.limit(Limit::MaxComplexity) {
            if metrics.complexity > max {
                let shown = metrics.complexity.to_string();
                self.warn_at(&messages::TOO_COMPLEX, opened_at, &[&shown])?;
            }
        }

        self.scope.truncate_frames(frames);
        let (last, last_character) = (self.token.line, self.token.character);
        let record = self.scope.current_mut();
        record.last = last;
        record.last_character = last_character;
        self.close_record()?;
        Ok(params)
    }

    fn function_params(&mut self) -> ParseResult<Option<Vec<String>>> {
        let opener = Opener::of_token(&self.next);
        self.advance(Some("("))?;
        if self.next.is_punct(")") {
            self.advance(Some(")"))?;
            return Ok(None);
        }
        let mut params = Vec::new();
        loop {
            if let Some(name) = self.identifier(true)? {
                let at = self.token.position();
                self.declare(&name, Binding::Unused, at)?;
                params.push(name);
            }
            if self.next.is_punct(",") {
                self.comma()?;
            } else {
                self.advance_matching(")", opener)?;
                return Ok(Some(params));
            }
        }
    }

    /// Parse a `catch` clause into its own record.
    pub(crate) fn catch_clause(&mut self) -> ParseResult<()> {
        self.advance(Some("catch"))?;
        let opener = Opener::of_token(&self.next);
        self.advance(Some("("))?;
        let frames = self.scope.frame_depth();
        self.scope.push_frame();

        let exception = if self.next.kind == TokenKind::Identifier {
            Some(self.next.text.clone())
        } else {
            let saw = display(&self.next);
            self.warn_next(&messages::EXPECTED_IDENTIFIER, &[&saw])?;
            None
        };
        self.advance(None)?;
        let at = self.token.position();
        self.advance_matching(")", opener)?;

        let parent = self.scope.current();
        let (breakage, loopage) = (parent.breakage, parent.loopage);
        let nested = parent.metrics.nested_block_depth;
        let mut record = FunctionRecord::new("(catch)".to_string(), FunctionKind::Catch, None, at);
        record.breakage = breakage;
        record.loopage = loopage;
        record.metrics.nested_block_depth = nested;
        self.scope.open(record);
        if let Some(name) = exception {
            self.declare(&name, Binding::Exception, at)?;
        }

        self.block(false, false, false)?;

        self.scope.truncate_frames(frames);
        let (last, last_character) = (self.token.line, self.token.character);
        let record = self.scope.current_mut();
        record.last = last;
        record.last_character = last_character;
        self.close_record()
    }

    /// Bump the cyclomatic complexity of the current function.
    pub(crate) fn add_complexity(&mut self) {
        self.scope.current_mut().metrics.complexity += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Diagnostic;

    fn parse_with(source: &str, options: Options) -> Vec<Diagnostic> {
        let mut parser = Parser::new(
            lexer::split_lines(source),
            options,
            Globals::standard(),
            DiagnosticSink::default(),
        );
        if let Err(abort) = parser.run() {
            let percent = parser.percent_scanned();
            parser.sink.terminate(abort, percent);
        }
        parser.sink.into_diagnostics()
    }

    fn codes(source: &str) -> Vec<String> {
        parse_with(source, Options::default())
            .into_iter()
            .map(|d| d.code)
            .collect()
    }

    #[test]
    fn test_clean_program() {
        assert!(codes("var a = 1;\na += 2;").is_empty());
    }

    #[test]
    fn test_missing_semicolon_severity() {
        let diags = parse_with("var a = 1\nvar b = a;\nb++", Options::default());
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].code, "W033");
        assert_eq!(diags[0].position, SourcePosition::new(1, 10));
        assert_eq!(diags[1].code, "W033");

        let diags = parse_with("var a = 1 a++;", Options::default());
        assert_eq!(diags[0].code, "E058");
        assert_eq!(diags[0].message, "Missing \";\" before statement");
    }

    #[test]
    fn test_expression_statement() {
        assert_eq!(codes("var a = 1;\na;"), ["W030"]);
    }

    #[test]
    fn test_division_chain_parses() {
        assert!(codes("var a = 4, b = 2, c = 1;\na = (a) / b / c;").is_empty());
    }

    #[test]
    fn test_unmatched_brace_at_end() {
        let diags = parse_with("function f() {\n  return 1;\n", Options::default());
        let unmatched = diags.iter().find(|d| d.code == "E019").expect("unmatched brace");
        assert_eq!(unmatched.message, "Unmatched '{'.");
        assert_eq!(unmatched.position, SourcePosition::new(1, 14));
    }

    #[test]
    fn test_stray_closer_is_recovered() {
        let found = codes("var a = 1;\n}\na = 2;");
        assert_eq!(found, ["E021"]);
    }

    #[test]
    fn test_early_end_reported_once() {
        let found = codes("var a = (1 +");
        assert_eq!(found.iter().filter(|c| *c == "E006").count(), 1);
    }

    #[test]
    fn test_nesting_ceiling_aborts() {
        let source = format!("var a = {}1{};", "(".repeat(150), ")".repeat(150));
        let handle = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(move || codes(&source))
            .unwrap();
        let found = handle.join().unwrap();
        assert_eq!(found.last().map(String::as_str), Some("E044"));
    }

    #[test]
    fn test_unreachable_after_return() {
        let found = codes("function f() {\n  return;\n  f();\n}\nf();");
        assert_eq!(found, ["W027"]);
    }

    #[test]
    fn test_label_on_plain_statement() {
        let found = codes("outer: var a = 1;\na++;");
        assert_eq!(found, ["W028"]);
    }

    #[test]
    fn test_confusing_signs() {
        assert!(codes("var a = 1, b = 2;\na = a + -b;").is_empty());
        assert_eq!(codes("var a = 1, b = 2;\na = a + +b;"), ["E047"]);
        assert_eq!(codes("var a = 1, b = 2;\na = a - --b;"), ["E048"]);
    }

    #[test]
    fn test_comma_first_style() {
        let found = codes("var a = 1\n  , b = 2;\na = b;");
        assert_eq!(found, ["W015", "W014"]);
        let mut options = Options::default();
        options.set(Flags::LAXCOMMA, true);
        assert!(parse_with("var a = 1\n  , b = 2;\na = b;", options).is_empty());
    }

    #[test]
    fn test_operator_line_break() {
        let found = codes("var a = 1, b = 2;\na = a\n  + b;");
        assert_eq!(found, ["W014"]);
        let mut options = Options::default();
        options.set(Flags::LAXBREAK, true);
        assert!(parse_with("var a = 1, b = 2;\na = a\n  + b;", options).is_empty());
    }

    #[test]
    fn test_directive_prologue_in_function() {
        let found = codes("function f() {\n  \"use strict\";\n  return 1;\n}\nf();");
        assert!(found.is_empty());
        let found = codes("function f() {\n  \"use strict\";\n  \"use strict\";\n}\nf();");
        assert_eq!(found, ["W034"]);
    }

    #[test]
    fn test_top_level_use_strict() {
        assert_eq!(codes("\"use strict\";\nvar a = 1;\na++;"), ["W097"]);
        let mut options = Options::default();
        options.set(Flags::GLOBALSTRICT, true);
        assert!(parse_with("\"use strict\";\nvar a = 1;\na++;", options).is_empty());
    }

    #[test]
    fn test_max_depth_limit() {
        let mut options = Options::default();
        options.set_limit(Limit::MaxDepth, 1);
        let diags = parse_with(
            "function f(a) {\n  if (a) {\n    if (a) {\n      a++;\n    }\n  }\n}\nf(1);",
            options,
        );
        let found: Vec<&str> = diags.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(found, ["W073"]);
        assert_eq!(diags[0].message, "Blocks are nested too deeply (2).");
    }

    #[test]
    fn test_max_params_limit() {
        let mut options = Options::default();
        options.set_limit(Limit::MaxParams, 2);
        let diags = parse_with("function f(a, b, c) {\n  return a + b + c;\n}\nf();", options);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Too many parameters per function (3).");
        assert_eq!(diags[0].position, SourcePosition::new(1, 11));
    }
}
