//! Statement handlers
//!
//! The `fud` functions registered in the [grammar](crate::grammar). They
//! run when a keyword starts a statement and consume the whole statement
//! except its terminating `;`, which [`Parser::statement`] handles.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseResult;
use crate::expressions;
use crate::grammar::{Expr, Rule, RuleFlags};
use crate::lexer::TokenKind;
use crate::messages;
use crate::options::Flags;
use crate::parser::{display, Opener, Parser, Start};
use crate::scope::Binding;

static FALLS_THROUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*/\*\s*falls\sthrough\s*\*/\s*$").unwrap());

/// Statements after which control cannot fall into the next `case`.
const LEAVES_CASE: &[&str] = &["break", "case", "continue", "return", "switch", "throw"];

/// A `{` where only an expression statement could start.
pub fn stray_block(p: &mut Parser, rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    p.warn_token(&messages::BLOCK_NOT_STATEMENT, &[])?;
    expressions::object(p, rule, this)
}

/// Parse the declarator list of a `var` or `const`.
///
/// With `prefix`, only a single name is read, as in `for (var k in o)`.
pub(crate) fn declarations(p: &mut Parser, prefix: bool, constant: bool) -> ParseResult<()> {
    if !constant {
        let record = p.scope.current();
        if record.has_var && p.options.has(Flags::ONEVAR) {
            p.warn_next(&messages::TOO_MANY_VARS, &[])?;
        } else if !record.is_global() {
            p.scope.current_mut().has_var = true;
        }
    }

    loop {
        let name = match p.identifier(false)? {
            Some(name) => name,
            None => break,
        };
        let current = p.scope.current_id();
        let redeclares_const = p.scope.binding(current, &name) == Some(Binding::Const);
        if redeclares_const && (constant || p.options.has(Flags::ESNEXT)) {
            p.warn_token(&messages::CONST_REDECLARED, &[&name])?;
        }
        if p.scope.current().is_global() && p.globals.get(&name) == Some(false) {
            p.warn_token(&messages::REDEFINITION, &[&name])?;
        }
        let at = p.token.position();
        let binding = if constant { Binding::Const } else { Binding::Unused };
        p.declare(&name, binding, at)?;
        if prefix {
            break;
        }

        if constant && !p.next.is_punct("=") {
            p.warn_token(&messages::CONST_UNDEFINED, &[&name])?;
        }
        if p.next.is_punct("=") {
            p.advance(Some("="))?;
            if p.next.is_word("undefined") {
                p.warn_token(&messages::INIT_UNDEFINED, &[&name])?;
            }
            if p.next.kind == TokenKind::Identifier && p.peek(0)?.is_punct("=") {
                let target = display(&p.next);
                let message = if constant {
                    &messages::BAD_CONST_DECLARATION
                } else {
                    &messages::BAD_DECLARATION
                };
                p.warn_next(message, &[&target])?;
            }
            p.expression(0)?;
        }
        if !p.next.is_punct(",") {
            break;
        }
        p.comma()?;
    }
    Ok(())
}

/// `var`
pub fn var(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    declarations(p, false, false)?;
    Ok(this)
}

/// `const`
pub fn constant(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if !p.options.has(Flags::ESNEXT) {
        p.warn_token(&messages::ESNEXT_ONLY, &["const"])?;
    }
    declarations(p, false, true)?;
    Ok(this)
}

/// Function declaration.
pub fn function(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if p.in_block {
        p.warn_token(&messages::FUNCTION_IN_BLOCK, &[])?;
    }
    let name = p.identifier(false)?;
    if let Some(name) = name.as_deref() {
        let current = p.scope.current_id();
        if p.options.has(Flags::ESNEXT) && p.scope.binding(current, name) == Some(Binding::Const) {
            p.warn_token(&messages::CONST_REDECLARED, &[name])?;
        }
        let at = p.token.position();
        p.declare(name, Binding::UnusedFunction, at)?;
    }
    p.function_body(name.as_deref(), true)?;
    if p.next.is_punct("(") && p.next.line == p.token.line {
        p.warn_next(&messages::FUNCTION_NOT_INVOCABLE, &[])?;
    }
    Ok(this)
}

/// Parse `( condition )` and return nothing; the opener is the `(`.
fn parenthesized_condition(p: &mut Parser) -> ParseResult<()> {
    let opener = Opener::of_token(&p.next);
    p.advance(Some("("))?;
    p.condition()?;
    p.advance_matching(")", opener)
}

/// `if` / `else`
pub fn if_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    p.add_complexity();
    parenthesized_condition(p)?;
    p.block(true, true, false)?;
    if p.next.is_word("else") {
        p.advance(Some("else"))?;
        if p.next.is_word("if") || p.next.is_word("switch") {
            p.statement()?;
        } else {
            p.block(true, true, false)?;
        }
    }
    Ok(this)
}

/// `try` with its `catch` and `finally` clauses.
pub fn try_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    p.block(false, false, false)?;
    let mut caught = false;
    if p.next.is_word("catch") {
        p.add_complexity();
        p.catch_clause()?;
        caught = true;
    }
    if p.next.is_word("finally") {
        p.advance(Some("finally"))?;
        p.block(false, false, false)?;
    } else if !caught {
        let saw = display(&p.next);
        p.warn_next(&messages::EXPECTED_TOKEN, &["catch", &saw])?;
    }
    Ok(this)
}

fn enter_loop(p: &mut Parser) {
    let record = p.scope.current_mut();
    record.breakage += 1;
    record.loopage += 1;
    p.add_complexity();
}

fn leave_loop(p: &mut Parser) {
    let record = p.scope.current_mut();
    record.breakage = record.breakage.saturating_sub(1);
    record.loopage = record.loopage.saturating_sub(1);
}

/// `while`
pub fn while_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    enter_loop(p);
    parenthesized_condition(p)?;
    p.block(true, true, false)?;
    leave_loop(p);
    Ok(this)
}

/// `with`
pub fn with_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if p.strict_active() {
        p.warn_token(&messages::WITH_IN_STRICT, &[])?;
    } else if !p.options.has(Flags::WITHSTMT) {
        p.warn_token(&messages::AVOID_WITH, &[])?;
    }
    let opener = Opener::of_token(&p.next);
    p.advance(Some("("))?;
    p.expression(0)?;
    p.advance_matching(")", opener)?;
    p.block(true, true, false)?;
    Ok(this)
}

fn falls_through(p: &Parser) -> bool {
    p.next
        .line
        .checked_sub(1)
        .and_then(|line| p.line_text(line))
        .map_or(false, |text| FALLS_THROUGH.is_match(text))
}

fn leaves_case(p: &Parser) -> bool {
    p.scope
        .current()
        .verb
        .as_deref()
        .map_or(false, |verb| LEAVES_CASE.contains(&verb))
}

/// `switch`
pub fn switch_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    p.scope.current_mut().breakage += 1;
    let result = switch_body(p, &this);
    let record = p.scope.current_mut();
    record.breakage = record.breakage.saturating_sub(1);
    result?;
    Ok(this)
}

fn switch_body(p: &mut Parser, this: &Expr) -> ParseResult<()> {
    let opener = Opener::of_token(&p.next);
    p.advance(Some("("))?;
    let subject = p.expression(20)?;
    p.advance_matching(")", opener)?;
    let brace = Opener::of_token(&p.next);
    p.advance(Some("{"))?;

    let mut cases = 0usize;
    let mut seen_default = false;
    let mut in_labels = false;
    loop {
        match p.next_id() {
            label @ ("case" | "default") => {
                if !leaves_case(p) && !falls_through(p) {
                    p.warn_token(&messages::MISSING_BREAK, &[label])?;
                }
                if label == "default" {
                    if seen_default {
                        p.warn_next(&messages::UNEXPECTED, &["default"])?;
                    }
                    seen_default = true;
                }
                p.advance(Some(label))?;
                if label == "case" {
                    p.expression(20)?;
                    cases += 1;
                    p.add_complexity();
                }
                in_labels = true;
                p.advance(Some(":"))?;
                if label == "case" {
                    p.scope.current_mut().verb = Some("case".to_string());
                }
            }
            "}" => {
                p.advance_matching("}", brace)?;
                if (cases == 1 || subject.id == "true" || subject.id == "false")
                    && !p.options.has(Flags::ONECASE)
                {
                    p.warn_at(&messages::ONE_CASE, this.position(), &[])?;
                }
                p.scope.current_mut().verb = None;
                return Ok(());
            }
            "(end)" => {
                p.warn_next(&messages::MISSING_CLOSE, &["}"])?;
                return Ok(());
            }
            _ if in_labels => match crate::grammar::rule_for(&p.token).id {
                "," => {
                    p.warn_next(&messages::DUPLICATE_CASE_LABEL, &[])?;
                    return Ok(());
                }
                ":" => {
                    in_labels = false;
                    p.statements()?;
                }
                _ => {
                    p.warn_token(&messages::MISSING_CASE_COLON, &[])?;
                    return Ok(());
                }
            },
            _ if p.token.is_punct(":") => {
                p.advance(Some(":"))?;
                p.warn_token(&messages::UNEXPECTED, &[":"])?;
                p.statements()?;
            }
            _ => {
                let saw = display(&p.next);
                p.warn_next(&messages::EXPECTED_TOKEN, &["case", &saw])?;
                return Ok(());
            }
        }
    }
}

/// `debugger`
pub fn debugger(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if !p.options.has(Flags::DEBUG) {
        p.warn_next(&messages::DEBUGGER, &[])?;
    }
    Ok(this)
}

/// `do ... while`
pub fn do_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    enter_loop(p);
    p.block(true, false, false)?;
    p.advance(Some("while"))?;
    parenthesized_condition(p)?;
    leave_loop(p);
    Ok(this)
}

fn clause_list(p: &mut Parser) -> ParseResult<()> {
    loop {
        p.parse_expression(0, Start::Clause)?;
        if !p.next.is_punct(",") {
            return Ok(());
        }
        p.comma()?;
    }
}

/// `for` and `for ... in`
pub fn for_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    enter_loop(p);
    let opener = Opener::of_token(&p.next);
    p.advance(Some("("))?;

    let declares = p.next.is_word("var");
    let iterates = p.peek(if declares { 1 } else { 0 })?.is_word("in");
    if iterates {
        if declares {
            p.advance(Some("var"))?;
            declarations(p, true, false)?;
        } else {
            let name = p.next.text.clone();
            let current = p.scope.current_id();
            match p.scope.binding(current, &name) {
                Some(Binding::Unused) => p.scope.set_binding(current, &name, Binding::Var),
                Some(Binding::Var) => {}
                _ => {
                    let shown = display(&p.next);
                    p.warn_next(&messages::BAD_FOR_IN_VARIABLE, &[&shown])?;
                }
            }
            p.advance(None)?;
        }
        p.advance(Some("in"))?;
        p.expression(20)?;
        p.advance_matching(")", opener)?;
        let body = p.block(true, true, false)?;
        let filtered = match body.as_slice() {
            [] => true,
            [Some(only)] => only.value == "if",
            _ => false,
        };
        if p.options.has(Flags::FORIN) && !filtered {
            p.warn_at(&messages::FOR_IN_FILTER, this.position(), &[])?;
        }
    } else {
        if !p.next.is_punct(";") {
            if declares {
                p.advance(Some("var"))?;
                declarations(p, false, false)?;
            } else {
                clause_list(p)?;
            }
        }
        p.no_line_break()?;
        p.advance(Some(";"))?;
        if !p.next.is_punct(";") {
            p.condition()?;
        }
        p.no_line_break()?;
        p.advance(Some(";"))?;
        if p.next.is_punct(";") {
            p.warn_next(&messages::EXPECTED_TOKEN, &[")", ";"])?;
        }
        if !p.next.is_punct(")") {
            clause_list(p)?;
        }
        p.advance_matching(")", opener)?;
        p.block(true, true, false)?;
    }
    leave_loop(p);
    Ok(this)
}

/// Check the optional label of `break` or `continue`; returns whether one was read.
fn jump_label(p: &mut Parser) -> ParseResult<bool> {
    let labelled = p.next.kind == TokenKind::Identifier
        && p.next.line == p.token.line
        && !crate::grammar::rule_for(&p.next).has(RuleFlags::RESERVED);
    if !labelled {
        return Ok(false);
    }
    let label = p.next.text.clone();
    let current = p.scope.current_id();
    if p.scope.binding(current, &label) != Some(Binding::Label) {
        p.warn_next(&messages::NOT_A_LABEL, &[&label])?;
    } else if p.scope.lookup(&label) != Some(current) {
        p.warn_next(&messages::LABEL_OUT_OF_SCOPE, &[&label])?;
    }
    p.advance(None)?;
    Ok(true)
}

/// `break`
pub fn break_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if p.scope.current().breakage == 0 {
        p.warn_next(&messages::UNEXPECTED, &[&this.value])?;
    }
    if !p.options.has(Flags::ASI) {
        p.no_line_break()?;
    }
    jump_label(p)?;
    p.reachable("break")?;
    Ok(this)
}

/// `continue`
pub fn continue_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if p.scope.current().breakage == 0 {
        p.warn_next(&messages::UNEXPECTED, &[&this.value])?;
    }
    if !p.options.has(Flags::ASI) {
        p.no_line_break()?;
    }
    if !jump_label(p)? && p.next.is_punct(";") && p.scope.current().loopage == 0 {
        p.warn_next(&messages::UNEXPECTED, &[&this.value])?;
    }
    p.reachable("continue")?;
    Ok(this)
}

/// `return`
pub fn return_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if p.next.line == this.line {
        if p.next.kind == TokenKind::RegExp {
            p.warn_next(&messages::WRAP_REGEXP, &[])?;
        }
        let ends = p.next.is_punct(";")
            || p.next.kind == TokenKind::End
            || crate::grammar::rule_for(&p.next).has(RuleFlags::REACH);
        if !ends {
            if p.peek(0)?.is_punct("=") && !p.options.has(Flags::BOSS) {
                let at = core_types::SourcePosition::new(p.token.line, p.token.character + 1);
                p.warn_at(&messages::RETURN_ASSIGNMENT, at, &[])?;
            }
            p.expression(0)?;
        }
    } else if !p.options.has(Flags::ASI) {
        p.no_line_break()?;
    }
    p.reachable("return")?;
    Ok(this)
}

/// `throw`
pub fn throw_statement(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    p.no_line_break()?;
    p.expression(20)?;
    p.reachable("throw")?;
    Ok(this)
}
