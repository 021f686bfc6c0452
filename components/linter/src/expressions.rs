//! Expression handlers
//!
//! The `nud` and `led` functions registered in the [grammar](crate::grammar).
//! Each one parses its operands, runs the checks that apply to the
//! construct and returns the node its caller needs for further checks.
//! Prefix operators keep their operand in `left`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseResult;
use crate::grammar::{Expr, Rule};
use crate::lexer::{self, TokenKind};
use crate::messages;
use crate::options::Flags;
use crate::parser::{display, Fragment, Opener, Parser};
use crate::scope::{Binding, GLOBAL};

static CONSTRUCTOR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]([A-Z0-9_$]*[a-z][A-Za-z0-9_$]*)?$").unwrap());
static PLAIN_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_$][a-zA-Z0-9_$]*$").unwrap());

/// Operators that read confusingly right after `!`.
const CONFUSING_AFTER_BANG: &[&str] = &[
    "<", "<=", "==", "===", "!==", "!=", ">", ">=", "+", "-", "*", "/", "%",
];

fn boxed(node: Expr) -> Option<Box<Expr>> {
    Some(Box::new(node))
}

/// Literals and keywords that stand for themselves.
pub fn literal(_p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    Ok(this)
}

/// A name being read.
pub fn identifier(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    p.reference(&mut this)?;
    Ok(this)
}

/// `arguments`
pub fn arguments(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if p.strict_active() && p.scope.current().is_global() {
        p.warn_at(&messages::STRICT_VIOLATION, this.position(), &[])?;
    }
    Ok(this)
}

/// `this`
pub fn this(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    if p.strict_active() && !p.options.has(Flags::VALIDTHIS) {
        let record = p.scope.current();
        let lowercase_declaration =
            record.is_statement && record.name.chars().next().map_or(false, |c| c > 'Z');
        if lowercase_declaration || record.is_global() {
            p.warn_at(&messages::POSSIBLE_STRICT_VIOLATION, this.position(), &[])?;
        }
    }
    Ok(this)
}

fn assignable_name(left: &Expr) -> bool {
    left.identifier && !left.reserved
}

fn is_member_access(node: &Expr) -> bool {
    node.id == "." || node.id == "["
}

/// `=` and the arithmetic compound assignments.
pub fn assignment(p: &mut Parser, _rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    p.operator_line_break()?;
    let current = p.scope.current_id();

    if left.identifier
        && p.globals.get(&left.value) == Some(false)
        && p.scope.lookup(&left.value) == Some(GLOBAL)
    {
        p.warn_at(&messages::READ_ONLY, left.position(), &[])?;
    } else if left.is_function {
        p.warn_at(&messages::IS_A_FUNCTION, left.position(), &[&left.value])?;
    }
    if left.identifier && p.scope.binding(current, &left.value) == Some(Binding::Const) {
        p.warn_at(&messages::CONST_OVERRIDE, left.position(), &[&left.value])?;
    }

    if is_member_access(&left) {
        let target_ok = match left.left() {
            None => false,
            Some(object) => !(object.value == "arguments" && !p.strict_active()),
        };
        if !target_ok {
            p.warn_at(&messages::BAD_ASSIGNMENT, this.position(), &[])?;
        }
    } else if assignable_name(&left) {
        if p.scope.binding(current, &left.value) == Some(Binding::Exception) {
            p.warn_at(&messages::ASSIGN_EXCEPTION, left.position(), &[])?;
        }
    } else {
        if left.id == "function" {
            p.warn_token(&messages::ASSIGN_TO_INVOCATION, &[])?;
        }
        p.warn_at(&messages::BAD_ASSIGNMENT, this.position(), &[])?;
    }

    this.right = boxed(p.expression(19)?);
    this.left = boxed(left);
    Ok(this)
}

/// Bitwise compound assignments.
pub fn bitwise_assignment(p: &mut Parser, rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    if p.options.has(Flags::BITWISE) {
        p.warn_at(&messages::UNEXPECTED_USE, this.position(), &[rule.id])?;
    }
    p.operator_line_break()?;
    if !is_member_access(&left) && !assignable_name(&left) {
        if left.id == "function" {
            p.warn_token(&messages::ASSIGN_TO_INVOCATION, &[])?;
        }
        p.warn_at(&messages::BAD_ASSIGNMENT, this.position(), &[])?;
    }
    this.right = boxed(p.expression(20)?);
    this.left = boxed(left);
    Ok(this)
}

/// `? :`
pub fn conditional(p: &mut Parser, _rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    p.operator_line_break()?;
    this.right = boxed(p.expression(10)?);
    p.advance(Some(":"))?;
    p.expression(10)?;
    this.left = boxed(left);
    Ok(this)
}

/// Plain binary operators.
pub fn binary(p: &mut Parser, rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    p.operator_line_break()?;
    if rule.id == "in" && left.id == "!" {
        p.warn_at(&messages::CONFUSING_USE, left.position(), &["!"])?;
    }
    this.right = boxed(p.expression(rule.lbp)?);
    this.left = boxed(left);
    Ok(this)
}

/// `|`, `^`, `&` and the shifts.
pub fn bitwise(p: &mut Parser, rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    if p.options.has(Flags::BITWISE) {
        p.warn_at(&messages::UNEXPECTED_USE, this.position(), &[rule.id])?;
    }
    this.right = boxed(p.expression(rule.lbp)?);
    this.left = boxed(left);
    Ok(this)
}

fn is_poor_relation(p: &Parser, node: &Expr) -> bool {
    match node.id {
        "(number)" => lexer::number_value(&node.value, node.value.starts_with("0x") || node.value.starts_with("0X")) == 0.0,
        "(string)" => node.value.is_empty(),
        "null" => !p.options.has(Flags::EQNULL),
        "true" | "false" | "undefined" => true,
        _ => false,
    }
}

/// Comparison operators.
pub fn relation(p: &mut Parser, rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    p.operator_line_break()?;
    let right = p.expression(100)?;

    if left.is_name("NaN") || right.is_name("NaN") {
        p.warn_at(&messages::USE_ISNAN, this.position(), &[])?;
    } else if rule.id == "==" || rule.id == "!=" {
        let strict_form = if rule.id == "==" { "===" } else { "!==" };
        if p.options.has(Flags::EQEQEQ) {
            let null_compare = p.options.has(Flags::EQNULL) && (left.id == "null" || right.id == "null");
            if !null_compare {
                p.warn_at(&messages::EXPECTED_STYLE, this.position(), &[strict_form, rule.id])?;
            }
        } else if is_poor_relation(p, &left) {
            p.warn_at(&messages::USE_STRICT_COMPARISON, this.position(), &[strict_form, &left.value])?;
        } else if is_poor_relation(p, &right) {
            p.warn_at(&messages::USE_STRICT_COMPARISON, this.position(), &[strict_form, &right.value])?;
        }
    }
    if left.id == "!" {
        p.warn_at(&messages::CONFUSING_USE, left.position(), &["!"])?;
    }
    if right.id == "!" {
        p.warn_at(&messages::CONFUSING_USE, right.position(), &["!"])?;
    }

    this.left = boxed(left);
    this.right = boxed(right);
    Ok(this)
}

/// Infix `+`. Adjacent string literals are folded into one.
pub fn plus(p: &mut Parser, _rule: &'static Rule, mut this: Expr, mut left: Expr) -> ParseResult<Expr> {
    p.operator_line_break()?;
    let right = p.expression(130)?;
    if left.id == "(string)" && right.id == "(string)" {
        left.value.push_str(&right.value);
        left.character = right.character;
        if !p.options.has(Flags::SCRIPTURL) && lexer::SCRIPT_URL.is_match(&left.value) {
            p.warn_at(&messages::SCRIPT_URL, left.position(), &[])?;
        }
        return Ok(left);
    }
    this.left = boxed(left);
    this.right = boxed(right);
    Ok(this)
}

/// Infix `+++`.
pub fn confusing_plusses(p: &mut Parser, _rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    p.warn_next(&messages::CONFUSING_PLUSSES, &[])?;
    this.right = boxed(p.expression(130)?);
    this.left = boxed(left);
    Ok(this)
}

/// Prefix `+++`.
pub fn confusing_plusses_prefix(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    p.warn_next(&messages::CONFUSING_PLUSSES, &[])?;
    this.left = boxed(p.expression(150)?);
    Ok(this)
}

/// Infix `---`.
pub fn confusing_minusses(p: &mut Parser, _rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    p.warn_next(&messages::CONFUSING_MINUSSES, &[])?;
    this.right = boxed(p.expression(130)?);
    this.left = boxed(left);
    Ok(this)
}

/// Prefix `---`.
pub fn confusing_minusses_prefix(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    p.warn_next(&messages::CONFUSING_MINUSSES, &[])?;
    this.left = boxed(p.expression(150)?);
    Ok(this)
}

fn check_increment(p: &mut Parser, this: &Expr, operand: &Expr) -> ParseResult<()> {
    if p.options.has(Flags::PLUSPLUS) {
        p.warn_at(&messages::UNEXPECTED_USE, this.position(), &[this.id])?;
    } else if !assignable_name(operand) && !is_member_access(operand) {
        p.warn_at(&messages::BAD_OPERAND, this.position(), &[])?;
    }
    Ok(())
}

/// Prefix `+`, `-`, `++`, `--`, `typeof` and `void`.
pub fn unary(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    let operand = p.expression(150)?;
    if this.id == "++" || this.id == "--" {
        check_increment(p, &this, &operand)?;
    }
    this.left = boxed(operand);
    Ok(this)
}

/// Postfix `++` and `--`.
pub fn postfix(p: &mut Parser, _rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    check_increment(p, &this, &left)?;
    this.left = boxed(left);
    Ok(this)
}

/// `delete`
pub fn delete(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    let operand = p.expression(150)?;
    if !is_member_access(&operand) {
        p.warn_next(&messages::DELETE_VARIABLE, &[])?;
    }
    this.left = boxed(operand);
    Ok(this)
}

/// `~`
pub fn bitwise_not(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    if p.options.has(Flags::BITWISE) {
        p.warn_at(&messages::UNEXPECTED, this.position(), &["~"])?;
    }
    this.left = boxed(p.expression(150)?);
    Ok(this)
}

/// `!`
pub fn not(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    let operand = p.expression(150)?;
    if CONFUSING_AFTER_BANG.contains(&operand.id) {
        p.warn_at(&messages::CONFUSING_USE, this.position(), &["!"])?;
    }
    this.left = boxed(operand);
    Ok(this)
}

/// `new`
pub fn new(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    let constructor = p.expression(155)?;
    if constructor.id == "function" {
        if !p.options.has(Flags::SUPERNEW) {
            p.warn_at(&messages::WEIRD_CONSTRUCTION, this.position(), &[])?;
        }
    } else if constructor.identifier {
        match constructor.value.as_str() {
            "Number" | "String" | "Boolean" | "Math" | "JSON" => {
                let at = p.prev.position();
                p.warn_at(&messages::PRIMITIVE_CONSTRUCTOR, at, &[&constructor.value])?;
            }
            "Function" => {
                if !p.options.has(Flags::EVIL) {
                    p.warn_next(&messages::FUNCTION_CONSTRUCTOR, &[])?;
                }
            }
            "Date" | "RegExp" => {}
            name => {
                let capitalized = name.chars().next().map_or(false, |c| c.is_ascii_uppercase());
                if p.newcap_enabled() && !capitalized && !p.scope.is_global_name(name) {
                    p.warn_token(&messages::CONSTRUCTOR_CASE, &[])?;
                }
            }
        }
    } else if !matches!(constructor.id, "." | "[" | "(") {
        p.warn_token(&messages::BAD_CONSTRUCTOR, &[])?;
    }

    if !p.next.is_punct("(") && !p.options.has(Flags::SUPERNEW) {
        let value = display(&p.token);
        p.warn_token(&messages::MISSING_INVOCATION, &[&value])?;
    }
    this.left = boxed(constructor);
    Ok(this)
}

/// `.` member access.
pub fn member(p: &mut Parser, _rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    let name = p.identifier(false)?;
    if let Some(name) = name.as_deref() {
        p.count_member(name)?;
        if name == "hasOwnProperty" && p.next.is_punct("=") {
            p.warn_next(&messages::BAD_NAME, &[])?;
        }
        let evil = p.options.has(Flags::EVIL);
        if left.value == "arguments" && (name == "callee" || name == "caller") {
            if p.options.has(Flags::NOARG) {
                p.warn_at(&messages::AVOID_ARGUMENTS, left.position(), &[name])?;
            } else if p.strict_active() {
                p.warn_next(&messages::STRICT_VIOLATION, &[])?;
            }
        } else if !evil && left.value == "document" && (name == "write" || name == "writeln") {
            p.warn_at(&messages::DOCUMENT_WRITE, left.position(), &[])?;
        }
        if !evil && (name == "eval" || name == "execScript") {
            p.warn_next(&messages::EVAL_IS_EVIL, &[])?;
        }
    }
    this.member = name;
    this.left = boxed(left);
    Ok(this)
}

fn evaluating_target(callee: &Expr) -> Option<&str> {
    match callee.value.as_str() {
        "eval" | "execScript" | "setTimeout" | "setInterval" => Some(callee.value.as_str()),
        "." if callee.left().map_or(false, |object| object.value == "window") => {
            match callee.member.as_deref() {
                Some(name @ ("setTimeout" | "setInterval")) => Some(name),
                _ => None,
            }
        }
        _ => None,
    }
}

/// `(` as a call.
pub fn call(p: &mut Parser, _rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    let opener = Opener::of_expr(&this);
    if p.options.has(Flags::IMMED) && !left.immed && left.id == "function" {
        p.warn_next(&messages::WRAP_IMMEDIATE, &[])?;
    }
    if left.id == "(identifier)" && CONSTRUCTOR_NAME.is_match(&left.value) {
        match left.value.as_str() {
            "Number" | "String" | "Boolean" | "Date" | "Object" => {}
            "Math" => p.warn_at(&messages::MATH_NOT_FUNCTION, left.position(), &[])?,
            _ if p.newcap_enabled() => p.warn_at(&messages::MISSING_NEW, left.position(), &[])?,
            _ => {}
        }
    }

    let mut args = Vec::new();
    if !p.next.is_punct(")") {
        loop {
            args.push(p.expression(10)?);
            if !p.next.is_punct(",") {
                break;
            }
            p.comma()?;
        }
    }
    p.advance_matching(")", opener)?;

    if left.value == "parseInt" && args.len() == 1 {
        p.warn_token(&messages::MISSING_RADIX, &[])?;
    }
    let text_argument = args.first().filter(|arg| arg.id == "(string)");
    let evil = p.options.has(Flags::EVIL);
    match left.value.as_str() {
        "eval" | "Function" | "execScript" if !evil => {
            p.warn_at(&messages::EVAL_IS_EVIL, left.position(), &[])?;
        }
        _ if !evil && text_argument.is_some() && evaluating_target(&left).map_or(false, |t| t.starts_with("set")) => {
            p.warn_at(&messages::IMPLIED_EVAL, left.position(), &[])?;
        }
        _ => {}
    }
    if let (Some(argument), Some(target)) = (text_argument, evaluating_target(&left)) {
        p.fragments.push(Fragment {
            scope: target.to_string(),
            source: argument.value.clone(),
        });
    }

    if !left.identifier && !matches!(left.id, "." | "[" | "(" | "&&" | "||" | "?") {
        p.warn_at(&messages::BAD_INVOCATION, left.position(), &[])?;
    }
    this.left = boxed(left);
    Ok(this)
}

/// `(` as grouping.
pub fn group(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    let opener = Opener::of_expr(&this);
    if p.next.is_word("function") {
        p.wrap_pending = true;
    }
    let inner = p.expression(0)?;
    while p.next.is_punct(",") {
        p.warn_next(&messages::COMMA_OPERATOR, &[])?;
        p.comma()?;
        p.expression(0)?;
    }
    p.advance_matching(")", opener)?;

    if p.options.has(Flags::IMMED) && inner.id == "function" && !p.next.is_punct("(") {
        let bound = p.next.is_punct(".") && {
            let after = p.peek(0)?;
            after.text == "call" || after.text == "apply"
        };
        if !bound {
            p.warn_at(&messages::UNNECESSARY_WRAP, this.position(), &[])?;
        }
    }
    Ok(inner)
}

/// `[` as a subscript.
pub fn subscript(p: &mut Parser, _rule: &'static Rule, mut this: Expr, left: Expr) -> ParseResult<Expr> {
    let opener = Opener::of_expr(&this);
    let key = p.expression(0)?;
    if key.id == "(string)" {
        if !p.options.has(Flags::EVIL) && (key.value == "eval" || key.value == "execScript") {
            p.warn_at(&messages::EVAL_IS_EVIL, this.position(), &[])?;
        }
        p.count_member(&key.value)?;
        if !p.options.has(Flags::SUB)
            && PLAIN_NAME.is_match(&key.value)
            && !crate::grammar::GRAMMAR.is_reserved(&key.value)
        {
            let at = p.prev.position();
            p.warn_at(&messages::DOT_NOTATION, at, &[&key.value])?;
        }
    }
    p.advance_matching("]", opener)?;
    this.member = (key.id == "(string)").then(|| key.value.clone());
    this.left = boxed(left);
    this.right = boxed(key);
    Ok(this)
}

/// Array literal.
pub fn array(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    let opener = Opener::of_expr(&this);
    let es5 = p.options.has(Flags::ES5);
    while p.next.kind != TokenKind::End {
        while p.next.is_punct(",") {
            if !es5 {
                p.warn_next(&messages::EXTRA_COMMA, &[])?;
            }
            p.advance(Some(","))?;
        }
        if p.next.is_punct("]") {
            break;
        }
        p.expression(10)?;
        if !p.next.is_punct(",") {
            break;
        }
        p.comma()?;
        if p.next.is_punct("]") && !es5 {
            p.warn_token(&messages::EXTRA_COMMA, &[])?;
            break;
        }
    }
    p.advance_matching("]", opener)?;
    Ok(this)
}

#[derive(Default)]
struct PropertySeen {
    plain: bool,
    getter: bool,
    setter: Option<core_types::SourcePosition>,
}

fn property_name(p: &mut Parser) -> ParseResult<Option<String>> {
    if let Some(name) = p.optional_identifier(true)? {
        return Ok(Some(name));
    }
    match p.next.kind {
        TokenKind::String => {
            p.advance(None)?;
            Ok(Some(display(&p.token)))
        }
        TokenKind::Number => {
            p.advance(None)?;
            let text = p.token.text.clone();
            let hex = text.starts_with("0x") || text.starts_with("0X");
            Ok(Some(lexer::number_value(&text, hex).to_string()))
        }
        _ => Ok(None),
    }
}

fn accessor_ahead(p: &mut Parser, word: &str) -> ParseResult<bool> {
    Ok(p.next.is_word(word) && !p.peek(0)?.is_punct(":"))
}

fn accessor(p: &mut Parser, keyword: &str) -> ParseResult<Option<String>> {
    p.advance(Some(keyword))?;
    if !p.options.has(Flags::ES5) {
        p.warn_next(&messages::ES5_ACCESSOR, &[])?;
    }
    let name = property_name(p)?;
    if name.is_none() {
        p.warn_next(&messages::MISSING_PROPERTY_NAME, &[])?;
    }
    Ok(name)
}

/// Object literal.
pub fn object(p: &mut Parser, _rule: &'static Rule, this: Expr) -> ParseResult<Expr> {
    let opener = Opener::of_expr(&this);
    let mut props: indexmap::IndexMap<String, PropertySeen> = indexmap::IndexMap::new();

    loop {
        if p.next.is_punct("}") {
            break;
        }
        let name = if accessor_ahead(p, "get")? {
            let name = accessor(p, "get")?;
            let key = name.clone().unwrap_or_default();
            let seen = props.entry(key.clone()).or_default();
            let duplicate = seen.plain || seen.getter;
            seen.getter = true;
            if duplicate {
                p.warn_next(&messages::DUPLICATE_MEMBER, &[&key])?;
            }
            let at = p.next.position();
            let params = p.function_body(None, false)?;
            if let Some(first) = params.as_ref().and_then(|list| list.first()) {
                p.warn_at(&messages::GETTER_PARAMETER, at, &[first, &key])?;
            }
            name
        } else if accessor_ahead(p, "set")? {
            let name = accessor(p, "set")?;
            let key = name.clone().unwrap_or_default();
            let at = p.next.position();
            let seen = props.entry(key.clone()).or_default();
            let duplicate = seen.plain || seen.setter.is_some();
            seen.setter = Some(at);
            if duplicate {
                p.warn_next(&messages::DUPLICATE_MEMBER, &[&key])?;
            }
            let params = p.function_body(None, false)?;
            if params.as_ref().map_or(true, |list| list.len() != 1) {
                p.warn_at(&messages::SETTER_PARAMETER, at, &[&key])?;
            }
            name
        } else {
            let name = match property_name(p)? {
                Some(name) => name,
                None => break,
            };
            let seen = props.entry(name.clone()).or_default();
            let duplicate = seen.plain || seen.getter || seen.setter.is_some();
            seen.plain = true;
            if duplicate {
                p.warn_next(&messages::DUPLICATE_MEMBER, &[&name])?;
            }
            p.advance(Some(":"))?;
            p.expression(10)?;
            Some(name)
        };

        if let Some(name) = name.as_deref() {
            p.count_member(name)?;
        }
        if !p.next.is_punct(",") {
            break;
        }
        p.comma()?;
        if p.next.is_punct(",") || (p.next.is_punct("}") && !p.options.has(Flags::ES5)) {
            p.warn_token(&messages::EXTRA_COMMA, &[])?;
        }
    }
    p.advance_matching("}", opener)?;

    if p.options.has(Flags::ES5) {
        for seen in props.values() {
            if let (Some(at), false) = (seen.setter, seen.getter) {
                p.warn_at(&messages::SETTER_WITHOUT_GETTER, at, &[])?;
            }
        }
    }
    Ok(this)
}

/// Function expression.
pub fn function(p: &mut Parser, _rule: &'static Rule, mut this: Expr) -> ParseResult<Expr> {
    this.immed = std::mem::take(&mut p.wrap_pending);
    let name = p.optional_identifier(false)?;
    p.function_body(name.as_deref(), false)?;
    if p.scope.current().loopage > 0 && !p.options.has(Flags::LOOPFUNC) {
        p.warn_next(&messages::FUNCTION_IN_LOOP, &[])?;
    }
    Ok(this)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticSink;
    use crate::environments::Globals;
    use crate::options::Options;

    fn run(source: &str, options: Options) -> (Vec<String>, Vec<Fragment>) {
        let mut parser = Parser::new(
            lexer::split_lines(source),
            options,
            Globals::standard(),
            DiagnosticSink::default(),
        );
        parser.run().expect("run completes");
        let fragments = std::mem::take(&mut parser.fragments);
        let codes = parser.sink.into_diagnostics().into_iter().map(|d| d.code).collect();
        (codes, fragments)
    }

    fn codes(source: &str) -> Vec<String> {
        run(source, Options::default()).0
    }

    fn codes_with(source: &str, flags: &[Flags]) -> Vec<String> {
        let mut options = Options::default();
        for flag in flags {
            options.set(*flag, true);
        }
        run(source, options).0
    }

    #[test]
    fn test_string_concatenation_folds() {
        assert_eq!(codes("var a = \"javascript\" + \":alert(1)\";\na();"), ["W107"]);
        assert!(codes_with("var a = \"javascript\" + \":x\";\na();", &[Flags::SCRIPTURL]).is_empty());
    }

    #[test]
    fn test_poor_relations() {
        assert_eq!(codes("var a = 1;\nif (a == null) { a = 2; }"), ["W041"]);
        assert!(codes_with("var a = 1;\nif (a == null) { a = 2; }", &[Flags::EQNULL]).is_empty());
        assert!(codes("var a = 1;\nif (a == 2) { a = 3; }").is_empty());
        assert_eq!(codes_with("var a = 1;\nif (a == 2) { a = 3; }", &[Flags::EQEQEQ]), ["W116"]);
    }

    #[test]
    fn test_nan_comparison() {
        assert_eq!(codes("var a = 1;\nif (a === NaN) { a = 2; }"), ["W019"]);
    }

    #[test]
    fn test_bad_operands() {
        assert_eq!(codes("var a = 1;\na = 1++;"), ["W017"]);
        assert_eq!(codes_with("var a = 1;\na++;", &[Flags::PLUSPLUS]), ["W016"]);
        assert_eq!(codes("var a = {};\ndelete a;"), ["W051"]);
        assert!(codes("var a = {};\ndelete a.b;").is_empty());
    }

    #[test]
    fn test_constructor_checks() {
        assert_eq!(codes("var a = new Number(1);\na();"), ["W053"]);
        assert_eq!(codes("var a = new Date;\na();"), ["W058"]);
        assert_eq!(codes_with("var a = new thing();\na();", &[Flags::NEWCAP]), ["W055"]);
        assert_eq!(codes_with("var a = Thing();\na();", &[Flags::NEWCAP]), ["W064"]);
        assert_eq!(codes("var a = new Array();\na();"), ["W009"]);
        assert_eq!(codes("var a = new Object();\na();"), ["W010"]);
    }

    #[test]
    fn test_math_is_not_callable() {
        assert_eq!(codes("Math();"), ["W063"]);
    }

    #[test]
    fn test_member_checks() {
        assert_eq!(codes_with("function f() {\n  return arguments.callee;\n}\nf();", &[Flags::NOARG]), ["W059"]);
        assert_eq!(codes("document.write(\"x\");"), ["W060"]);
        assert!(codes_with("document.write(\"x\");", &[Flags::EVIL]).is_empty());
    }

    #[test]
    fn test_eval_family() {
        let (found, fragments) = run("eval(\"var x = 1;\");", Options::default());
        assert_eq!(found, ["W061"]);
        assert_eq!(fragments, [Fragment { scope: "eval".into(), source: "var x = 1;".into() }]);

        let (found, fragments) = run("setTimeout(\"go();\", 10);", Options::default());
        assert_eq!(found, ["W066"]);
        assert_eq!(fragments.len(), 1);

        let (found, fragments) = run("window.setInterval(\"go();\", 10);", Options::default());
        assert_eq!(found, ["W066"]);
        assert_eq!(fragments[0].scope, "setInterval");
    }

    #[test]
    fn test_parse_int_radix() {
        assert_eq!(codes("var a = parseInt(\"1\");\na();"), ["W065"]);
        assert!(codes("var a = parseInt(\"1\", 10);\na();").is_empty());
    }

    #[test]
    fn test_dot_notation() {
        assert_eq!(codes("var a = {};\na[\"b\"] = 1;"), ["W069"]);
        assert!(codes("var a = {};\na[\"b-c\"] = 1;").is_empty());
        assert!(codes_with("var a = {};\na[\"b\"] = 1;", &[Flags::SUB]).is_empty());
    }

    #[test]
    fn test_object_literal_checks() {
        assert_eq!(codes("var a = {b: 1, b: 2};\na();"), ["W075"]);
        assert_eq!(codes("var a = {b: 1,};\na();"), ["W070"]);
        assert!(codes_with("var a = {b: 1,};\na();", &[Flags::ES5]).is_empty());
        assert_eq!(
            codes_with("var a = {set b(v) { this.c = v; }};\na();", &[Flags::ES5]),
            ["W078"]
        );
        assert_eq!(
            codes_with("var a = {get b(v) { return v; }, set b(v) { this.c = v; }};\na();", &[Flags::ES5]),
            ["W076"]
        );
    }

    #[test]
    fn test_array_extra_comma() {
        assert_eq!(codes("var a = [1, 2,];\na();"), ["W070"]);
    }

    #[test]
    fn test_wrapping_immediate_functions() {
        assert_eq!(codes_with("var a = function () { return 1; }();\na();", &[Flags::IMMED]), ["W062"]);
        assert!(codes_with("var a = (function () { return 1; }());\na();", &[Flags::IMMED]).is_empty());
        assert_eq!(codes_with("var a = (function () { return 1; });\na();", &[Flags::IMMED]), ["W068"]);
    }

    #[test]
    fn test_comma_operator_in_parens() {
        assert_eq!(codes("var a = 1, b;\nb = (a, a);"), ["W094"]);
    }

    #[test]
    fn test_assignment_targets() {
        assert_eq!(codes("var a = 1;\n1 = a;"), ["W031"]);
        assert_eq!(codes("undefined = 1;"), ["W031"]);
        assert_eq!(codes("function f() {}\nf = 1;"), ["W021"]);
    }

    #[test]
    fn test_read_only_global() {
        let mut options = Options::default();
        options.set(Flags::UNDEF, true);
        let (found, _) = run("NaN = 1;", options);
        assert_eq!(found, ["W020"]);
    }

    #[test]
    fn test_exception_parameter_assignment() {
        assert_eq!(codes("try {\n  go();\n} catch (e) {\n  e = 1;\n}"), ["W022"]);
    }

    #[test]
    fn test_functions_in_loops() {
        let source = "var i, fs = [];\nfor (i = 0; i < 3; i++) {\n  fs.push(function () { return i; });\n}";
        assert_eq!(codes(source), ["W083"]);
        assert!(codes_with(source, &[Flags::LOOPFUNC]).is_empty());
    }

    #[test]
    fn test_confusing_bang() {
        assert_eq!(codes("var a = 1, b = 2;\nif (!(a < b)) { a = b; }"), ["W018"]);
    }
}
