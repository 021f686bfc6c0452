//! Grammar table
//!
//! Every token the parser can meet maps to a [`Rule`]: a left binding power
//! plus up to three handlers. `nud` runs when the token starts an
//! expression, `led` when it follows a left operand and `fud` when it
//! starts a statement. The table is built once and shared by every run.

use bitflags::bitflags;
use core_types::SourcePosition;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::ParseResult;
use crate::expressions as ex;
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;
use crate::statements as st;

/// Handler for a token in prefix or statement position.
pub type NudFn = fn(&mut Parser, &'static Rule, Expr) -> ParseResult<Expr>;

/// Handler for a token in infix position; receives the token and its left operand.
pub type LedFn = fn(&mut Parser, &'static Rule, Expr, Expr) -> ParseResult<Expr>;

bitflags! {
    /// Static properties of a rule.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RuleFlags: u8 {
        /// A reserved word
        const RESERVED = 1 << 0;
        /// Ends a statement list
        const REACH = 1 << 1;
        /// A statement that needs no semicolon
        const BLOCK = 1 << 2;
        /// A statement that may carry a label
        const LABELLED = 1 << 3;
        /// An expression that is useful as a statement on its own
        const EXPS = 1 << 4;
    }
}

/// Parsing behavior of one token id.
#[derive(Debug)]
pub struct Rule {
    /// Token id: the punctuator or word, or a class name such as `(number)`
    pub id: &'static str,
    /// Left binding power
    pub lbp: u8,
    /// Prefix handler
    pub nud: Option<NudFn>,
    /// Infix handler
    pub led: Option<LedFn>,
    /// Statement handler
    pub fud: Option<NudFn>,
    /// Static properties
    pub flags: RuleFlags,
}

impl Rule {
    fn new(id: &'static str, lbp: u8) -> Self {
        Rule {
            id,
            lbp,
            nud: None,
            led: None,
            fud: None,
            flags: RuleFlags::empty(),
        }
    }

    /// Whether the rule has a flag
    pub fn has(&self, flag: RuleFlags) -> bool {
        self.flags.contains(flag)
    }
}

/// A parsed operand or operator, checked as it is built.
///
/// Nodes carry only what later checks need: the id and text of the token
/// they came from, where it was, and the operands of an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Rule id of the token
    pub id: &'static str,
    /// Decoded text of the token
    pub value: String,
    /// Line of the token
    pub line: u32,
    /// First column of the token
    pub from: u32,
    /// Column after the token
    pub character: u32,
    /// Spelled like a name (keywords included)
    pub identifier: bool,
    /// A reserved word
    pub reserved: bool,
    /// Useful as a statement on its own
    pub exps: bool,
    /// Names a function binding
    pub is_function: bool,
    /// A function literal wrapped in parentheses
    pub immed: bool,
    /// Left or only operand
    pub left: Option<Box<Expr>>,
    /// Right operand
    pub right: Option<Box<Expr>>,
    /// Property name of a member access
    pub member: Option<String>,
}

impl Expr {
    /// A node for `token` parsed under `rule`.
    pub fn from_token(rule: &Rule, token: &Token) -> Self {
        Expr {
            id: rule.id,
            value: token.value.clone().unwrap_or_else(|| token.text.clone()),
            line: token.line,
            from: token.from,
            character: token.character,
            identifier: token.kind == TokenKind::Identifier,
            reserved: rule.has(RuleFlags::RESERVED),
            exps: rule.has(RuleFlags::EXPS),
            is_function: false,
            immed: false,
            left: None,
            right: None,
            member: None,
        }
    }

    /// Start of the node's token
    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.from)
    }

    /// Whether this is a plain name spelled `name`
    pub fn is_name(&self, name: &str) -> bool {
        self.id == "(identifier)" && self.value == name
    }

    /// The left operand, if any
    pub fn left(&self) -> Option<&Expr> {
        self.left.as_deref()
    }

    /// The right operand, if any
    pub fn right(&self) -> Option<&Expr> {
        self.right.as_deref()
    }
}

/// The rule table.
pub struct Grammar {
    rules: HashMap<&'static str, Rule>,
    fallback: Rule,
}

impl Grammar {
    /// Rule registered under `id`
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// Rule for a scanned token. Unknown punctuators map to `(error)`.
    pub fn rule_for(&self, token: &Token) -> &Rule {
        let key = match token.kind {
            TokenKind::Identifier => {
                if self.rules.contains_key(token.text.as_str()) {
                    token.text.as_str()
                } else {
                    "(identifier)"
                }
            }
            TokenKind::Punctuator => token.text.as_str(),
            TokenKind::Number => "(number)",
            TokenKind::String => "(string)",
            TokenKind::RegExp => "(regexp)",
            TokenKind::Directive(_) | TokenKind::End => "(end)",
        };
        self.rules.get(key).unwrap_or(&self.fallback)
    }

    /// Whether `word` is a reserved word
    pub fn is_reserved(&self, word: &str) -> bool {
        self.rules
            .get(word)
            .map_or(false, |rule| rule.has(RuleFlags::RESERVED))
    }
}

/// Shared rule table
pub static GRAMMAR: Lazy<Grammar> = Lazy::new(build);

/// Rule for a token, from the shared table.
pub fn rule_for(token: &Token) -> &'static Rule {
    GRAMMAR.rule_for(token)
}

struct Builder {
    rules: HashMap<&'static str, Rule>,
}

impl Builder {
    fn symbol(&mut self, id: &'static str, lbp: u8) -> &mut Rule {
        self.rules.entry(id).or_insert_with(|| Rule::new(id, lbp))
    }

    fn delim(&mut self, id: &'static str) -> &mut Rule {
        self.symbol(id, 0)
    }

    fn reach(&mut self, id: &'static str) {
        self.delim(id).flags |= RuleFlags::REACH;
    }

    fn literal(&mut self, id: &'static str) {
        self.delim(id).nud = Some(ex::literal);
    }

    fn stmt(&mut self, id: &'static str, fud: NudFn) -> &mut Rule {
        let rule = self.delim(id);
        rule.flags |= RuleFlags::RESERVED;
        rule.fud = Some(fud);
        rule
    }

    fn blockstmt(&mut self, id: &'static str, fud: NudFn) -> &mut Rule {
        let rule = self.stmt(id, fud);
        rule.flags |= RuleFlags::BLOCK;
        rule
    }

    fn reserve(&mut self, id: &'static str, nud: NudFn) -> &mut Rule {
        let rule = self.delim(id);
        rule.flags |= RuleFlags::RESERVED;
        if rule.nud.is_none() {
            rule.nud = Some(nud);
        }
        rule
    }

    fn prefix(&mut self, id: &'static str, nud: NudFn) -> &mut Rule {
        let rule = self.symbol(id, 150);
        reserve_name(rule);
        rule.nud = Some(nud);
        rule
    }

    fn infix(&mut self, id: &'static str, lbp: u8, led: LedFn) -> &mut Rule {
        let rule = self.symbol(id, lbp);
        reserve_name(rule);
        rule.led = Some(led);
        rule
    }

    fn relation(&mut self, id: &'static str) {
        self.symbol(id, 100).led = Some(ex::relation);
    }

    fn assignop(&mut self, id: &'static str, led: LedFn) {
        let rule = self.symbol(id, 20);
        rule.flags |= RuleFlags::EXPS;
        rule.led = Some(led);
    }

    fn suffix(&mut self, id: &'static str) -> &mut Rule {
        let rule = self.symbol(id, 150);
        rule.led = Some(ex::postfix);
        rule
    }
}

fn reserve_name(rule: &mut Rule) {
    if rule.id.starts_with(|c: char| c.is_ascii_alphabetic()) {
        rule.flags |= RuleFlags::RESERVED;
    }
}

fn build() -> Grammar {
    let mut g = Builder {
        rules: HashMap::new(),
    };

    g.delim("(begin)");
    for id in ["(end)", "(error)", "}", ":"] {
        g.reach(id);
    }
    for id in [")", "]", ";", ",", "#", "@"] {
        g.delim(id);
    }
    g.literal("(number)");
    g.literal("(string)");
    g.literal("(regexp)");
    g.delim("(identifier)").nud = Some(ex::identifier);

    for id in ["case", "default"] {
        g.reserve(id, ex::literal).flags |= RuleFlags::REACH;
    }
    for id in [
        "else", "catch", "finally", "class", "enum", "export", "extends", "import", "super",
        "let", "yield", "implements", "interface", "package", "private", "protected", "public",
        "static",
    ] {
        g.reserve(id, ex::literal);
    }
    for id in ["eval", "false", "Infinity", "null", "true", "undefined"] {
        g.reserve(id, ex::literal);
    }
    g.reserve("arguments", ex::arguments);
    g.reserve("this", ex::this);

    for id in ["=", "+=", "-=", "*=", "/=", "%="] {
        g.assignop(id, ex::assignment);
    }
    for id in ["&=", "|=", "^=", "<<=", ">>=", ">>>="] {
        g.assignop(id, ex::bitwise_assignment);
    }
    g.infix("?", 30, ex::conditional);
    g.infix("||", 40, ex::binary);
    g.infix("&&", 50, ex::binary);
    g.infix("|", 70, ex::bitwise);
    g.infix("^", 80, ex::bitwise);
    g.infix("&", 90, ex::bitwise);
    for id in ["==", "===", "!=", "!==", "<", ">", "<=", ">="] {
        g.relation(id);
    }
    for id in ["<<", ">>", ">>>"] {
        g.infix(id, 120, ex::bitwise);
    }
    g.infix("in", 120, ex::binary);
    g.infix("instanceof", 120, ex::binary);
    g.infix("+", 130, ex::plus);
    g.prefix("+", ex::unary);
    g.infix("+++", 130, ex::confusing_plusses);
    g.prefix("+++", ex::confusing_plusses_prefix);
    g.infix("-", 130, ex::binary);
    g.prefix("-", ex::unary);
    g.infix("---", 130, ex::confusing_minusses);
    g.prefix("---", ex::confusing_minusses_prefix);
    for id in ["*", "/", "%"] {
        g.infix(id, 140, ex::binary);
    }

    g.suffix("++").flags |= RuleFlags::EXPS;
    g.prefix("++", ex::unary);
    g.suffix("--").flags |= RuleFlags::EXPS;
    g.prefix("--", ex::unary);
    g.prefix("delete", ex::delete).flags |= RuleFlags::EXPS;
    g.prefix("~", ex::bitwise_not);
    g.prefix("!", ex::not);
    g.prefix("typeof", ex::unary);
    g.prefix("new", ex::new).flags |= RuleFlags::EXPS;
    g.prefix("void", ex::unary).flags |= RuleFlags::EXPS;

    g.infix(".", 160, ex::member);
    g.infix("(", 155, ex::call).flags |= RuleFlags::EXPS;
    g.prefix("(", ex::group);
    g.infix("[", 160, ex::subscript);
    g.prefix("[", ex::array);
    let brace = g.delim("{");
    brace.nud = Some(ex::object);
    brace.fud = Some(st::stray_block);

    g.stmt("var", st::var).flags |= RuleFlags::EXPS;
    g.stmt("const", st::constant).flags |= RuleFlags::EXPS;
    g.blockstmt("function", st::function);
    g.prefix("function", ex::function);
    g.blockstmt("if", st::if_statement);
    g.blockstmt("try", st::try_statement);
    g.blockstmt("while", st::while_statement).flags |= RuleFlags::LABELLED;
    g.blockstmt("with", st::with_statement);
    g.blockstmt("switch", st::switch_statement).flags |= RuleFlags::LABELLED;
    g.stmt("debugger", st::debugger).flags |= RuleFlags::EXPS;
    g.stmt("do", st::do_statement).flags |= RuleFlags::LABELLED | RuleFlags::EXPS;
    g.blockstmt("for", st::for_statement).flags |= RuleFlags::LABELLED;
    g.stmt("break", st::break_statement).flags |= RuleFlags::EXPS;
    g.stmt("continue", st::continue_statement).flags |= RuleFlags::EXPS;
    g.stmt("return", st::return_statement).flags |= RuleFlags::EXPS;
    g.stmt("throw", st::throw_statement).flags |= RuleFlags::EXPS;

    let mut fallback = Rule::new("(error)", 0);
    fallback.flags |= RuleFlags::REACH;
    Grammar {
        rules: g.rules,
        fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.to_string(),
            value: None,
            line: 1,
            from: 1,
            character: 1 + text.len() as u32,
            regex_allowed: false,
        }
    }

    #[test]
    fn test_binding_powers() {
        let lbp = |id: &str| GRAMMAR.get(id).map(|r| r.lbp);
        assert_eq!(lbp("="), Some(20));
        assert_eq!(lbp("||"), Some(40));
        assert_eq!(lbp("+"), Some(130));
        assert_eq!(lbp("*"), Some(140));
        assert_eq!(lbp("("), Some(155));
        assert_eq!(lbp("."), Some(160));
        assert_eq!(lbp(","), Some(0));
        assert_eq!(lbp("function"), Some(0));
    }

    #[test]
    fn test_rule_lookup_by_token() {
        assert_eq!(rule_for(&token(TokenKind::Identifier, "foo")).id, "(identifier)");
        assert_eq!(rule_for(&token(TokenKind::Identifier, "typeof")).id, "typeof");
        assert_eq!(rule_for(&token(TokenKind::Number, "1")).id, "(number)");
        assert_eq!(rule_for(&token(TokenKind::Punctuator, "?")).id, "?");
        assert_eq!(rule_for(&token(TokenKind::Punctuator, "`")).id, "(error)");
        assert_eq!(rule_for(&Token::end(3, 1)).id, "(end)");
    }

    #[test]
    fn test_statement_flags() {
        let rule = |id: &str| GRAMMAR.get(id).expect(id);
        assert!(rule("for").has(RuleFlags::BLOCK | RuleFlags::LABELLED));
        assert!(rule("return").has(RuleFlags::EXPS));
        assert!(!rule("return").has(RuleFlags::BLOCK));
        assert!(rule("}").has(RuleFlags::REACH));
        assert!(rule("case").has(RuleFlags::REACH));
        assert!(GRAMMAR.is_reserved("while"));
        assert!(GRAMMAR.is_reserved("typeof"));
        assert!(!GRAMMAR.is_reserved("Math"));
        assert!(rule("+").nud.is_some() && rule("+").led.is_some());
    }

    #[test]
    fn test_expr_from_token() {
        let mut t = token(TokenKind::String, "'a'");
        t.value = Some("a".to_string());
        let e = Expr::from_token(rule_for(&t), &t);
        assert_eq!(e.id, "(string)");
        assert_eq!(e.value, "a");
        assert!(!e.identifier);
    }
}
