//! Directive comments
//!
//! `/*jshint*/`, `/*jslint*/`, `/*global*/` and `/*members*/` comments are
//! read token by token from the raw scanner as soon as their opener
//! appears. Each body is a list of `name` or `name: value` entries
//! separated by commas or line breaks, closed by `*/`.
//!
//! Option changes are file-wide: they take effect for everything scanned
//! after the comment and stay in force until the end of the run.

use tracing::debug;

use crate::environments;
use crate::error::ParseResult;
use crate::lexer::{DirectiveTag, Token, TokenKind};
use crate::messages;
use crate::options::{flag_by_name, Limit, OptionIssue, OptionValue, QuotMark, INVERTED_LEGACY, RENAMED_LEGACY};
use crate::parser::{display, Parser};

fn closes(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Directive(DirectiveTag::Close) | TokenKind::End)
}

impl Parser {
    /// Apply the directive comment opened by `opener`.
    pub(crate) fn apply_directive(&mut self, tag: DirectiveTag, opener: &Token) -> ParseResult<()> {
        if tag == DirectiveTag::Close {
            return self.warn_at(&messages::UNBEGUN_COMMENT, opener.position(), &[]);
        }
        debug!(?tag, line = opener.line, "directive");

        let quotmark = self.options.quotmark;
        if tag == DirectiveTag::Members {
            self.options.quotmark = QuotMark::Off;
            self.members_only.get_or_insert_with(Default::default);
        }
        let read = self.directive_entries(tag, opener);
        if tag == DirectiveTag::Members {
            self.options.quotmark = quotmark;
        }
        read?;

        if matches!(tag, DirectiveTag::Options | DirectiveTag::LegacyOptions) {
            environments::assume(&mut self.options, &mut self.globals);
        }
        Ok(())
    }

    fn directive_entries(&mut self, tag: DirectiveTag, opener: &Token) -> ParseResult<()> {
        let mut pending: Option<Token> = None;
        loop {
            let mut name = match pending.take() {
                Some(token) => token,
                None => self.scan()?,
            };
            if closes(&name) {
                return Ok(());
            }
            if name.is_punct(",") {
                continue;
            }

            let mut minus = false;
            if tag == DirectiveTag::Globals && name.is_punct("-") {
                minus = true;
                name = self.scan()?;
                if closes(&name) {
                    return Ok(());
                }
            }
            if tag != DirectiveTag::Members
                && !matches!(name.kind, TokenKind::Identifier | TokenKind::String)
            {
                self.warn_at(&messages::BAD_OPTION, name.position(), &[&display(&name)])?;
                continue;
            }

            let key = display(&name);
            let following = self.scan()?;
            if following.is_punct(":") {
                let value = self.scan()?;
                if closes(&value) {
                    self.warn_at(&messages::BAD_OPTION_VALUE, value.position(), &[])?;
                    return Ok(());
                }
                self.entry_value(tag, &name, &key, minus, &value, opener)?;
            } else {
                self.entry_name(tag, &name, &key, minus, opener)?;
                pending = Some(following);
            }
        }
    }

    /// A `name: value` entry.
    fn entry_value(
        &mut self,
        tag: DirectiveTag,
        name: &Token,
        key: &str,
        minus: bool,
        value: &Token,
        opener: &Token,
    ) -> ParseResult<()> {
        let text = display(value);
        match tag {
            DirectiveTag::Members => {
                self.warn_at(&messages::EXPECTED_TOKEN, name.position(), &["*/", ":"])
            }
            DirectiveTag::Globals => match text.as_str() {
                "true" | "false" => {
                    self.declare_global(key, text == "true", minus, opener);
                    Ok(())
                }
                _ => self.warn_at(&messages::BAD_OPTION_VALUE, value.position(), &[]),
            },
            DirectiveTag::Options => {
                if key == "validthis" && self.scope.current().is_global() {
                    return self.warn_at(&messages::VALIDTHIS_GLOBAL, value.position(), &[]);
                }
                match self.options.apply(key, &OptionValue::parse(&text)) {
                    Ok(()) => Ok(()),
                    Err(OptionIssue::UnknownName) => {
                        self.warn_at(&messages::BAD_OPTION, name.position(), &[key])
                    }
                    Err(OptionIssue::BadValue) => {
                        self.warn_at(&messages::BAD_OPTION_VALUE, value.position(), &[])
                    }
                    Err(OptionIssue::NotSmallInteger(seen)) => {
                        self.warn_at(&messages::EXPECTED_SMALL_INTEGER, value.position(), &[&seen])
                    }
                }
            }
            DirectiveTag::LegacyOptions => self.legacy_entry(name, key, value, &text),
            DirectiveTag::Close => Ok(()),
        }
    }

    /// A `/*jslint*/` entry: old names are renamed and some flags read
    /// inverted.
    fn legacy_entry(&mut self, name: &Token, key: &str, value: &Token, text: &str) -> ParseResult<()> {
        let key = RENAMED_LEGACY
            .iter()
            .find(|(old, _)| *old == key)
            .map_or(key, |(_, new)| *new);

        if Limit::by_name(key).is_some() {
            return match self.options.apply(key, &OptionValue::parse(text)) {
                Err(OptionIssue::NotSmallInteger(seen)) => {
                    self.warn_at(&messages::EXPECTED_SMALL_INTEGER, value.position(), &[&seen])
                }
                _ => Ok(()),
            };
        }
        let on = match text {
            "true" => true,
            "false" => false,
            _ => return self.warn_at(&messages::BAD_OPTION_VALUE, value.position(), &[]),
        };
        match flag_by_name(key) {
            Some(flag) => {
                let inverted = INVERTED_LEGACY.contains(flag);
                self.options.set(flag, on != inverted);
            }
            None => debug!(option = key, line = name.line, "unknown legacy option ignored"),
        }
        Ok(())
    }

    /// A bare `name` entry.
    fn entry_name(
        &mut self,
        tag: DirectiveTag,
        name: &Token,
        key: &str,
        minus: bool,
        opener: &Token,
    ) -> ParseResult<()> {
        match tag {
            DirectiveTag::Options | DirectiveTag::LegacyOptions => {
                self.warn_at(&messages::MISSING_OPTION_VALUE, name.position(), &[])
            }
            DirectiveTag::Globals => {
                self.declare_global(key, false, minus, opener);
                Ok(())
            }
            DirectiveTag::Members => {
                if let Some(members) = self.members_only.as_mut() {
                    members.insert(key.to_string());
                }
                Ok(())
            }
            DirectiveTag::Close => Ok(()),
        }
    }

    fn declare_global(&mut self, key: &str, writable: bool, minus: bool, opener: &Token) {
        if minus {
            self.globals.declare(&format!("-{}", key), false);
            return;
        }
        self.globals.declare(key, writable);
        self.scope.declared.insert(key.to_string(), opener.position());
    }
}
