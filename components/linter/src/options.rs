//! Analyzer options
//!
//! Options come from two places: the [`Config`] handed to a run (typically
//! loaded from a `.jshintrc` style JSON file) and directive comments found
//! in the source. Both go through the same validation so that a bad name or
//! value is reported the same way wherever it appears.

use bitflags::bitflags;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigError;

bitflags! {
    /// Boolean options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u128 {
        /// Tolerate automatic semicolon insertion
        const ASI = 1 << 0;
        /// Warn about bitwise operators
        const BITWISE = 1 << 1;
        /// Tolerate assignments where conditions are expected
        const BOSS = 1 << 2;
        /// Predefine browser globals
        const BROWSER = 1 << 3;
        /// Require camel case identifiers
        const CAMELCASE = 1 << 4;
        /// Predefine CouchDB globals
        const COUCH = 1 << 5;
        /// Require braces around every block
        const CURLY = 1 << 6;
        /// Tolerate `debugger` statements
        const DEBUG = 1 << 7;
        /// Predefine logging globals
        const DEVEL = 1 << 8;
        /// Predefine Dojo globals
        const DOJO = 1 << 9;
        /// Require `===` and `!==`
        const EQEQEQ = 1 << 10;
        /// Tolerate `== null`
        const EQNULL = 1 << 11;
        /// Allow ES5 syntax
        const ES5 = 1 << 12;
        /// Allow ES.next syntax (`const`)
        const ESNEXT = 1 << 13;
        /// Tolerate `eval`
        const EVIL = 1 << 14;
        /// Tolerate expression statements
        const EXPR = 1 << 15;
        /// Require `for in` bodies to filter
        const FORIN = 1 << 16;
        /// Use function scope only
        const FUNCSCOPE = 1 << 17;
        /// Allow global `"use strict"`
        const GLOBALSTRICT = 1 << 18;
        /// Require immediate invocations to be wrapped
        const IMMED = 1 << 19;
        /// Tolerate `__iterator__`
        const ITERATOR = 1 << 20;
        /// Predefine jQuery globals
        const JQUERY = 1 << 21;
        /// Tolerate a missing semicolon on the last statement of a one-line block
        const LASTSEMIC = 1 << 22;
        /// Warn about use before definition
        const LATEDEF = 1 << 23;
        /// Tolerate unsafe line breaks
        const LAXBREAK = 1 << 24;
        /// Tolerate comma-first style
        const LAXCOMMA = 1 << 25;
        /// Tolerate functions inside loops
        const LOOPFUNC = 1 << 26;
        /// Predefine MooTools globals
        const MOOTOOLS = 1 << 27;
        /// Tolerate multi-line strings
        const MULTISTR = 1 << 28;
        /// Require capitalized constructors
        const NEWCAP = 1 << 29;
        /// Warn about `arguments.caller` and `arguments.callee`
        const NOARG = 1 << 30;
        /// Predefine Node.js globals
        const NODE = 1 << 31;
        /// Warn about empty blocks
        const NOEMPTY = 1 << 32;
        /// Warn about `new` for side effects
        const NONEW = 1 << 33;
        /// Predefine non-standard but common globals
        const NONSTANDARD = 1 << 34;
        /// Warn about dangling underscores
        const NOMEN = 1 << 35;
        /// Allow only one `var` statement per function
        const ONEVAR = 1 << 36;
        /// Tolerate single-case switches
        const ONECASE = 1 << 37;
        /// Stop at the first diagnostic
        const PASSFAIL = 1 << 38;
        /// Warn about `++` and `--`
        const PLUSPLUS = 1 << 39;
        /// Tolerate `__proto__`
        const PROTO = 1 << 40;
        /// Predefine Prototype and Scriptaculous globals
        const PROTOTYPEJS = 1 << 41;
        /// Tolerate an unescaped dash at the edge of a character class
        const REGEXDASH = 1 << 42;
        /// Warn about `.` and `[^...]` in patterns
        const REGEXP = 1 << 43;
        /// Predefine Rhino globals
        const RHINO = 1 << 44;
        /// Require variables to be declared
        const UNDEF = 1 << 45;
        /// Warn about unused bindings
        const UNUSED = 1 << 46;
        /// Tolerate script URLs
        const SCRIPTURL = 1 << 47;
        /// Tolerate shadowing
        const SHADOW = 1 << 48;
        /// Tolerate mixed tabs and spaces used for alignment
        const SMARTTABS = 1 << 49;
        /// Require `"use strict"`
        const STRICT = 1 << 50;
        /// Tolerate subscript notation
        const SUB = 1 << 51;
        /// Tolerate `new function () {}` and `new Object;`
        const SUPERNEW = 1 << 52;
        /// Warn about trailing whitespace
        const TRAILING = 1 << 53;
        /// Tolerate `this` in non-constructor strict functions
        const VALIDTHIS = 1 << 54;
        /// Tolerate `with`
        const WITHSTMT = 1 << 55;
        /// Strict whitespace rules (accepted for compatibility)
        const WHITE = 1 << 56;
        /// Predefine Web Worker globals
        const WORKER = 1 << 57;
        /// Predefine Windows Script Host globals
        const WSH = 1 << 58;
        /// Predefine YUI globals
        const YUI = 1 << 59;
    }
}

/// Boolean option names.
pub const FLAG_NAMES: &[(&str, Flags)] = &[
    ("asi", Flags::ASI),
    ("bitwise", Flags::BITWISE),
    ("boss", Flags::BOSS),
    ("browser", Flags::BROWSER),
    ("camelcase", Flags::CAMELCASE),
    ("couch", Flags::COUCH),
    ("curly", Flags::CURLY),
    ("debug", Flags::DEBUG),
    ("devel", Flags::DEVEL),
    ("dojo", Flags::DOJO),
    ("eqeqeq", Flags::EQEQEQ),
    ("eqnull", Flags::EQNULL),
    ("es5", Flags::ES5),
    ("esnext", Flags::ESNEXT),
    ("evil", Flags::EVIL),
    ("expr", Flags::EXPR),
    ("forin", Flags::FORIN),
    ("funcscope", Flags::FUNCSCOPE),
    ("globalstrict", Flags::GLOBALSTRICT),
    ("immed", Flags::IMMED),
    ("iterator", Flags::ITERATOR),
    ("jquery", Flags::JQUERY),
    ("lastsemic", Flags::LASTSEMIC),
    ("latedef", Flags::LATEDEF),
    ("laxbreak", Flags::LAXBREAK),
    ("laxcomma", Flags::LAXCOMMA),
    ("loopfunc", Flags::LOOPFUNC),
    ("mootools", Flags::MOOTOOLS),
    ("multistr", Flags::MULTISTR),
    ("newcap", Flags::NEWCAP),
    ("noarg", Flags::NOARG),
    ("node", Flags::NODE),
    ("noempty", Flags::NOEMPTY),
    ("nonew", Flags::NONEW),
    ("nonstandard", Flags::NONSTANDARD),
    ("nomen", Flags::NOMEN),
    ("onevar", Flags::ONEVAR),
    ("onecase", Flags::ONECASE),
    ("passfail", Flags::PASSFAIL),
    ("plusplus", Flags::PLUSPLUS),
    ("proto", Flags::PROTO),
    ("prototypejs", Flags::PROTOTYPEJS),
    ("regexdash", Flags::REGEXDASH),
    ("regexp", Flags::REGEXP),
    ("rhino", Flags::RHINO),
    ("undef", Flags::UNDEF),
    ("unused", Flags::UNUSED),
    ("scripturl", Flags::SCRIPTURL),
    ("shadow", Flags::SHADOW),
    ("smarttabs", Flags::SMARTTABS),
    ("strict", Flags::STRICT),
    ("sub", Flags::SUB),
    ("supernew", Flags::SUPERNEW),
    ("trailing", Flags::TRAILING),
    ("validthis", Flags::VALIDTHIS),
    ("withstmt", Flags::WITHSTMT),
    ("white", Flags::WHITE),
    ("worker", Flags::WORKER),
    ("wsh", Flags::WSH),
    ("yui", Flags::YUI),
];

/// Options whose meaning is inverted in legacy `/*jslint*/` directives.
pub const INVERTED_LEGACY: Flags = Flags::BITWISE
    .union(Flags::FORIN)
    .union(Flags::NEWCAP)
    .union(Flags::NOMEN)
    .union(Flags::PLUSPLUS)
    .union(Flags::REGEXP)
    .union(Flags::UNDEF)
    .union(Flags::WHITE)
    .union(Flags::EQEQEQ)
    .union(Flags::ONEVAR);

/// Legacy option names and their current spelling.
pub const RENAMED_LEGACY: &[(&str, &str)] =
    &[("eqeq", "eqeqeq"), ("vars", "onevar"), ("windows", "wsh")];

/// Look a boolean option up by name.
pub fn flag_by_name(name: &str) -> Option<Flags> {
    FLAG_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, flag)| *flag)
}

/// Numeric options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    /// Maximum line length
    MaxLen,
    /// Indentation width
    Indent,
    /// Diagnostic ceiling
    MaxErr,
    /// Statements per function
    MaxStatements,
    /// Parameters per function
    MaxParams,
    /// Nested block depth per function
    MaxDepth,
    /// Cyclomatic complexity per function
    MaxComplexity,
}

impl Limit {
    /// Every numeric option with its name
    pub const ALL: [(&'static str, Limit); 7] = [
        ("maxlen", Limit::MaxLen),
        ("indent", Limit::Indent),
        ("maxerr", Limit::MaxErr),
        ("maxstatements", Limit::MaxStatements),
        ("maxparams", Limit::MaxParams),
        ("maxdepth", Limit::MaxDepth),
        ("maxcomplexity", Limit::MaxComplexity),
    ];

    /// Look a numeric option up by name
    pub fn by_name(name: &str) -> Option<Limit> {
        Limit::ALL
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, limit)| *limit)
    }
}

/// Quote style enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotMark {
    /// No enforcement
    #[default]
    Off,
    /// Every string uses the quote of the first string
    Consistent,
    /// Single quotes only
    Single,
    /// Double quotes only
    Double,
}

/// Names accepted by the validator that are neither flags nor limits.
const OTHER_OPTIONS: &[&str] = &["quotmark", "predef", "scope"];

/// Whether `name` is a recognized option.
pub fn is_known_option(name: &str) -> bool {
    flag_by_name(name).is_some() || Limit::by_name(name).is_some() || OTHER_OPTIONS.contains(&name)
}

/// Default diagnostic ceiling.
pub const DEFAULT_MAXERR: u32 = 50;

/// When the diagnostics sink must end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ceiling {
    /// Terminate once this many diagnostics were counted
    pub max: u32,
    /// Terminate after the first diagnostic
    pub stop_on_first: bool,
}

/// The live option set of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    flags: Flags,
    disabled: Flags,
    limits: [Option<u32>; 7],
    /// Quote style
    pub quotmark: QuotMark,
}

impl Default for Options {
    fn default() -> Self {
        let mut options = Options {
            flags: Flags::UNUSED,
            disabled: Flags::empty(),
            limits: [None; 7],
            quotmark: QuotMark::Off,
        };
        options.set_limit(Limit::MaxErr, DEFAULT_MAXERR);
        options
    }
}

impl Options {
    /// Options with nothing enabled and the default ceiling
    pub fn none() -> Self {
        let mut options = Options::default();
        options.flags = Flags::empty();
        options
    }

    /// Whether a flag is on
    pub fn has(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    /// Whether a flag was explicitly turned off
    pub fn is_disabled(&self, flag: Flags) -> bool {
        self.disabled.contains(flag)
    }

    /// Turn a flag on or off
    pub fn set(&mut self, flag: Flags, on: bool) {
        self.flags.set(flag, on);
        self.disabled.set(flag, !on);
    }

    /// All flags currently on
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Value of a numeric option
    pub fn limit(&self, limit: Limit) -> Option<u32> {
        self.limits[limit as usize]
    }

    /// Set a numeric option
    pub fn set_limit(&mut self, limit: Limit, value: u32) {
        self.limits[limit as usize] = Some(value);
    }

    /// Current diagnostic ceiling
    pub fn ceiling(&self) -> Ceiling {
        Ceiling {
            max: self.limit(Limit::MaxErr).unwrap_or(DEFAULT_MAXERR),
            stop_on_first: self.has(Flags::PASSFAIL),
        }
    }

    /// Apply one `name: value` pair, validating both.
    pub fn apply(&mut self, name: &str, value: &OptionValue) -> Result<(), OptionIssue> {
        if let Some(flag) = flag_by_name(name) {
            return match value {
                OptionValue::Bool(on) => {
                    self.set(flag, *on);
                    Ok(())
                }
                _ => Err(OptionIssue::BadValue),
            };
        }
        if let Some(limit) = Limit::by_name(name) {
            return match value.as_small_integer() {
                Some(n) => {
                    self.set_limit(limit, n);
                    Ok(())
                }
                None => Err(OptionIssue::NotSmallInteger(value.to_string())),
            };
        }
        match name {
            "quotmark" => {
                self.quotmark = match value {
                    OptionValue::Bool(true) => QuotMark::Consistent,
                    OptionValue::Bool(false) => QuotMark::Off,
                    OptionValue::Text(s) if s == "single" => QuotMark::Single,
                    OptionValue::Text(s) if s == "double" => QuotMark::Double,
                    _ => return Err(OptionIssue::BadValue),
                };
                Ok(())
            }
            "predef" | "scope" => Ok(()),
            _ => Err(OptionIssue::UnknownName),
        }
    }
}

/// What was wrong with an option assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionIssue {
    /// The name is not in the option tables
    UnknownName,
    /// The value does not fit the option
    BadValue,
    /// A numeric option got something other than a positive integer
    NotSmallInteger(String),
}

/// A raw option value as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// `true` / `false`
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// String value
    Text(String),
    /// List of names (used by `predef`)
    List(Vec<String>),
}

impl OptionValue {
    /// Parse a value written as text, as in directives and `--option` flags.
    pub fn parse(text: &str) -> OptionValue {
        match text {
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            _ => match text.parse::<f64>() {
                Ok(n) => OptionValue::Number(n),
                Err(_) => OptionValue::Text(text.to_string()),
            },
        }
    }

    /// The value as a positive integer, if it is one
    pub fn as_small_integer(&self) -> Option<u32> {
        match self {
            OptionValue::Number(n) if *n >= 1.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 => {
                Some(*n as u32)
            }
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Text(s) => f.write_str(s),
            OptionValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Caller-supplied configuration for a run.
///
/// Deserializes from a `.jshintrc` style object: unknown keys are option
/// names, `predef` and `globals` seed the global table and `ignore` lists
/// rule codes to drop from the report.
///
/// ```
/// use linter::Config;
///
/// let config = Config::from_json(r#"{ "undef": true, "predef": ["app"] }"#).unwrap();
/// assert_eq!(config.predef, vec!["app".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Option assignments by name
    #[serde(flatten)]
    pub options: IndexMap<String, OptionValue>,
    /// Extra read-only globals; `-name` removes a predefined name
    #[serde(default)]
    pub predef: Vec<String>,
    /// Extra globals with their writability
    #[serde(default)]
    pub globals: BTreeMap<String, bool>,
    /// Rule codes to drop
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Config {
    /// Parse a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Config, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set one option from its textual value.
    pub fn set(&mut self, name: &str, value: &str) -> &mut Self {
        self.options.insert(name.to_string(), OptionValue::parse(value));
        self
    }

    /// Parse a `KEY=VALUE` assignment and apply it.
    pub fn set_assignment(&mut self, assignment: &str) -> Result<&mut Self, ConfigError> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok(self.set(key.trim(), value.trim()))
            }
            _ => Err(ConfigError::Assignment(assignment.to_string())),
        }
    }

    /// Declare an extra global.
    pub fn with_global(mut self, name: &str, writable: bool) -> Self {
        self.globals.insert(name.to_string(), writable);
        self
    }

    /// Merge another configuration on top of this one.
    pub fn merge(&mut self, other: Config) {
        self.options.extend(other.options);
        self.predef.extend(other.predef);
        self.globals.extend(other.globals);
        self.ignore.extend(other.ignore);
    }

    /// Predefined names, with `predef` list entries folded in.
    pub(crate) fn predef_entries(&self) -> Vec<(String, bool)> {
        let mut entries: Vec<(String, bool)> =
            self.predef.iter().map(|name| (name.clone(), false)).collect();
        if let Some(OptionValue::List(names)) = self.options.get("predef") {
            entries.extend(names.iter().map(|name| (name.clone(), false)));
        }
        entries.extend(self.globals.iter().map(|(k, v)| (k.clone(), *v)));
        entries
    }
}
