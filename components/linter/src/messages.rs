//! Message catalogue
//!
//! Every finding the analyzer can raise is a [`Message`]: a stable code, a
//! template with positional `{0}`..`{3}` placeholders and a default
//! severity. Codes keep the classic `E`/`W` numbering; the severity
//! follows the editor classification in [`classify`].

use core_types::Severity;

/// A diagnostic template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    /// Stable code used in reports and ignore lists
    pub code: &'static str,
    /// Template text
    pub template: &'static str,
    /// Default severity
    pub severity: Severity,
}

impl Message {
    /// Fill in the template placeholders.
    pub fn format(&self, args: &[&str]) -> String {
        interpolate(self.template, args)
    }
}

/// Replace `{N}` placeholders with the matching argument.
///
/// Placeholders without an argument are left as they are.
pub fn interpolate(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}');
        let index = close.and_then(|c| after[..c].parse::<usize>().ok());
        match (close, index) {
            (Some(c), Some(i)) if i < args.len() => {
                out.push_str(args[i]);
                rest = &after[c + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

macro_rules! messages {
    ($($name:ident = $code:literal, $severity:ident, $template:literal;)*) => {
        $(
            #[allow(missing_docs)]
            pub const $name: Message = Message {
                code: $code,
                template: $template,
                severity: Severity::$severity,
            };
        )*

        /// Every message the analyzer knows, in code order.
        pub const ALL: &[Message] = &[$($name),*];
    };
}

messages! {
    // Options and directives
    BAD_OPTION = "E001", Warning, "Bad option: '{0}'.";
    BAD_OPTION_VALUE = "E002", Warning, "Bad option value.";
    EXPECTED_JSON_VALUE = "E003", Error, "Expected a JSON value.";
    EMPTY_INPUT = "E005", Error, "Input is an empty string.";
    EMPTY_INPUT_LINES = "E004", Error, "Input is an empty array.";
    EARLY_END = "E006", Error, "Unexpected early end of program.";
    MISSING_USE_STRICT = "E007", Warning, "Missing \"use strict\" statement.";
    STRICT_VIOLATION = "E008", Warning, "Strict violation.";
    VALIDTHIS_GLOBAL = "E009", Warning, "Option 'validthis' can't be used in a global scope.";
    WITH_IN_STRICT = "E010", Warning, "'with' is not allowed in strict mode.";
    CONST_REDECLARED = "E011", Warning, "const '{0}' has already been declared.";
    CONST_UNDEFINED = "E012", Warning, "const '{0}' is initialized to 'undefined'.";
    CONST_OVERRIDE = "E013", Warning, "Attempting to override '{0}' which is a constant.";
    REGEXP_SLASH_EQUAL = "E014", Warning, "A regular expression literal can be confused with '/='.";
    UNCLOSED_REGEXP = "E015", Error, "Unclosed regular expression.";
    UNCLOSED_COMMENT = "E017", Error, "Unclosed comment.";
    UNBEGUN_COMMENT = "E018", Error, "Unbegun comment.";
    UNMATCHED = "E019", Error, "Unmatched '{0}'.";
    EXPECTED_MATCH = "E020", Error, "Expected '{0}' to match '{1}' from line {2} and instead saw '{3}'.";
    EXPECTED_TOKEN = "E021", Error, "Expected '{0}' and instead saw '{1}'.";
    LINE_BREAKING = "E022", Warning, "Line breaking error '{0}'.";
    UNEXPECTED = "E024", Error, "Unexpected '{0}'.";
    MISSING_CASE_COLON = "E025", Warning, "Missing ':' on a case clause.";
    UNCLOSED_STRING = "E029", Error, "Unclosed string.";
    EXPECTED_IDENTIFIER = "E030", Error, "Expected an identifier and instead saw '{0}'.";
    BAD_ASSIGNMENT = "E031", Warning, "Bad assignment.";
    EXPECTED_SMALL_INTEGER = "E032", Error, "Expected a small integer and instead saw '{0}'.";
    EXPECTED_OPERATOR = "E033", Error, "Expected an operator and instead saw '{0}'.";
    MISSING_PROPERTY_NAME = "E035", Warning, "Missing property name.";
    BLOCK_NOT_STATEMENT = "E036", Error, "Expected to see a statement and instead saw a block.";
    UNTERMINATED_GROUPS = "E037", Error, "{0} unterminated regular expression group(s).";
    MISSING_OPERATOR = "E038", Error, "Missing operator at '{0}'.";
    FUNCTION_NOT_INVOCABLE = "E039", Warning, "Function declarations are not invocable. Wrap the whole function invocation in parens.";
    DUPLICATE_CASE_LABEL = "E040", Warning, "Each value should have its own case label.";
    STOPPING = "E042", Error, "Stopping.";
    TOO_MANY_ERRORS = "E043", Error, "Too many errors.";
    NESTING_TOO_DEEP = "E044", Error, "Nesting is too deep.";
    MISSING_OPTION_VALUE = "E016", Warning, "Missing option value.";
    BAD_DECLARATION = "E023", Warning, "Variable {0} was not declared correctly.";
    BAD_CONST_DECLARATION = "E026", Warning, "Constant {0} was not declared correctly.";
    ES5_ACCESSOR = "E034", Warning, "get/set are ES5 features.";
    ASSIGN_TO_INVOCATION = "E049", Error, "Expected an identifier in an assignment and instead saw a function invocation.";
    MISSING_CLOSE = "E050", Warning, "Missing '{0}'.";
    JSON_UNCLOSED = "E051", Warning, "Missing '{0}' to match '{1}' from line {2}.";
    JSON_EXPECTED_STRING = "E052", Error, "Expected a string and instead saw {0}.";
    MISSING_SPACE_AFTER = "E045", Error, "Missing space after '{0}'.";
    BAD_INVOCATION = "E046", Error, "Bad invocation.";
    CONFUSING_PLUSSES = "E047", Error, "Confusing plusses.";
    CONFUSING_MINUSSES = "E048", Error, "Confusing minusses.";

    // Scope and bindings
    BAD_NAME = "W001", Warning, "'hasOwnProperty' is a really bad name.";
    OVERWRITTEN_IN_IE = "W002", Warning, "Value of '{0}' may be overwritten in IE.";
    USED_BEFORE_DEFINED = "W003", Warning, "'{0}' was used before it was defined.";
    ALREADY_DEFINED = "W004", Warning, "'{0}' is already defined.";
    DOT_AFTER_NUMBER = "W005", Warning, "A dot following a number can be confused with a decimal point.";
    LEADING_DECIMAL = "W008", Info, "A leading decimal point can be confused with a dot: '.{0}'.";
    LABEL_SCRIPT_URL = "W011", Warning, "Label '{0}' looks like a javascript url.";
    DUPLICATE_KEY = "W012", Warning, "Duplicate key '{0}'.";
    UNSAFE_KEY = "W013", Warning, "The '{0}' key may produce unexpected results.";
    UNEXPECTED_SPACE_AFTER = "W023", Info, "Unexpected space after '{0}'.";
    USE_ARRAY_LITERAL = "W009", Warning, "Use the array literal notation [].";
    USE_OBJECT_LITERAL = "W010", Warning, "Use the object literal notation {}.";
    BAD_LINE_BREAK = "W014", Warning, "Bad line breaking before '{0}'.";
    COMMA_FIRST = "W015", Warning, "Comma warnings can be turned off with 'laxcomma'.";
    UNEXPECTED_USE = "W016", Error, "Unexpected use of '{0}'.";
    BAD_OPERAND = "W017", Warning, "Bad operand.";
    CONFUSING_USE = "W018", Warning, "Confusing use of '{0}'.";
    USE_ISNAN = "W019", Warning, "Use the isNaN function to compare with NaN.";
    READ_ONLY = "W020", Warning, "Read only.";
    IS_A_FUNCTION = "W021", Warning, "'{0}' is a function.";
    ASSIGN_EXCEPTION = "W022", Warning, "Do not assign to the exception parameter.";
    RESERVED_WORD = "W024", Error, "Expected an identifier and instead saw '{0}' (a reserved word).";
    MISSING_FUNCTION_NAME = "W025", Warning, "Missing name in function declaration.";
    INNER_FUNCTIONS_FIRST = "W026", Warning, "Inner functions should be listed at the top of the outer function.";
    UNREACHABLE = "W027", Warning, "Unreachable '{0}' after '{1}'.";
    LABEL_ON_STATEMENT = "W028", Warning, "Label '{0}' on {1} statement.";
    EXPRESSION_STATEMENT = "W030", Info, "Expected an assignment or function call and instead saw an expression.";
    NEW_SIDE_EFFECTS = "W031", Warning, "Do not use 'new' for side effects.";
    UNNECESSARY_SEMICOLON = "W032", Warning, "Unnecessary semicolon.";
    MISSING_SEMICOLON = "W033", Info, "Missing semicolon.";
    UNNECESSARY_DIRECTIVE = "W034", Warning, "Unnecessary directive \"{0}\".";
    EMPTY_BLOCK = "W035", Warning, "Empty block.";
    UNEXPECTED_MEMBER = "W036", Error, "Unexpected /*member '{0}'.";
    IS_A_LABEL = "W037", Warning, "'{0}' is a statement label.";
    OUT_OF_SCOPE = "W038", Info, "'{0}' used out of scope.";
    POSSIBLE_STRICT_VIOLATION = "W040", Warning, "Possible strict violation.";
    USE_STRICT_COMPARISON = "W041", Warning, "Use '{0}' to compare with '{1}'.";
    AVOID_EOL_ESCAPE = "W042", Warning, "Avoid EOL escapement.";
    BAD_EOL_ESCAPE = "W043", Info, "Bad escapement of EOL. Use option multistr if needed.";
    BAD_ESCAPE = "W044", Warning, "Bad escapement.";
    BAD_NUMBER = "W045", Warning, "Bad number '{0}'.";
    LEADING_ZEROS = "W046", Warning, "Don't use extra leading zeros '{0}'.";
    TRAILING_DECIMAL = "W047", Warning, "A trailing decimal point can be confused with a dot '{0}'.";
    REGEXP_CONTROL_CHARACTER = "W048", Error, "Unexpected control character in regular expression.";
    UNNECESSARY_ESCAPE = "W049", Warning, "Unnecessary escapement.";
    DELETE_VARIABLE = "W051", Warning, "Variables should not be deleted.";
    PRIMITIVE_CONSTRUCTOR = "W053", Warning, "Do not use {0} as a constructor.";
    FUNCTION_CONSTRUCTOR = "W054", Warning, "The Function constructor is eval.";
    CONSTRUCTOR_CASE = "W055", Warning, "A constructor name should start with an uppercase letter.";
    BAD_CONSTRUCTOR = "W056", Warning, "Bad constructor.";
    WEIRD_CONSTRUCTION = "W057", Warning, "Weird construction. Delete 'new'.";
    MISSING_INVOCATION = "W058", Warning, "Missing '()' invoking a constructor.";
    AVOID_ARGUMENTS = "W059", Warning, "Avoid arguments.{0}.";
    DOCUMENT_WRITE = "W060", Warning, "document.write can be a form of eval.";
    EVAL_IS_EVIL = "W061", Warning, "eval is evil.";
    WRAP_IMMEDIATE = "W062", Warning, "Wrap an immediate function invocation in parentheses to assist the reader in understanding that the expression is the result of a function, and not the function itself.";
    MATH_NOT_FUNCTION = "W063", Warning, "Math is not a function.";
    MISSING_NEW = "W064", Warning, "Missing 'new' prefix when invoking a constructor.";
    MISSING_RADIX = "W065", Info, "Missing radix parameter.";
    IMPLIED_EVAL = "W066", Warning, "Implied eval is evil. Pass a function instead of a string.";
    MOVE_INVOCATION = "W067", Warning, "Move the invocation into the parens that contain the function.";
    UNNECESSARY_WRAP = "W068", Warning, "Do not wrap function literals in parens unless they are to be immediately invoked.";
    DOT_NOTATION = "W069", Info, "['{0}'] is better written in dot notation.";
    EXTRA_COMMA = "W070", Warning, "Extra comma.";
    TOO_MANY_STATEMENTS = "W071", Warning, "Too many statements per function ({0}).";
    TOO_MANY_PARAMETERS = "W072", Warning, "Too many parameters per function ({0}).";
    NESTED_TOO_DEEPLY = "W073", Warning, "Blocks are nested too deeply ({0}).";
    TOO_COMPLEX = "W074", Warning, "Cyclomatic complexity is too high per function ({0}).";
    DUPLICATE_MEMBER = "W075", Warning, "Duplicate member '{0}'.";
    GETTER_PARAMETER = "W076", Error, "Unexpected parameter '{0}' in get {1} function.";
    SETTER_PARAMETER = "W077", Error, "Expected a single parameter in set {0} function.";
    SETTER_WITHOUT_GETTER = "W078", Warning, "Setter is defined without getter.";
    REDEFINITION = "W079", Warning, "Redefinition of '{0}'.";
    INIT_UNDEFINED = "W080", Warning, "It is not necessary to initialize '{0}' to 'undefined'.";
    TOO_MANY_VARS = "W081", Warning, "Too many var statements.";
    FUNCTION_IN_BLOCK = "W082", Warning, "Function declarations should not be placed in blocks. Use a function expression or move the statement to the top of the outer function.";
    FUNCTION_IN_LOOP = "W083", Warning, "Don't make functions within a loop.";
    ASSIGNMENT_IN_CONDITION = "W084", Warning, "Assignment in conditional expression.";
    AVOID_WITH = "W085", Warning, "Don't use 'with'.";
    MISSING_BREAK = "W086", Error, "Expected a 'break' statement before '{0}'.";
    DEBUGGER = "W087", Warning, "All 'debugger' statements should be removed.";
    BAD_FOR_IN_VARIABLE = "W088", Warning, "Bad for in variable '{0}'.";
    FOR_IN_FILTER = "W089", Warning, "The body of a for in should be wrapped in an if statement to filter unwanted properties from the prototype.";
    NOT_A_LABEL = "W090", Warning, "'{0}' is not a statement label.";
    LABEL_OUT_OF_SCOPE = "W091", Warning, "'{0}' is out of scope.";
    ONE_CASE = "W092", Warning, "This 'switch' should be an 'if'.";
    RETURN_ASSIGNMENT = "W093", Warning, "Did you mean to return a conditional instead of an assignment?";
    COMMA_OPERATOR = "W094", Info, "Unexpected comma.";
    WRAP_REGEXP = "W095", Warning, "Wrap the /regexp/ literal in parens to disambiguate the slash operator.";
    FUNCTION_FORM_STRICT = "W097", Warning, "Use the function form of \"use strict\".";
    UNUSED = "W098", Info, "'{0}' is defined but never used.";
    MIXED_TABS = "W099", Warning, "Mixed spaces and tabs.";
    UNSAFE_CHARACTER = "W100", Warning, "Unsafe character.";
    LINE_TOO_LONG = "W101", Warning, "Line too long.";
    TRAILING_WHITESPACE = "W102", Warning, "Trailing whitespace.";
    DEPRECATED_PROPERTY = "W103", Warning, "The '{0}' property is deprecated.";
    JS17_ONLY = "W104", Warning, "'{0}' is only available in JavaScript 1.7.";
    DANGLING_UNDERSCORE = "W105", Error, "Unexpected dangling '_' in '{0}'.";
    NOT_CAMEL_CASE = "W106", Warning, "Identifier '{0}' is not in camel case.";
    SCRIPT_URL = "W107", Warning, "Script URL.";
    USE_DOUBLE_QUOTE = "W108", Warning, "Strings must use doublequote.";
    USE_SINGLE_QUOTE = "W109", Warning, "Strings must use singlequote.";
    MIXED_QUOTES = "W110", Warning, "Mixed double and single quotes.";
    UNCLOSED_STRING_LINE = "W112", Error, "Unclosed string.";
    CONTROL_CHARACTER = "W113", Warning, "Control character in string: {0}.";
    AVOID = "W114", Warning, "Avoid {0}.";
    OCTAL_IN_STRICT = "W115", Warning, "Octal literals are not allowed in strict mode.";
    EXPECTED_STYLE = "W116", Error, "Expected '{0}' and instead saw '{1}'.";
    NOT_DEFINED = "W117", Warning, "'{0}' is not defined.";
    ESNEXT_ONLY = "W119", Warning, "'{0}' is only available in ES6 (use esnext option).";
    NOT_ALLOWED = "W120", Warning, "'{0}' is not allowed.";

    // Pattern literals
    REGEXP_CONFUSING = "W130", Warning, "Confusing regular expression.";
    REGEXP_UNESCAPED = "W131", Warning, "Unescaped '{0}'.";
    REGEXP_SPACES = "W132", Warning, "Spaces are hard to count. Use {{0}}.";
    REGEXP_EMPTY_CLASS = "W133", Warning, "Empty class.";
    REGEXP_INSECURE = "W134", Warning, "Insecure '{0}'.";
    EXPECTED_NUMBER = "W135", Error, "Expected a number and instead saw '{0}'.";
    BOUND_ORDER = "W136", Warning, "'{0}' should not be greater than '{1}'.";

    // Editor-facing refinement of a missing semicolon
    MISSING_SEMICOLON_BEFORE_STATEMENT = "E058", Error, "Missing \";\" before statement";
}

const ERROR_PREFIXES: &[&str] = &[
    "Unexpected",
    "Expected ",
    "Confusing plusses",
    "Confusing minusses",
    "Unclosed ",
    "Unmatched ",
    "Unbegun comment",
    "Bad invocation",
    "Missing space after",
    "Missing operator at",
];

const INFO_PREFIXES: &[&str] = &[
    "Expected an assignment",
    "Bad escapement of EOL",
    "Unexpected comma",
    "Unexpected space",
    "Missing radix parameter.",
    "A leading decimal point can",
    "['{0}'] is better written in dot notation.",
    "'{0}' used out of scope",
    "'{0}' is defined but never used.",
];

/// Findings an editor never shows, matched on the template prefix.
const SUPPRESSED_PREFIXES: &[&str] = &["Bad for in variable '", "Missing \"use strict\""];

/// Whether findings with this template are dropped before they are recorded.
pub fn is_suppressed(template: &str) -> bool {
    SUPPRESSED_PREFIXES.iter().any(|p| template.starts_with(p))
}

/// Severity an editor should show for a template.
///
/// Info prefixes win over error prefixes, so "Unexpected comma." stays a
/// note while every other "Unexpected ..." is an error.
pub fn classify(template: &str) -> Severity {
    if INFO_PREFIXES.iter().any(|p| template.starts_with(p)) {
        Severity::Info
    } else if ERROR_PREFIXES.iter().any(|p| template.starts_with(p))
        || template.ends_with("unterminated regular expression group(s).")
    {
        Severity::Error
    } else {
        Severity::Warning
    }
}

/// Look a message up by its code.
pub fn by_code(code: &str) -> Option<&'static Message> {
    ALL.iter().find(|m| m.code == code)
}
