//! Scope and symbol resolution
//!
//! Every function body (and every `catch` clause) opens a [`FunctionRecord`]
//! that maps names to how they are bound and used. Visibility is tracked
//! separately, as a stack of frames: each block pushes a frame, and a
//! name declared inside a function is only visible while its frame is live.
//!
//! Names that cannot be resolved while `undef` is in effect are queued and
//! only reported once the enclosing functions have closed, so a later `var`
//! or function declaration still satisfies an earlier reference.

use core_types::SourcePosition;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

use crate::error::ParseResult;
use crate::grammar::Expr;
use crate::messages;
use crate::options::Flags;
use crate::parser::Parser;

/// Index of a record in the resolver.
pub type FunctId = usize;

/// Index of the global record.
pub const GLOBAL: FunctId = 0;

/// How a name is bound in one function record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    /// Declared and not read yet
    Unused,
    /// Declared and read
    Var,
    /// Function declaration not referenced yet
    UnusedFunction,
    /// Function declaration that was referenced
    Function,
    /// Declared here and read from an inner function
    Closure,
    /// Read here, declared in an enclosing function
    Outer,
    /// Read here, declared at the top level
    Global,
    /// Statement label
    Label,
    /// `catch` parameter
    Exception,
    /// `const` declaration
    Const,
    /// Read here and not declared anywhere visible
    Implied,
}

/// What opened a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// The program
    Global,
    /// A function body
    Function,
    /// A `catch` clause
    Catch,
}

/// Size and shape counters of one function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Statements directly in the body and its blocks
    pub statements: u32,
    /// Deepest block nesting reached
    pub max_depth: u32,
    /// Cyclomatic complexity
    pub complexity: u32,
    /// Number of declared parameters
    pub parameters: u32,
    #[serde(skip)]
    pub(crate) nested_block_depth: i32,
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics {
            statements: 0,
            max_depth: 0,
            complexity: 1,
            parameters: 0,
            nested_block_depth: -1,
        }
    }
}

/// Bindings and bookkeeping of one function, `catch` clause or the program.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    /// Declared name, or the quoted name it was assigned to
    pub name: String,
    /// Line where the parameter list starts
    pub line: u32,
    /// Column after the first token of the parameter list
    pub character: u32,
    /// Where size diagnostics for this function are reported
    pub opened_at: SourcePosition,
    /// Line of the closing brace
    pub last: u32,
    /// Column after the closing brace
    pub last_character: u32,
    /// Enclosing record
    pub parent: Option<FunctId>,
    /// What opened the record
    pub kind: FunctionKind,
    /// Opened by a function declaration rather than an expression
    pub is_statement: bool,
    /// Name bindings, in declaration order
    pub bindings: IndexMap<String, Binding>,
    /// Where each name was declared
    pub tokens: HashMap<String, SourcePosition>,
    /// Parameter names, `None` for an empty list
    pub params: Option<Vec<String>>,
    /// Enclosing constructs that accept `break`
    pub breakage: u32,
    /// Enclosing loops
    pub loopage: u32,
    /// Size counters
    pub metrics: Metrics,
    /// Keyword of the statement being parsed
    pub verb: Option<String>,
    /// A `var` statement was seen
    pub has_var: bool,
}

impl FunctionRecord {
    /// A fresh record.
    pub fn new(name: String, kind: FunctionKind, parent: Option<FunctId>, at: SourcePosition) -> Self {
        FunctionRecord {
            name,
            line: at.line,
            character: at.column,
            opened_at: at,
            last: 0,
            last_character: 0,
            parent,
            kind,
            is_statement: false,
            bindings: IndexMap::new(),
            tokens: HashMap::new(),
            params: None,
            breakage: 0,
            loopage: 0,
            metrics: Metrics::default(),
            verb: None,
            has_var: false,
        }
    }

    /// Whether this is the program record
    pub fn is_global(&self) -> bool {
        self.kind == FunctionKind::Global
    }
}

/// An unresolved name waiting for its enclosing functions to close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUndef {
    /// Record the reference was made from
    pub origin: FunctId,
    /// The name
    pub name: String,
    /// Where it was read
    pub at: SourcePosition,
}

/// A binding that was declared and never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedBinding {
    /// The name
    pub name: String,
    /// Line of the declaration
    pub line: u32,
    /// Column of the declaration
    pub character: u32,
}

/// All records of a run plus the visibility stack.
#[derive(Debug)]
pub struct Resolver {
    functs: Vec<FunctionRecord>,
    current: FunctId,
    frames: Vec<HashMap<String, FunctId>>,
    pub(crate) pending: Vec<PendingUndef>,
    pub(crate) implied: IndexMap<String, Vec<u32>>,
    pub(crate) unused: Vec<UnusedBinding>,
    pub(crate) declared: IndexMap<String, SourcePosition>,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new()
    }
}

impl Resolver {
    /// A resolver holding only the program record.
    pub fn new() -> Self {
        let global = FunctionRecord::new(
            "(global)".to_string(),
            FunctionKind::Global,
            None,
            SourcePosition::new(0, 0),
        );
        Resolver {
            functs: vec![global],
            current: GLOBAL,
            frames: vec![HashMap::new()],
            pending: Vec::new(),
            implied: IndexMap::new(),
            unused: Vec::new(),
            declared: IndexMap::new(),
        }
    }

    /// Id of the innermost open record
    pub fn current_id(&self) -> FunctId {
        self.current
    }

    /// The innermost open record
    pub fn current(&self) -> &FunctionRecord {
        &self.functs[self.current]
    }

    /// The innermost open record, mutably
    pub fn current_mut(&mut self) -> &mut FunctionRecord {
        &mut self.functs[self.current]
    }

    /// A record by id
    pub fn record(&self, id: FunctId) -> &FunctionRecord {
        &self.functs[id]
    }

    /// Every record, the program first
    pub fn records(&self) -> &[FunctionRecord] {
        &self.functs
    }

    /// How `name` is bound in record `id`
    pub fn binding(&self, id: FunctId, name: &str) -> Option<Binding> {
        self.functs[id].bindings.get(name).copied()
    }

    /// Bind `name` in record `id`
    pub fn set_binding(&mut self, id: FunctId, name: &str, binding: Binding) {
        self.functs[id].bindings.insert(name.to_string(), binding);
    }

    /// Record that owns the visible declaration of `name`
    pub fn lookup(&self, name: &str) -> Option<FunctId> {
        self.frames.iter().rev().find_map(|frame| frame.get(name).copied())
    }

    /// Make `name` visible from the innermost frame, or program-wide for
    /// a top-level declaration.
    pub fn make_visible(&mut self, name: &str, owner: FunctId) {
        let frame = if self.functs[owner].is_global() {
            self.frames.first_mut()
        } else {
            self.frames.last_mut()
        };
        if let Some(frame) = frame {
            frame.insert(name.to_string(), owner);
        }
    }

    /// Names visible at the top level
    pub fn global_names(&self) -> impl Iterator<Item = &String> {
        self.frames[0].keys()
    }

    /// Whether `name` is declared at the top level
    pub fn is_global_name(&self, name: &str) -> bool {
        self.frames[0].contains_key(name)
    }

    /// Number of live frames
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Open a visibility frame
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Drop frames down to `depth`; the program frame always stays.
    pub fn truncate_frames(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
    }

    /// Open a record and make it current.
    pub fn open(&mut self, mut record: FunctionRecord) -> FunctId {
        record.parent = Some(self.current);
        self.functs.push(record);
        self.current = self.functs.len() - 1;
        self.current
    }

    /// Return to the parent of the current record.
    pub fn close(&mut self) {
        if let Some(parent) = self.functs[self.current].parent {
            self.current = parent;
        }
    }

    /// Whether `id` is `ancestor` or nested inside it
    pub fn is_within(&self, id: FunctId, ancestor: FunctId) -> bool {
        let mut cursor = Some(id);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.functs[id].parent;
        }
        false
    }

    /// Note that `name` was read on `line` without a declaration.
    pub fn note_implied(&mut self, name: &str, line: u32) {
        let lines = self.implied.entry(name.to_string()).or_default();
        if lines.last() != Some(&line) {
            lines.push(line);
        }
    }

    /// Forget one implied-global line of `name`.
    pub fn clear_implied(&mut self, name: &str, line: u32) {
        if let Some(lines) = self.implied.get_mut(name) {
            lines.retain(|l| *l != line);
            if lines.is_empty() {
                self.implied.shift_remove(name);
            }
        }
    }

    /// Treat a queued reference as satisfied if record `id` declares
    /// `name`, marking the declaration as used.
    fn mark_defined(&mut self, id: FunctId, name: &str) -> bool {
        match self.binding(id, name) {
            None | Some(Binding::Implied) => false,
            Some(Binding::Unused) => {
                self.set_binding(id, name, Binding::Var);
                true
            }
            Some(Binding::UnusedFunction) => {
                self.set_binding(id, name, Binding::Closure);
                true
            }
            Some(_) => true,
        }
    }

    /// Settle queued references made from inside record `exiting`.
    pub fn reconcile(&mut self, exiting: FunctId) {
        let pending = std::mem::take(&mut self.pending);
        for undef in pending {
            if self.is_within(undef.origin, exiting) && self.mark_defined(exiting, &undef.name) {
                self.clear_implied(&undef.name, undef.at.line);
            } else {
                self.pending.push(undef);
            }
        }
    }

    /// Declared bindings of record `id` that were never read.
    ///
    /// Locals come first, in declaration order. Parameters are only
    /// reported from the end of the list, up to the first one that is used.
    pub fn unused_in(&self, id: FunctId) -> Vec<(String, SourcePosition)> {
        let record = &self.functs[id];
        let params = record.params.as_deref().unwrap_or(&[]);
        let at = |name: &str| {
            record
                .tokens
                .get(name)
                .copied()
                .unwrap_or_else(SourcePosition::detached)
        };
        let never_read = |binding: Option<&Binding>| {
            matches!(binding, Some(Binding::Unused) | Some(Binding::UnusedFunction))
        };

        let mut found: Vec<(String, SourcePosition)> = record
            .bindings
            .iter()
            .filter(|(name, binding)| never_read(Some(*binding)) && !params.contains(*name))
            .map(|(name, _)| (name.clone(), at(name)))
            .collect();

        for param in params.iter().rev() {
            if param == "undefined" || !never_read(record.bindings.get(param)) {
                break;
            }
            found.push((param.clone(), at(param)));
        }
        found
    }
}

impl Parser {
    /// Whether unresolved names are reported.
    pub(crate) fn undef_enabled(&self) -> bool {
        self.options.has(Flags::UNDEF) || self.strict_active()
    }

    /// Declare `name` in the current record.
    pub(crate) fn declare(&mut self, name: &str, binding: Binding, at: SourcePosition) -> ParseResult<()> {
        if name == "hasOwnProperty" {
            self.warn_next(&messages::BAD_NAME, &[])?;
        }
        let id = self.scope.current_id();
        let is_global = self.scope.current().is_global();

        if binding == Binding::Exception {
            let shadows = self
                .scope
                .current()
                .parent
                .map_or(false, |parent| self.scope.binding(parent, name).is_some());
            if shadows && !self.options.has(Flags::NODE) {
                self.warn_next(&messages::OVERWRITTEN_IN_IE, &[name])?;
            }
        }

        if !is_global {
            match self.scope.binding(id, name) {
                Some(Binding::Implied) => {
                    if self.options.has(Flags::LATEDEF) {
                        self.warn_next(&messages::USED_BEFORE_DEFINED, &[name])?;
                    }
                }
                Some(_) if !self.options.has(Flags::SHADOW) && binding != Binding::Exception => {
                    self.warn_next(&messages::ALREADY_DEFINED, &[name])?;
                }
                _ => {}
            }
        }

        self.scope.set_binding(id, name, binding);
        self.scope.current_mut().tokens.insert(name.to_string(), at);
        self.scope.make_visible(name, id);

        if is_global && self.scope.implied.contains_key(name) {
            if self.options.has(Flags::LATEDEF) {
                self.warn_next(&messages::USED_BEFORE_DEFINED, &[name])?;
            }
            self.scope.implied.shift_remove(name);
        }
        Ok(())
    }

    /// Resolve a name read by an expression and update how it is bound.
    pub(crate) fn reference(&mut self, node: &mut Expr) -> ParseResult<()> {
        let name = node.value.clone();
        let current = self.scope.current_id();
        let owner = match self.scope.lookup(&name) {
            Some(owner) => Some(owner),
            None if self.globals.contains(&name) => {
                self.scope.set_binding(GLOBAL, &name, Binding::Var);
                self.scope.make_visible(&name, GLOBAL);
                Some(GLOBAL)
            }
            None => None,
        };

        if owner == Some(current) {
            match self.scope.binding(current, &name) {
                Some(Binding::Unused) => self.scope.set_binding(current, &name, Binding::Var),
                Some(Binding::UnusedFunction) => {
                    self.scope.set_binding(current, &name, Binding::Function);
                    node.is_function = true;
                }
                Some(Binding::Function) => node.is_function = true,
                Some(Binding::Label) => {
                    self.warn_at(&messages::IS_A_LABEL, node.position(), &[&name])?;
                }
                _ => {}
            }
            return Ok(());
        }

        if self.scope.current().is_global() {
            self.queue_undef(&name, node.position());
            self.scope.note_implied(&name, node.line);
            return Ok(());
        }

        match self.scope.binding(current, &name) {
            Some(Binding::Closure | Binding::Function | Binding::Var | Binding::Unused) => {
                self.warn_at(&messages::OUT_OF_SCOPE, node.position(), &[&name])?;
            }
            Some(Binding::Label) => {
                self.warn_at(&messages::IS_A_LABEL, node.position(), &[&name])?;
            }
            Some(Binding::Outer | Binding::Global) => {}
            _ => match owner {
                None => {
                    self.queue_undef(&name, node.position());
                    self.scope.set_binding(current, &name, Binding::Implied);
                    self.scope.note_implied(&name, node.line);
                }
                Some(owner) => {
                    let seen_as = if self.scope.record(owner).is_global() {
                        Binding::Global
                    } else {
                        Binding::Outer
                    };
                    match self.scope.binding(owner, &name) {
                        Some(Binding::Function | Binding::UnusedFunction) => {
                            node.is_function = true;
                            self.scope.set_binding(owner, &name, Binding::Closure);
                            self.scope.set_binding(current, &name, seen_as);
                        }
                        Some(Binding::Var | Binding::Unused) => {
                            self.scope.set_binding(owner, &name, Binding::Closure);
                            self.scope.set_binding(current, &name, seen_as);
                        }
                        Some(Binding::Closure) => {
                            self.scope.set_binding(current, &name, seen_as);
                        }
                        Some(Binding::Label) => {
                            self.warn_at(&messages::IS_A_LABEL, node.position(), &[&name])?;
                        }
                        _ => {}
                    }
                }
            },
        }
        Ok(())
    }

    fn queue_undef(&mut self, name: &str, at: SourcePosition) {
        if !self.undef_enabled() {
            return;
        }
        let probing = matches!(self.anon_name.as_str(), "typeof" | "delete")
            && !(self.next.is_punct(".") || self.next.is_punct("["));
        if probing {
            return;
        }
        trace!(name, line = at.line, "queued unresolved name");
        self.scope.pending.push(PendingUndef {
            origin: self.scope.current_id(),
            name: name.to_string(),
            at,
        });
    }

    /// Report a binding that was never read.
    pub(crate) fn warn_unused(&mut self, name: &str, at: SourcePosition) -> ParseResult<()> {
        self.scope.unused.push(UnusedBinding {
            name: name.to_string(),
            line: at.line,
            character: at.column,
        });
        if self.options.has(Flags::UNUSED) {
            self.warn_at(&messages::UNUSED, at, &[name])?;
        }
        Ok(())
    }

    /// Close the current function or `catch` record.
    pub(crate) fn close_record(&mut self) -> ParseResult<()> {
        let id = self.scope.current_id();
        self.scope.reconcile(id);
        if self.scope.current().kind == FunctionKind::Function {
            for (name, at) in self.scope.unused_in(id) {
                self.warn_unused(&name, at)?;
            }
        }
        self.scope.close();
        Ok(())
    }

    /// Settle everything that is still open when the input ends.
    pub(crate) fn close_global(&mut self) -> ParseResult<()> {
        self.scope.reconcile(GLOBAL);
        let pending = std::mem::take(&mut self.scope.pending);
        for undef in pending {
            self.warn_at(&messages::NOT_DEFINED, undef.at, &[&undef.name])?;
        }
        for (name, at) in self.scope.unused_in(GLOBAL) {
            self.warn_unused(&name, at)?;
        }
        let declared: Vec<(String, SourcePosition)> = self
            .scope
            .declared
            .iter()
            .filter(|(name, _)| !self.scope.is_global_name(name))
            .map(|(name, at)| (name.clone(), *at))
            .collect();
        for (name, at) in declared {
            self.warn_unused(&name, at)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(resolver: &mut Resolver, name: &str) -> FunctId {
        resolver.open(FunctionRecord::new(
            name.to_string(),
            FunctionKind::Function,
            None,
            SourcePosition::new(1, 1),
        ))
    }

    #[test]
    fn test_frames_control_visibility() {
        let mut resolver = Resolver::new();
        let f = function(&mut resolver, "f");
        resolver.push_frame();
        let depth = resolver.frame_depth();
        resolver.push_frame();
        resolver.set_binding(f, "x", Binding::Unused);
        resolver.make_visible("x", f);
        assert_eq!(resolver.lookup("x"), Some(f));
        resolver.truncate_frames(depth);
        assert_eq!(resolver.lookup("x"), None);
        assert_eq!(resolver.binding(f, "x"), Some(Binding::Unused));
    }

    #[test]
    fn test_global_declarations_use_program_frame() {
        let mut resolver = Resolver::new();
        resolver.push_frame();
        resolver.set_binding(GLOBAL, "g", Binding::Unused);
        resolver.make_visible("g", GLOBAL);
        resolver.truncate_frames(1);
        assert!(resolver.is_global_name("g"));
        assert_eq!(resolver.lookup("g"), Some(GLOBAL));
    }

    #[test]
    fn test_reconcile_marks_later_declaration_used() {
        let mut resolver = Resolver::new();
        let f = function(&mut resolver, "f");
        let g = function(&mut resolver, "g");
        resolver.pending.push(PendingUndef {
            origin: g,
            name: "x".to_string(),
            at: SourcePosition::new(2, 5),
        });
        resolver.note_implied("x", 2);
        resolver.reconcile(g);
        assert_eq!(resolver.pending.len(), 1);
        resolver.close();

        resolver.set_binding(f, "x", Binding::Unused);
        resolver.reconcile(f);
        assert!(resolver.pending.is_empty());
        assert_eq!(resolver.binding(f, "x"), Some(Binding::Var));
        assert!(resolver.implied.is_empty());
    }

    #[test]
    fn test_unused_params_only_from_the_end() {
        let mut resolver = Resolver::new();
        let f = function(&mut resolver, "f");
        for (name, binding) in [("a", Binding::Unused), ("b", Binding::Var), ("c", Binding::Unused)] {
            resolver.set_binding(f, name, binding);
        }
        resolver.set_binding(f, "local", Binding::UnusedFunction);
        resolver.current_mut().params =
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        let names: Vec<String> = resolver.unused_in(f).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["local", "c"]);
    }

    #[test]
    fn test_implied_lines_are_deduplicated() {
        let mut resolver = Resolver::new();
        resolver.note_implied("q", 3);
        resolver.note_implied("q", 3);
        resolver.note_implied("q", 4);
        assert_eq!(resolver.implied["q"], vec![3, 4]);
        resolver.clear_implied("q", 3);
        resolver.clear_implied("q", 4);
        assert!(!resolver.implied.contains_key("q"));
    }

    #[test]
    fn test_is_within_follows_parents() {
        let mut resolver = Resolver::new();
        let f = function(&mut resolver, "f");
        let g = function(&mut resolver, "g");
        assert!(resolver.is_within(g, f));
        assert!(resolver.is_within(g, GLOBAL));
        assert!(!resolver.is_within(f, g));
    }
}
