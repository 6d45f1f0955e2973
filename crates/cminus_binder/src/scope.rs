//! Scope management for the binder and the checker.
//!
//! Every scope ever created stays in `ScopeTable::scopes`, in creation order,
//! with an explicit link to its lexical parent. The binder creates scopes as
//! it walks; the checker walks the same tree again and replays them in the
//! same order with [`ScopeTable::reenter_next_scope`], so both passes see
//! the same current scope at every node.

use crate::function_table::{FunctionSignature, FunctionTable};
use crate::symbol::{Symbol, SymbolRole, SymbolTable, ValueKind};
use cminus_ast::types::{ScopeKind, SymbolId};
use cminus_diagnostics::{messages, Diagnostic};
use std::fmt;

/// Index of a scope in the table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A lexical scope.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// The enclosing scope (None for the global scope).
    pub parent: Option<ScopeId>,
    /// Nesting depth at creation. Never changes afterwards.
    pub depth: u32,
    /// Line of the construct that opened the scope.
    pub line: u32,
    /// The symbols declared in this scope.
    pub locals: SymbolTable,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>, depth: u32, line: u32) -> Self {
        Self {
            id,
            kind,
            parent,
            depth,
            line,
            locals: SymbolTable::new(),
        }
    }
}

/// The full scope history of one analysis run, plus the function table.
#[derive(Debug)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    functions: FunctionTable,
    current: ScopeId,
    depth: u32,
    /// Next scope handed out by `reenter_next_scope`.
    replay: usize,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeId::GLOBAL, ScopeKind::Global, None, 0, 0)],
            symbols: Vec::new(),
            functions: FunctionTable::new(),
            current: ScopeId::GLOBAL,
            depth: 0,
            replay: 1,
        }
    }

    // ========================================================================
    // Scope navigation
    // ========================================================================

    pub fn enter_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave the innermost scope. The cursor moves out to the nearest
    /// enclosing scope that is no deeper than the new depth.
    pub fn exit_scope(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        while self.scopes[self.current.index()].depth > self.depth {
            match self.scopes[self.current.index()].parent {
                Some(parent) => self.current = parent,
                None => break,
            }
        }
    }

    /// Append a new empty scope at the current depth and make it current.
    pub fn create_scope(&mut self, kind: ScopeKind, line: u32) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes
            .push(Scope::new(id, kind, Some(self.current), self.depth, line));
        self.current = id;
        self.replay = self.scopes.len();
        id
    }

    /// Make the next previously created scope current again. Returns `None`
    /// once every recorded scope has been replayed.
    pub fn reenter_next_scope(&mut self) -> Option<ScopeId> {
        let scope = self.scopes.get(self.replay)?;
        let id = scope.id;
        self.replay += 1;
        self.current = id;
        Some(id)
    }

    /// Return the cursor to the global scope so the recorded scopes can be
    /// replayed from the start.
    pub fn rewind(&mut self) {
        self.current = ScopeId::GLOBAL;
        self.depth = 0;
        self.replay = 1;
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.scopes[self.current.index()].kind
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Iterate from the current scope outwards to the global scope.
    pub fn ancestors(&self) -> impl Iterator<Item = &Scope> {
        let mut next = Some(self.current);
        std::iter::from_fn(move || {
            let scope = self.scopes.get(next?.index())?;
            next = scope.parent;
            Some(scope)
        })
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// Declare `name` in the current scope.
    pub fn insert(
        &mut self,
        name: &str,
        line: u32,
        offset: i32,
        value_kind: ValueKind,
        role: SymbolRole,
    ) -> Result<SymbolId, Diagnostic> {
        self.insert_into(self.current, name, line, offset, value_kind, role)
    }

    /// Declare `name` in the global scope, whatever scope is current.
    pub fn insert_global(
        &mut self,
        name: &str,
        line: u32,
        offset: i32,
        value_kind: ValueKind,
        role: SymbolRole,
    ) -> Result<SymbolId, Diagnostic> {
        self.insert_into(ScopeId::GLOBAL, name, line, offset, value_kind, role)
    }

    fn insert_into(
        &mut self,
        scope: ScopeId,
        name: &str,
        line: u32,
        offset: i32,
        value_kind: ValueKind,
        role: SymbolRole,
    ) -> Result<SymbolId, Diagnostic> {
        if let Some(existing) = self.scopes[scope.index()].locals.get(name) {
            let first_line = self.symbols[existing.index()].declaration_line();
            return Err(duplicate_declaration(name, line, first_line));
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols
            .push(Symbol::new(id, name, scope, line, offset, value_kind, role));
        self.scopes[scope.index()].locals.set(name, id);
        Ok(id)
    }

    /// The diagnostic a declaration of `name` in the current scope would
    /// raise, if the name is already taken there.
    pub fn check_redeclaration(&self, name: &str, line: u32) -> Option<Diagnostic> {
        let existing = self.lookup_local(name)?;
        Some(duplicate_declaration(name, line, existing.declaration_line()))
    }

    /// Append `line` to the symbol `name` resolves to.
    pub fn record_reference(&mut self, name: &str, line: u32) -> Result<SymbolId, Diagnostic> {
        let id = self
            .resolve(name)
            .ok_or_else(|| Diagnostic::at_line(line, &messages::_0_IS_NOT_DECLARED, &[name]))?;
        self.symbols[id.index()].record_line(line);
        Ok(id)
    }

    /// Resolve `name` by walking from the current scope outwards.
    pub fn resolve(&self, name: &str) -> Option<SymbolId> {
        self.ancestors().find_map(|scope| scope.locals.get(name))
    }

    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        self.resolve(name).map(|id| &self.symbols[id.index()])
    }

    /// Look `name` up in the current scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current.index()]
            .locals
            .get(name)
            .map(|id| &self.symbols[id.index()])
    }

    pub fn lookup_function_signature(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Every symbol, in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Symbols declared directly in `scope`, in declaration order.
    pub fn symbols_in(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> {
        self.scopes
            .get(scope.index())
            .into_iter()
            .flat_map(|s| s.locals.ids())
            .map(|id| &self.symbols[id.index()])
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionTable {
        &mut self.functions
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate_declaration(name: &str, line: u32, first_line: u32) -> Diagnostic {
    Diagnostic::at_line(
        line,
        &messages::DECLARATION_OF_0_DUPLICATED_FIRST_DECLARED_AT_LINE_1,
        &[name, &first_line.to_string()],
    )
    .with_related(Diagnostic::at_line(
        first_line,
        &messages::_0_WAS_FIRST_DECLARED_HERE,
        &[name],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cminus_diagnostics::ErrorKind;

    fn declare(table: &mut ScopeTable, name: &str, line: u32) -> Result<SymbolId, Diagnostic> {
        table.insert(name, line, 0, ValueKind::Scalar, SymbolRole::Variable)
    }

    #[test]
    fn test_global_scope_exists() {
        let table = ScopeTable::new();
        assert_eq!(table.current_scope(), ScopeId::GLOBAL);
        assert_eq!(table.depth(), 0);
        assert_eq!(table.scopes().len(), 1);
        assert_eq!(table.current_kind(), ScopeKind::Global);
    }

    #[test]
    fn test_duplicate_in_same_scope_cites_first_line() {
        let mut table = ScopeTable::new();
        declare(&mut table, "x", 1).unwrap();
        let err = declare(&mut table, "x", 2).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateDeclaration);
        assert_eq!(err.line, Some(2));
        assert_eq!(err.related_information[0].line, Some(1));
        assert_eq!(table.symbols().len(), 1);
    }

    #[test]
    fn test_same_name_in_inner_scope_shadows() {
        let mut table = ScopeTable::new();
        let outer = declare(&mut table, "x", 1).unwrap();
        table.enter_scope();
        table.create_scope(ScopeKind::Function, 2);
        let inner = declare(&mut table, "x", 3).unwrap();
        assert_ne!(outer, inner);
        assert_eq!(table.resolve("x"), Some(inner));
        table.exit_scope();
        assert_eq!(table.current_scope(), ScopeId::GLOBAL);
        assert_eq!(table.resolve("x"), Some(outer));
    }

    #[test]
    fn test_record_reference_appends_line() {
        let mut table = ScopeTable::new();
        let id = declare(&mut table, "x", 1).unwrap();
        table.enter_scope();
        table.create_scope(ScopeKind::Function, 2);
        assert_eq!(table.record_reference("x", 4), Ok(id));
        table.exit_scope();
        assert_eq!(table.symbol(id).unwrap().lines, vec![1, 4]);
    }

    #[test]
    fn test_record_reference_undeclared() {
        let mut table = ScopeTable::new();
        let err = table.record_reference("y", 9).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndeclaredIdentifier);
        assert_eq!(err.line, Some(9));
    }

    #[test]
    fn test_sibling_scopes_do_not_see_each_other() {
        let mut table = ScopeTable::new();
        table.enter_scope();
        table.create_scope(ScopeKind::Function, 1);
        table.enter_scope();
        table.create_scope(ScopeKind::Branch, 2);
        declare(&mut table, "t", 2).unwrap();
        table.exit_scope();
        table.enter_scope();
        table.create_scope(ScopeKind::Branch, 3);
        assert!(table.lookup_symbol("t").is_none());
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.depth(), 0);
    }

    #[test]
    fn test_exit_at_depth_zero_saturates() {
        let mut table = ScopeTable::new();
        table.exit_scope();
        assert_eq!(table.depth(), 0);
        assert_eq!(table.current_scope(), ScopeId::GLOBAL);
    }

    #[test]
    fn test_replay_follows_creation_order() {
        let mut table = ScopeTable::new();
        table.enter_scope();
        let f = table.create_scope(ScopeKind::Function, 1);
        declare(&mut table, "a", 1).unwrap();
        table.enter_scope();
        let body = table.create_scope(ScopeKind::Loop, 2);
        table.exit_scope();
        table.exit_scope();

        table.rewind();
        table.enter_scope();
        assert_eq!(table.reenter_next_scope(), Some(f));
        assert!(table.lookup_local("a").is_some());
        table.enter_scope();
        assert_eq!(table.reenter_next_scope(), Some(body));
        assert!(table.lookup_symbol("a").is_some());
        table.exit_scope();
        assert_eq!(table.current_scope(), f);
        table.exit_scope();
        assert_eq!(table.reenter_next_scope(), None);
    }

    #[test]
    fn test_insert_global_from_nested_scope() {
        let mut table = ScopeTable::new();
        table.enter_scope();
        table.create_scope(ScopeKind::Function, 1);
        let id = table
            .insert_global("f", 1, 0, ValueKind::Scalar, SymbolRole::Function)
            .unwrap();
        assert_eq!(table.symbol(id).unwrap().scope, ScopeId::GLOBAL);
        assert_eq!(table.symbols_in(ScopeId::GLOBAL).count(), 1);
        assert!(table.lookup_local("f").is_none());
        assert!(table.check_redeclaration("f", 5).is_none());
    }
}
