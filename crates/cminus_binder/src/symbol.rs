//! Symbol and symbol table definitions.

use crate::scope::ScopeId;
use cminus_ast::types::{ExprType, SymbolId, TypeSpecifier};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;

/// What a declared name stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolRole {
    Variable,
    Parameter,
    Function,
}

impl SymbolRole {
    /// Short label used in the symbol listing.
    pub fn label(self) -> &'static str {
        match self {
            SymbolRole::Variable => "Var",
            SymbolRole::Parameter => "Par",
            SymbolRole::Function => "Func",
        }
    }
}

impl fmt::Display for SymbolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// The shape of the value a symbol denotes.
///
/// Array parameters carry no size (`Array(None)`); array variables carry their
/// declared element count. A function's kind follows its return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Array(Option<u32>),
    Void,
}

impl ValueKind {
    pub fn from_specifier(type_specifier: TypeSpecifier) -> Self {
        match type_specifier {
            TypeSpecifier::Int => ValueKind::Scalar,
            TypeSpecifier::Void => ValueKind::Void,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, ValueKind::Array(_))
    }

    pub fn is_void(self) -> bool {
        self == ValueKind::Void
    }

    pub fn array_size(self) -> Option<u32> {
        match self {
            ValueKind::Array(size) => size,
            _ => None,
        }
    }

    /// The type an identifier of this kind has when used as an expression.
    pub fn expr_type(self) -> ExprType {
        match self {
            ValueKind::Void => ExprType::Void,
            ValueKind::Scalar | ValueKind::Array(_) => ExprType::Integer,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValueKind::Scalar => "int",
            ValueKind::Array(_) => "array",
            ValueKind::Void => "void",
        }
    }
}

/// A declared name together with everything later phases need about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    /// The scope the symbol was declared in.
    pub scope: ScopeId,
    /// Declaration line first, then every referencing line in walk order.
    pub lines: Vec<u32>,
    /// Storage offset, or the function index for functions.
    pub offset: i32,
    pub role: SymbolRole,
    pub value_kind: ValueKind,
}

impl Symbol {
    pub fn new(
        id: SymbolId,
        name: &str,
        scope: ScopeId,
        line: u32,
        offset: i32,
        value_kind: ValueKind,
        role: SymbolRole,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            scope,
            lines: vec![line],
            offset,
            role,
            value_kind,
        }
    }

    pub fn declaration_line(&self) -> u32 {
        self.lines[0]
    }

    /// Lines on which the symbol is used, in the order they were recorded.
    pub fn reference_lines(&self) -> &[u32] {
        &self.lines[1..]
    }

    /// Append a referencing line. Repeated uses on the line last recorded
    /// collapse into one entry.
    pub fn record_line(&mut self, line: u32) {
        if self.lines.last() != Some(&line) {
            self.lines.push(line);
        }
    }

    pub fn is_array(&self) -> bool {
        self.value_kind.is_array()
    }
}

/// Maps names to symbols, preserving declaration order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    table: IndexMap<String, SymbolId, FxBuildHasher>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.table.get(name).copied()
    }

    pub fn set(&mut self, name: &str, symbol: SymbolId) {
        self.table.insert(name.to_string(), symbol);
    }

    pub fn has(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.table.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.table.values().copied()
    }
}
