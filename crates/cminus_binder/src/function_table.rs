//! The registry of function signatures used for call-site checks.

use cminus_ast::node::FunctionDeclaration;
use cminus_ast::types::{NodeId, SymbolId, TypeSpecifier};
use indexmap::IndexMap;

/// Shape of one declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSignature {
    pub name: String,
    pub is_array: bool,
}

/// Everything a call site needs to know about a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub line: u32,
    pub return_type: TypeSpecifier,
    pub parameters: Vec<ParameterSignature>,
    pub node: NodeId,
    pub symbol: SymbolId,
    /// Discovery index, also stored as the symbol's offset.
    pub index: i32,
}

impl FunctionSignature {
    pub fn from_declaration(node: &FunctionDeclaration<'_>, symbol: SymbolId, index: i32) -> Self {
        Self {
            name: node.name.text.to_string(),
            line: node.data.line,
            return_type: node.return_type,
            parameters: node
                .parameters
                .iter()
                .map(|p| ParameterSignature {
                    name: p.name.text.to_string(),
                    is_array: p.is_array,
                })
                .collect(),
            node: node.data.id,
            symbol,
            index,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// Append-only, discovery-ordered table of functions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    entries: IndexMap<String, FunctionSignature>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signature. Returns the existing entry, untouched, if the
    /// name is already taken.
    pub fn register(&mut self, signature: FunctionSignature) -> Result<(), &FunctionSignature> {
        use indexmap::map::Entry;
        match self.entries.entry(signature.name.clone()) {
            Entry::Occupied(existing) => Err(&*existing.into_mut()),
            Entry::Vacant(slot) => {
                slot.insert(signature);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Discovery position of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&FunctionSignature> {
        self.entries.get_index(index).map(|(_, sig)| sig)
    }

    /// The most recently discovered function.
    pub fn last(&self) -> Option<&FunctionSignature> {
        self.entries.last().map(|(_, sig)| sig)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(name: &str, line: u32, index: i32) -> FunctionSignature {
        FunctionSignature {
            name: name.to_string(),
            line,
            return_type: TypeSpecifier::Int,
            parameters: vec![ParameterSignature {
                name: "a".to_string(),
                is_array: true,
            }],
            node: NodeId(index as u32),
            symbol: SymbolId(index as u32),
            index,
        }
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut table = FunctionTable::new();
        assert!(table.register(signature("f", 1, 0)).is_ok());
        let existing = table.register(signature("f", 7, 1)).unwrap_err();
        assert_eq!(existing.line, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_discovery_order() {
        let mut table = FunctionTable::new();
        table.register(signature("f", 1, 0)).unwrap();
        table.register(signature("main", 5, 1)).unwrap();
        table.register(signature("g", 9, 2)).unwrap();
        assert_eq!(table.position("main"), Some(1));
        assert_eq!(table.last().map(|s| s.name.as_str()), Some("g"));
        assert_eq!(table.get_index(2).map(|s| s.line), Some(9));
        assert_eq!(table.get("f").map(|s| s.arity()), Some(1));
    }
}
