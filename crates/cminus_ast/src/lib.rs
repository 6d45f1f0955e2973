//! cminus_ast: Abstract Syntax Tree definitions for C-Minus.
//!
//! This crate defines the node types handed over by the parser, the small
//! type vocabulary the checker writes back into expressions, and the
//! traversal skeleton shared by the semantic passes.

pub mod node;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use types::*;
pub use visitor::{PassResult, SemanticPass};
