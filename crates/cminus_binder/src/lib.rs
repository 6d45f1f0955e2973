//! cminus_binder: Symbol table construction and scope analysis.
//!
//! The binder walks the program, creates a scope for every function body,
//! branch, loop body and nested block, declares every name in the scope it
//! belongs to, and assigns storage offsets. The resulting [`ScopeTable`]
//! (scopes, symbols and the function table) is handed to the checker.

mod binder;
mod function_table;
mod layout;
mod listing;
mod scope;
mod symbol;

pub use binder::Binder;
pub use function_table::{FunctionSignature, FunctionTable, ParameterSignature};
pub use layout::{LayoutConfig, StorageLayout};
pub use listing::{SymbolListing, LISTING_HEADER};
pub use scope::{Scope, ScopeId, ScopeTable};
pub use symbol::{Symbol, SymbolRole, SymbolTable, ValueKind};
