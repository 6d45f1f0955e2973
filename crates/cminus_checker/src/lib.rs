//! cminus_checker: The C-Minus semantic checker.
//!
//! Runs after the binder over the same tree and the same scopes. It types
//! every expression and reports void misuse, array/scalar confusion, call
//! arity and shape mismatches, inconsistent returns and `main` violations.

mod checker;

pub use checker::{Checker, MAIN_FUNCTION};
