//! Pipeline-level errors.

use cminus_diagnostics::Diagnostic;
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Why an analysis run did not produce a usable symbol table.
#[derive(Error, Debug, MietteDiagnostic)]
pub enum AnalysisError {
    #[error("binding failed with {count} error(s); first: {first}")]
    #[diagnostic(
        code(cminus::binding_failed),
        help("declarations must be unique per scope and every name must be declared before use")
    )]
    Binding { first: Diagnostic, count: usize },

    #[error("type checking failed with {count} error(s); first: {first}")]
    #[diagnostic(code(cminus::checking_failed))]
    Checking { first: Diagnostic, count: usize },

    #[error("invalid analysis options: {0}")]
    #[diagnostic(
        code(cminus::invalid_options),
        help("options are a JSON object with optional stopOnFirstError, wordSize, localBase and traceAnalyze fields")
    )]
    Options(#[from] serde_json::Error),

    #[error("could not read analysis options: {0}")]
    #[diagnostic(code(cminus::io))]
    Io(#[from] std::io::Error),
}
