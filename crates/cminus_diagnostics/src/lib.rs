//! cminus_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every semantic violation the binder or checker can raise is described by a
//! [`DiagnosticMessage`] in [`messages`]. A realized [`Diagnostic`] carries the
//! resolved text, the source line, and the [`ErrorKind`] it belongs to, so
//! callers can match on the kind instead of parsing message strings.

use std::fmt;

/// The semantic error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateDeclaration,
    UndeclaredIdentifier,
    /// Void used as a value, array/scalar confusion, or a void operand.
    TypeMismatch,
    ArityMismatch,
    SignatureMismatch,
    MainSignatureViolation,
    MissingOrExtraReturn,
    /// The checker was handed a scope table that does not match the tree.
    ScopeReplayMismatch,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::DuplicateDeclaration => "DuplicateDeclaration",
            ErrorKind::UndeclaredIdentifier => "UndeclaredIdentifier",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::ArityMismatch => "ArityMismatch",
            ErrorKind::SignatureMismatch => "SignatureMismatch",
            ErrorKind::MainSignatureViolation => "MainSignatureViolation",
            ErrorKind::MissingOrExtraReturn => "MissingOrExtraReturn",
            ErrorKind::ScopeReplayMismatch => "ScopeReplayMismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Error,
    /// Supplementary information attached to an error (e.g. "first declared here").
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code, category and error kind.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1001, 3002).
    pub code: u32,
    pub category: DiagnosticCategory,
    pub kind: ErrorKind,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    /// The source line the diagnostic points at, if any.
    pub line: Option<u32>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
    /// Related diagnostics.
    pub related_information: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Create a new diagnostic without location info (program-wide diagnostic).
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            kind: message.kind,
            line: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    /// Create a new diagnostic pointing at a source line.
    pub fn at_line(line: u32, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            line: Some(line),
            ..Self::new(message, args)
        }
    }

    /// Add related diagnostic information.
    pub fn with_related(mut self, related: Diagnostic) -> Self {
        self.related_information.push(related);
        self
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }
        write!(
            f,
            "{} CM{} ({}): {}",
            self.category, self.code, self.kind, self.message_text
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during analysis.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The first diagnostic reported, in report order.
    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    /// Error kinds in report order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.diagnostics.iter().map(|d| d.kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort diagnostics by line. Program-wide diagnostics sort last.
    pub fn sort(&mut self) {
        self.diagnostics
            .sort_by_key(|d| d.line.unwrap_or(u32::MAX));
    }
}

impl fmt::Display for DiagnosticCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
            for related in &diagnostic.related_information {
                writeln!(f, "  {}", related)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $kind:ident, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, kind: ErrorKind::$kind, message: $msg }
        };
        ($code:expr, Message, $kind:ident, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Message, kind: ErrorKind::$kind, message: $msg }
        };
    }

    // ========================================================================
    // Binding errors (1000-1099)
    // ========================================================================
    pub const DECLARATION_OF_0_DUPLICATED_FIRST_DECLARED_AT_LINE_1: DiagnosticMessage = diag!(1001, Error, DuplicateDeclaration, "Declaration of '{0}' duplicated; first declared at line {1}.");
    pub const _0_IS_NOT_DECLARED: DiagnosticMessage = diag!(1002, Error, UndeclaredIdentifier, "'{0}' is not declared in this scope.");
    pub const _0_WAS_FIRST_DECLARED_HERE: DiagnosticMessage = diag!(1003, Message, DuplicateDeclaration, "'{0}' was first declared here.");

    // ========================================================================
    // Type errors (2000-2099)
    // ========================================================================
    pub const VARIABLE_0_CANNOT_HAVE_TYPE_VOID: DiagnosticMessage = diag!(2001, Error, TypeMismatch, "Variable '{0}' cannot be declared with type void.");
    pub const PARAMETER_0_CANNOT_HAVE_TYPE_VOID: DiagnosticMessage = diag!(2002, Error, TypeMismatch, "Parameter '{0}' cannot be declared with type void.");
    pub const _0_IS_NOT_AN_ARRAY: DiagnosticMessage = diag!(2003, Error, TypeMismatch, "'{0}' is not an array and cannot be indexed.");
    pub const INDEX_OF_0_MUST_BE_AN_INTEGER: DiagnosticMessage = diag!(2004, Error, TypeMismatch, "Index into '{0}' must be an integer expression, found {1}.");
    pub const A_VOID_EXPRESSION_CANNOT_BE_ASSIGNED: DiagnosticMessage = diag!(2005, Error, TypeMismatch, "A void expression cannot be assigned.");
    pub const OPERAND_OF_0_CANNOT_BE_VOID: DiagnosticMessage = diag!(2006, Error, TypeMismatch, "Operand of '{0}' cannot be void.");
    pub const _0_IS_NOT_A_FUNCTION: DiagnosticMessage = diag!(2007, Error, TypeMismatch, "'{0}' is not a function.");
    pub const A_VOID_EXPRESSION_CANNOT_BE_RETURNED: DiagnosticMessage = diag!(2008, Error, TypeMismatch, "A void expression cannot be returned.");
    pub const ARGUMENT_0_OF_1_CANNOT_BE_VOID: DiagnosticMessage = diag!(2009, Error, TypeMismatch, "Argument {0} of call to '{1}' cannot be void.");
    pub const CONDITION_OF_0_CANNOT_BE_VOID: DiagnosticMessage = diag!(2010, Error, TypeMismatch, "Condition of '{0}' cannot be void.");

    // ========================================================================
    // Call errors (3000-3099)
    // ========================================================================
    pub const FUNCTION_0_EXPECTS_1_ARGUMENTS_BUT_GOT_2: DiagnosticMessage = diag!(3001, Error, ArityMismatch, "Function '{0}' expects {1} argument(s) but got {2}.");
    pub const ARGUMENT_0_OF_1_MUST_BE_2_BUT_GOT_3: DiagnosticMessage = diag!(3002, Error, SignatureMismatch, "Argument {0} of call to '{1}' must be {2} but got {3}.");

    // ========================================================================
    // Entry point errors (4000-4099)
    // ========================================================================
    pub const MAIN_MUST_RETURN_VOID: DiagnosticMessage = diag!(4001, Error, MainSignatureViolation, "Function 'main' must return void.");
    pub const MAIN_MUST_NOT_HAVE_PARAMETERS: DiagnosticMessage = diag!(4002, Error, MainSignatureViolation, "Function 'main' must not declare parameters.");
    pub const MAIN_MUST_BE_LAST_0_IS_DECLARED_AFTER_IT: DiagnosticMessage = diag!(4003, Error, MainSignatureViolation, "Function 'main' must be the last declared function; '{0}' is declared after it.");
    pub const PROGRAM_HAS_NO_MAIN: DiagnosticMessage = diag!(4004, Error, MainSignatureViolation, "Program does not declare a 'main' function.");

    // ========================================================================
    // Return errors (5000-5099)
    // ========================================================================
    pub const VOID_FUNCTION_0_CANNOT_RETURN_A_VALUE: DiagnosticMessage = diag!(5001, Error, MissingOrExtraReturn, "Void function '{0}' cannot return a value.");
    pub const FUNCTION_0_MUST_END_WITH_A_RETURN_VALUE: DiagnosticMessage = diag!(5002, Error, MissingOrExtraReturn, "Function '{0}' must end with a return statement that yields a value.");
    pub const RETURN_IN_0_MUST_YIELD_A_VALUE: DiagnosticMessage = diag!(5003, Error, MissingOrExtraReturn, "Return in non-void function '{0}' must yield a value.");

    // ========================================================================
    // Pass ordering errors (9000-9099)
    // ========================================================================
    pub const NO_RECORDED_SCOPE_FOR_0_AT_LINE_1: DiagnosticMessage = diag!(9001, Error, ScopeReplayMismatch, "No recorded scope for the {0} scope at line {1}; the scope table does not come from a complete binding of this program.");
}
