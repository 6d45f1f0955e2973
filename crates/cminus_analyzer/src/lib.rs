//! cminus_analyzer: Semantic analysis orchestration.
//!
//! Runs the binder and then the checker over a parsed program and gathers
//! their diagnostics. The checker only runs when binding produced no errors.

mod error;

pub use error::AnalysisError;

use cminus_ast::Program;
use cminus_binder::{Binder, LayoutConfig, ScopeTable};
use cminus_checker::Checker;
use cminus_diagnostics::DiagnosticCollection;
use cminus_options::AnalysisOptions;
use std::io;

/// How far an analysis run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Binding reported errors; the checker did not run.
    BindFailed,
    /// Binding succeeded; checking reported errors.
    CheckFailed,
    Succeeded,
}

/// The result of analyzing one program.
#[derive(Debug)]
pub struct Analysis {
    /// Scopes, symbols, offsets and the function table.
    pub table: ScopeTable,
    /// Binder diagnostics followed by checker diagnostics.
    pub diagnostics: DiagnosticCollection,
    pub outcome: Outcome,
}

impl Analysis {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }

    /// The symbol table on success, otherwise an error summarizing the
    /// first diagnostic.
    pub fn into_result(self) -> Result<ScopeTable, AnalysisError> {
        let count = self.diagnostics.error_count();
        let first = self.diagnostics.first().cloned();
        match (self.outcome, first) {
            (Outcome::Succeeded, _) | (_, None) => Ok(self.table),
            (Outcome::BindFailed, Some(first)) => Err(AnalysisError::Binding { first, count }),
            (Outcome::CheckFailed, Some(first)) => Err(AnalysisError::Checking { first, count }),
        }
    }
}

/// Drives the binder and the checker with one set of options.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    options: AnalysisOptions,
}

impl Analyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    /// Create an analyzer from a JSON options string.
    pub fn from_options_json(content: &str) -> Result<Self, AnalysisError> {
        Ok(Self::new(cminus_options::parse_options(content)?))
    }

    /// Create an analyzer from a JSON options file.
    pub fn from_options_file(path: &str) -> Result<Self, AnalysisError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_options_json(&content)
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            word_size: self.options.word_size(),
            local_base: self.options.local_base(),
        }
    }

    /// Bind and check `program`.
    #[tracing::instrument(level = "debug", skip_all, fields(declarations = program.declarations.len()))]
    pub fn analyze(&self, program: &Program<'_>) -> Analysis {
        let mut binder = self.bind(program);
        let diagnostics = binder.take_diagnostics();
        self.check(program, binder, diagnostics)
    }

    /// Bind and check `program`, printing the symbol listing to `sink`
    /// after each pass when `traceAnalyze` is set.
    #[tracing::instrument(level = "debug", skip_all, fields(declarations = program.declarations.len()))]
    pub fn analyze_with_listing<W: io::Write>(
        &self,
        program: &Program<'_>,
        sink: &mut W,
    ) -> io::Result<Analysis> {
        let trace = self.options.trace_analyze();
        let mut binder = self.bind(program);
        let diagnostics = binder.take_diagnostics();
        if trace {
            writeln!(sink, "\nSymbol table after binding:\n")?;
            binder.table().write_listing(sink)?;
        }

        let analysis = self.check(program, binder, diagnostics);
        if trace && analysis.outcome != Outcome::BindFailed {
            writeln!(sink, "\nSymbol table after checking:\n")?;
            analysis.table.write_listing(sink)?;
        }
        Ok(analysis)
    }

    fn bind(&self, program: &Program<'_>) -> Binder {
        let mut binder = Binder::with_options(self.layout(), self.options.stop_on_first_error());
        binder.bind_program(program);
        binder
    }

    /// Run the checker unless binding already failed.
    fn check(
        &self,
        program: &Program<'_>,
        binder: Binder,
        mut diagnostics: DiagnosticCollection,
    ) -> Analysis {
        if diagnostics.has_errors() {
            tracing::debug!(errors = diagnostics.error_count(), "binding failed, skipping checker");
            return Analysis {
                table: binder.into_table(),
                diagnostics,
                outcome: Outcome::BindFailed,
            };
        }

        let mut checker = Checker::with_options(binder, self.options.stop_on_first_error());
        checker.check_program(program);
        diagnostics.extend(checker.take_diagnostics());

        let outcome = if diagnostics.has_errors() {
            Outcome::CheckFailed
        } else {
            Outcome::Succeeded
        };
        tracing::debug!(?outcome, errors = diagnostics.error_count(), "analysis complete");
        Analysis {
            table: checker.into_table(),
            diagnostics,
            outcome,
        }
    }
}
