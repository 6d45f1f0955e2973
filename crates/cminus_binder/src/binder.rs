//! The binder implementation.
//!
//! First semantic pass. Walks the program and:
//! - creates one scope per function, branch, loop body and nested block
//! - declares variables, parameters and functions
//! - assigns storage offsets and function indices
//! - records every line an identifier is used on
//! - fills the function table

use crate::function_table::FunctionSignature;
use crate::layout::{LayoutConfig, StorageLayout};
use crate::scope::ScopeTable;
use crate::symbol::{Symbol, SymbolRole, ValueKind};
use cminus_ast::visitor::{walk_program, PassResult, SemanticPass};
use cminus_ast::*;
use cminus_diagnostics::{messages, Diagnostic, DiagnosticCollection};

/// The binder creates symbols and scopes.
pub struct Binder {
    table: ScopeTable,
    layout: StorageLayout,
    /// Diagnostics from binding.
    diagnostics: DiagnosticCollection,
    /// Stop at the first error instead of collecting all of them.
    stop_on_first_error: bool,
    /// Set once a fatal error has ended the walk.
    halted: bool,
}

impl Binder {
    pub fn new() -> Self {
        Self::with_options(LayoutConfig::default(), true)
    }

    pub fn with_options(layout: LayoutConfig, stop_on_first_error: bool) -> Self {
        Self {
            table: ScopeTable::new(),
            layout: StorageLayout::new(layout),
            diagnostics: DiagnosticCollection::new(),
            stop_on_first_error,
            halted: false,
        }
    }

    /// Take diagnostics from the binder.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Whether the last walk stopped early on a fatal error.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn stop_on_first_error(&self) -> bool {
        self.stop_on_first_error
    }

    pub fn table(&self) -> &ScopeTable {
        &self.table
    }

    pub fn into_table(self) -> ScopeTable {
        self.table
    }

    /// Get all symbols created by this binder.
    pub fn get_symbols(&self) -> &[Symbol] {
        self.table.symbols()
    }

    pub fn scope_depth(&self) -> u32 {
        self.table.depth()
    }

    // ========================================================================
    // Program binding
    // ========================================================================

    /// Bind a program, creating scopes and symbols for all declarations.
    #[tracing::instrument(level = "debug", skip_all, fields(declarations = program.declarations.len()))]
    pub fn bind_program(&mut self, program: &Program<'_>) {
        if let Err(diagnostic) = walk_program(self, program) {
            tracing::debug!(%diagnostic, "binding halted");
            self.halted = true;
            self.diagnostics.add(diagnostic);
            return;
        }
        tracing::debug!(
            symbols = self.table.symbols().len(),
            scopes = self.table.scopes().len(),
            functions = self.table.functions().len(),
            errors = self.diagnostics.error_count(),
            "binding complete"
        );
    }

    /// Either abort the walk with `diagnostic` or record it and keep going.
    fn report(&mut self, diagnostic: Diagnostic) -> PassResult {
        if self.stop_on_first_error {
            return Err(diagnostic);
        }
        tracing::debug!(%diagnostic, "binding error");
        self.diagnostics.add(diagnostic);
        Ok(())
    }

    fn declare(
        &mut self,
        name: &Identifier<'_>,
        offset: i32,
        value_kind: ValueKind,
        role: SymbolRole,
    ) -> PassResult {
        match self
            .table
            .insert(name.text, name.line(), offset, value_kind, role)
        {
            Ok(id) => {
                tracing::trace!(name = name.text, ?role, offset, symbol = id.0, "declared");
                Ok(())
            }
            Err(diagnostic) => self.report(diagnostic),
        }
    }
}

impl SemanticPass for Binder {
    fn open_scope(&mut self, kind: ScopeKind, line: u32) -> PassResult {
        self.table.enter_scope();
        self.table.create_scope(kind, line);
        Ok(())
    }

    fn close_scope(&mut self) {
        self.table.exit_scope();
        if self.table.current_kind() == ScopeKind::Global {
            self.layout.leave_function();
        }
    }

    fn enter_function(&mut self, node: &FunctionDeclaration<'_>) -> PassResult {
        let name = node.name.text;
        let line = node.data.line;
        self.layout.enter_function();

        if let Some(existing) = self.table.lookup_function_signature(name) {
            let diagnostic = Diagnostic::at_line(
                line,
                &messages::DECLARATION_OF_0_DUPLICATED_FIRST_DECLARED_AT_LINE_1,
                &[name, &existing.line.to_string()],
            )
            .with_related(Diagnostic::at_line(
                existing.line,
                &messages::_0_WAS_FIRST_DECLARED_HERE,
                &[name],
            ));
            return self.report(diagnostic);
        }

        let index = self.layout.allocate_function();
        let value_kind = ValueKind::from_specifier(node.return_type);
        let id = match self
            .table
            .insert_global(name, line, index, value_kind, SymbolRole::Function)
        {
            Ok(id) => id,
            Err(diagnostic) => return self.report(diagnostic),
        };
        let signature = FunctionSignature::from_declaration(node, id, index);
        if self.table.functions_mut().register(signature).is_err() {
            tracing::error!(name, "function registered twice");
        }
        tracing::trace!(name, index, "declared function");
        Ok(())
    }

    fn declare_variable(&mut self, node: &VariableDeclaration<'_>) -> PassResult {
        if let Some(diagnostic) = self
            .table
            .check_redeclaration(node.name.text, node.name.line())
        {
            return self.report(diagnostic);
        }
        let offset = self.layout.allocate_variable(node.array_size);
        let value_kind = match node.array_size {
            Some(size) => ValueKind::Array(Some(size)),
            None => ValueKind::from_specifier(node.type_specifier),
        };
        self.declare(&node.name, offset, value_kind, SymbolRole::Variable)
    }

    fn declare_parameter(&mut self, node: &ParameterDeclaration<'_>) -> PassResult {
        if let Some(diagnostic) = self
            .table
            .check_redeclaration(node.name.text, node.name.line())
        {
            return self.report(diagnostic);
        }
        let offset = self.layout.allocate_parameter();
        let value_kind = if node.is_array {
            ValueKind::Array(None)
        } else {
            ValueKind::from_specifier(node.type_specifier)
        };
        self.declare(&node.name, offset, value_kind, SymbolRole::Parameter)
    }

    fn reference(&mut self, name: &Identifier<'_>) -> PassResult {
        match self.table.record_reference(name.text, name.line()) {
            Ok(_) => Ok(()),
            Err(diagnostic) => self.report(diagnostic),
        }
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}
