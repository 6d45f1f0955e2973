//! The type checker implementation.
//!
//! Second semantic pass. Re-walks the program over the scopes the binder
//! recorded, writes a type into every expression and enforces the rules for
//! void misuse, array indexing, call arity and shape, returns and `main`.

use cminus_ast::visitor::{walk_program, PassResult, SemanticPass};
use cminus_ast::*;
use cminus_binder::{Binder, ScopeTable, SymbolRole, ValueKind};
use cminus_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Name of the program entry point.
pub const MAIN_FUNCTION: &str = "main";

/// The function whose body is being checked.
#[derive(Debug, Clone)]
struct FunctionContext {
    name: String,
    return_type: TypeSpecifier,
}

/// The type checker validates expressions, calls and returns.
pub struct Checker {
    /// Scopes and symbols produced by the binder.
    table: ScopeTable,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
    /// Stop at the first error instead of collecting all of them.
    stop_on_first_error: bool,
    halted: bool,
    current_function: Option<FunctionContext>,
}

impl Checker {
    pub fn new(binder: Binder) -> Self {
        let stop_on_first_error = binder.stop_on_first_error();
        Self::with_options(binder, stop_on_first_error)
    }

    pub fn with_options(binder: Binder, stop_on_first_error: bool) -> Self {
        Self::from_table(binder.into_table(), stop_on_first_error)
    }

    /// Check against an already populated scope table.
    pub fn from_table(mut table: ScopeTable, stop_on_first_error: bool) -> Self {
        table.rewind();
        Self {
            table,
            diagnostics: DiagnosticCollection::new(),
            stop_on_first_error,
            halted: false,
            current_function: None,
        }
    }

    /// Check a program for semantic errors.
    #[tracing::instrument(level = "debug", skip_all, fields(declarations = program.declarations.len()))]
    pub fn check_program(&mut self, program: &Program<'_>) {
        let result = walk_program(self, program).and_then(|()| self.check_main_declared());
        if let Err(diagnostic) = result {
            tracing::debug!(%diagnostic, "checking halted");
            self.halted = true;
            self.diagnostics.add(diagnostic);
            return;
        }
        tracing::debug!(errors = self.diagnostics.error_count(), "checking complete");
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn table(&self) -> &ScopeTable {
        &self.table
    }

    pub fn into_table(self) -> ScopeTable {
        self.table
    }

    fn report(&mut self, diagnostic: Diagnostic) -> PassResult {
        if self.stop_on_first_error {
            return Err(diagnostic);
        }
        tracing::debug!(%diagnostic, "checking error");
        self.diagnostics.add(diagnostic);
        Ok(())
    }

    fn error(&mut self, line: u32, message: &DiagnosticMessage, args: &[&str]) -> PassResult {
        self.report(Diagnostic::at_line(line, message, args))
    }

    fn lookup_kind(&self, name: &str) -> Option<(SymbolRole, ValueKind)> {
        self.table
            .lookup_symbol(name)
            .map(|symbol| (symbol.role, symbol.value_kind))
    }

    /// Whether `expr` passes an array when used as a call argument: only a
    /// bare identifier naming an array does.
    fn is_array_argument(&self, expr: &Expression<'_>) -> bool {
        match expr {
            Expression::Identifier(n) => matches!(
                self.lookup_kind(n.name.text),
                Some((_, kind)) if kind.is_array()
            ),
            _ => false,
        }
    }

    fn check_main_declared(&mut self) -> PassResult {
        if self.table.functions().contains(MAIN_FUNCTION) {
            return Ok(());
        }
        self.report(Diagnostic::new(&messages::PROGRAM_HAS_NO_MAIN, &[]))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn check_array_access(&mut self, node: &ArrayAccessExpression<'_>) -> PassResult {
        let name = node.array.text;
        if let Some((_, kind)) = self.lookup_kind(name) {
            if !kind.is_array() {
                self.error(node.data.line, &messages::_0_IS_NOT_AN_ARRAY, &[name])?;
            }
        }
        if let Some(found) = node.index.ty() {
            if found != ExprType::Integer {
                self.error(
                    node.data.line,
                    &messages::INDEX_OF_0_MUST_BE_AN_INTEGER,
                    &[name, &found.to_string()],
                )?;
            }
        }
        Ok(())
    }

    fn check_call(&mut self, node: &CallExpression<'_>) -> PassResult {
        let name = node.callee.text;
        let line = node.data.line;
        match self.lookup_kind(name) {
            // already reported as undeclared
            None => return Ok(()),
            Some((SymbolRole::Function, _)) => {}
            Some(_) => return self.error(line, &messages::_0_IS_NOT_A_FUNCTION, &[name]),
        }

        let expected: Vec<bool> = match self.table.lookup_function_signature(name) {
            Some(signature) => signature.parameters.iter().map(|p| p.is_array).collect(),
            None => return Ok(()),
        };
        if expected.len() != node.arguments.len() {
            return self.error(
                line,
                &messages::FUNCTION_0_EXPECTS_1_ARGUMENTS_BUT_GOT_2,
                &[
                    name,
                    &expected.len().to_string(),
                    &node.arguments.len().to_string(),
                ],
            );
        }
        for (position, (argument, wants_array)) in node.arguments.iter().zip(expected).enumerate() {
            if argument.ty() == Some(ExprType::Void) {
                self.error(
                    argument.line(),
                    &messages::ARGUMENT_0_OF_1_CANNOT_BE_VOID,
                    &[&(position + 1).to_string(), name],
                )?;
                continue;
            }
            let is_array = self.is_array_argument(argument);
            if is_array != wants_array {
                self.error(
                    argument.line(),
                    &messages::ARGUMENT_0_OF_1_MUST_BE_2_BUT_GOT_3,
                    &[
                        &(position + 1).to_string(),
                        name,
                        shape_name(wants_array),
                        shape_name(is_array),
                    ],
                )?;
            }
        }
        Ok(())
    }

    /// The type a call evaluates to.
    fn call_type(&self, node: &CallExpression<'_>) -> ExprType {
        match self.table.lookup_function_signature(node.callee.text) {
            Some(signature) => signature.return_type.expr_type(),
            None => ExprType::Integer,
        }
    }

    // ========================================================================
    // Statements and functions
    // ========================================================================

    fn check_return(&mut self, node: &ReturnStatement<'_>) -> PassResult {
        let Some(context) = self.current_function.clone() else {
            return Ok(());
        };
        let line = node.data.line;
        match (context.return_type, node.expression) {
            (TypeSpecifier::Void, Some(_)) => self.error(
                line,
                &messages::VOID_FUNCTION_0_CANNOT_RETURN_A_VALUE,
                &[&context.name],
            ),
            (TypeSpecifier::Int, None) => {
                self.error(line, &messages::RETURN_IN_0_MUST_YIELD_A_VALUE, &[&context.name])
            }
            (TypeSpecifier::Int, Some(value)) if value.ty() == Some(ExprType::Void) => {
                self.error(line, &messages::A_VOID_EXPRESSION_CANNOT_BE_RETURNED, &[])
            }
            _ => Ok(()),
        }
    }

    fn check_condition(&mut self, keyword: &str, condition: &Expression<'_>) -> PassResult {
        if condition.ty() == Some(ExprType::Void) {
            return self.error(condition.line(), &messages::CONDITION_OF_0_CANNOT_BE_VOID, &[keyword]);
        }
        Ok(())
    }

    /// A non-void function must end with `return <value>;`. A value-less
    /// final return has already been reported by `check_return`.
    fn check_function_ends_with_return(&mut self, node: &FunctionDeclaration<'_>) -> PassResult {
        if node.return_type.is_void() {
            return Ok(());
        }
        match node.body.statements.last() {
            Some(Statement::Return(_)) => Ok(()),
            _ => self.error(
                node.data.line,
                &messages::FUNCTION_0_MUST_END_WITH_A_RETURN_VALUE,
                &[node.name.text],
            ),
        }
    }

    /// `main` must return void, take no parameters and be declared last.
    fn check_main(&mut self, node: &FunctionDeclaration<'_>) -> PassResult {
        let line = node.data.line;
        if !node.return_type.is_void() {
            self.error(line, &messages::MAIN_MUST_RETURN_VOID, &[])?;
        }
        if !node.parameters.is_empty() {
            self.error(line, &messages::MAIN_MUST_NOT_HAVE_PARAMETERS, &[])?;
        }
        let functions = self.table.functions();
        let follower = functions
            .position(MAIN_FUNCTION)
            .and_then(|index| functions.get_index(index + 1))
            .map(|signature| signature.name.clone());
        if let Some(follower) = follower {
            self.error(
                line,
                &messages::MAIN_MUST_BE_LAST_0_IS_DECLARED_AFTER_IT,
                &[&follower],
            )?;
        }
        Ok(())
    }
}

fn shape_name(is_array: bool) -> &'static str {
    if is_array {
        "an array"
    } else {
        "a scalar"
    }
}

impl SemanticPass for Checker {
    fn open_scope(&mut self, kind: ScopeKind, line: u32) -> PassResult {
        self.table.enter_scope();
        if self.table.reenter_next_scope().is_some() {
            return Ok(());
        }
        tracing::error!(%kind, line, "no recorded scope left to replay");
        // replay cannot continue past this point, even when collecting
        Err(Diagnostic::at_line(
            line,
            &messages::NO_RECORDED_SCOPE_FOR_0_AT_LINE_1,
            &[&kind.to_string(), &line.to_string()],
        ))
    }

    fn close_scope(&mut self) {
        self.table.exit_scope();
    }

    fn enter_function(&mut self, node: &FunctionDeclaration<'_>) -> PassResult {
        self.current_function = Some(FunctionContext {
            name: node.name.text.to_string(),
            return_type: node.return_type,
        });
        Ok(())
    }

    fn reference(&mut self, name: &Identifier<'_>) -> PassResult {
        if self.table.lookup_symbol(name.text).is_none() {
            return self.error(name.line(), &messages::_0_IS_NOT_DECLARED, &[name.text]);
        }
        Ok(())
    }

    fn check_function(&mut self, node: &FunctionDeclaration<'_>) -> PassResult {
        if node.name.text == MAIN_FUNCTION {
            self.check_main(node)?;
        }
        self.check_function_ends_with_return(node)?;
        self.current_function = None;
        Ok(())
    }

    fn check_variable(&mut self, node: &VariableDeclaration<'_>) -> PassResult {
        if node.type_specifier.is_void() {
            return self.error(
                node.data.line,
                &messages::VARIABLE_0_CANNOT_HAVE_TYPE_VOID,
                &[node.name.text],
            );
        }
        Ok(())
    }

    fn check_parameter(&mut self, node: &ParameterDeclaration<'_>) -> PassResult {
        if node.type_specifier.is_void() {
            return self.error(
                node.data.line,
                &messages::PARAMETER_0_CANNOT_HAVE_TYPE_VOID,
                &[node.name.text],
            );
        }
        Ok(())
    }

    fn check_statement(&mut self, node: &Statement<'_>) -> PassResult {
        match node {
            Statement::Return(n) => self.check_return(n),
            Statement::Selection(n) => self.check_condition("if", n.condition),
            Statement::Iteration(n) => self.check_condition("while", n.condition),
            _ => Ok(()),
        }
    }

    fn check_expression(&mut self, node: &Expression<'_>) -> PassResult {
        let ty = match node {
            Expression::Identifier(n) => self
                .lookup_kind(n.name.text)
                .map_or(ExprType::Integer, |(_, kind)| kind.expr_type()),
            Expression::Constant(_) => ExprType::Integer,
            Expression::ArrayAccess(n) => {
                self.check_array_access(n)?;
                ExprType::Integer
            }
            Expression::Assignment(n) => {
                if n.value.ty() == Some(ExprType::Void) {
                    self.error(n.data.line, &messages::A_VOID_EXPRESSION_CANNOT_BE_ASSIGNED, &[])?;
                }
                ExprType::Integer
            }
            Expression::Binary(n) => {
                let void_operand = [n.left, n.right]
                    .iter()
                    .any(|operand| operand.ty() == Some(ExprType::Void));
                if void_operand {
                    self.error(
                        n.data.line,
                        &messages::OPERAND_OF_0_CANNOT_BE_VOID,
                        &[n.operator.as_str()],
                    )?;
                }
                n.operator.result_type()
            }
            Expression::Call(n) => {
                self.check_call(n)?;
                self.call_type(n)
            }
        };
        node.set_ty(ty);
        Ok(())
    }
}
