//! The traversal skeleton shared by every semantic pass.
//!
//! The `walk_*` functions visit children in a fixed, kind-specific order and
//! decide where scopes open and close. A pass only supplies hooks through
//! [`SemanticPass`]; every hook defaults to a no-op, so the binder overrides
//! the declaration hooks and the checker overrides the check hooks.
//!
//! Scope rules encoded here:
//! - a function opens one scope holding its parameters and the locals of its
//!   body block;
//! - each branch of a selection and the body of an iteration open a scope,
//!   and a compound statement used as that body shares it;
//! - a compound statement nested in a statement list opens its own scope.

use crate::node::*;
use crate::types::ScopeKind;
use cminus_diagnostics::Diagnostic;

/// Result of a hook. An `Err` aborts the walk.
pub type PassResult = Result<(), Diagnostic>;

pub trait SemanticPass {
    /// Open a scope of the given kind before its contents are walked.
    fn open_scope(&mut self, _kind: ScopeKind, _line: u32) -> PassResult {
        Ok(())
    }

    /// Close the innermost open scope.
    fn close_scope(&mut self) {}

    /// Pre-order hook for a function, called before its scope opens.
    fn enter_function(&mut self, _node: &FunctionDeclaration<'_>) -> PassResult {
        Ok(())
    }

    fn declare_variable(&mut self, _node: &VariableDeclaration<'_>) -> PassResult {
        Ok(())
    }

    fn declare_parameter(&mut self, _node: &ParameterDeclaration<'_>) -> PassResult {
        Ok(())
    }

    /// Called for every identifier use: plain identifiers, array bases and callees.
    fn reference(&mut self, _name: &Identifier<'_>) -> PassResult {
        Ok(())
    }

    /// Post-order hook for a function, called after its scope closes.
    fn check_function(&mut self, _node: &FunctionDeclaration<'_>) -> PassResult {
        Ok(())
    }

    fn check_variable(&mut self, _node: &VariableDeclaration<'_>) -> PassResult {
        Ok(())
    }

    fn check_parameter(&mut self, _node: &ParameterDeclaration<'_>) -> PassResult {
        Ok(())
    }

    fn check_statement(&mut self, _node: &Statement<'_>) -> PassResult {
        Ok(())
    }

    fn check_expression(&mut self, _node: &Expression<'_>) -> PassResult {
        Ok(())
    }
}

pub fn walk_program<P: SemanticPass + ?Sized>(pass: &mut P, program: &Program<'_>) -> PassResult {
    for declaration in program.declarations.iter() {
        walk_declaration(pass, declaration)?;
    }
    Ok(())
}

pub fn walk_declaration<P: SemanticPass + ?Sized>(
    pass: &mut P,
    declaration: &Declaration<'_>,
) -> PassResult {
    match declaration {
        Declaration::Variable(n) => walk_variable(pass, n),
        Declaration::Function(n) => walk_function(pass, n),
    }
}

pub fn walk_function<P: SemanticPass + ?Sized>(
    pass: &mut P,
    node: &FunctionDeclaration<'_>,
) -> PassResult {
    pass.enter_function(node)?;
    pass.open_scope(ScopeKind::Function, node.data.line)?;
    for param in node.parameters.iter() {
        pass.declare_parameter(param)?;
        pass.check_parameter(param)?;
    }
    walk_block_contents(pass, &node.body)?;
    pass.close_scope();
    pass.check_function(node)
}

fn walk_variable<P: SemanticPass + ?Sized>(pass: &mut P, node: &VariableDeclaration<'_>) -> PassResult {
    pass.declare_variable(node)?;
    pass.check_variable(node)
}

/// Walk a block's declarations and statements in whatever scope is current.
fn walk_block_contents<P: SemanticPass + ?Sized>(
    pass: &mut P,
    block: &CompoundStatement<'_>,
) -> PassResult {
    for local in block.local_declarations.iter() {
        walk_variable(pass, local)?;
    }
    for stmt in block.statements.iter() {
        walk_statement(pass, stmt)?;
    }
    Ok(())
}

pub fn walk_statement<P: SemanticPass + ?Sized>(pass: &mut P, stmt: &Statement<'_>) -> PassResult {
    match stmt {
        Statement::Compound(n) => {
            pass.open_scope(ScopeKind::Block, n.data.line)?;
            walk_block_contents(pass, n)?;
            pass.close_scope();
        }
        Statement::Expression(n) => {
            if let Some(expr) = n.expression {
                walk_expression(pass, expr)?;
            }
        }
        Statement::Selection(n) => {
            walk_expression(pass, n.condition)?;
            walk_scoped_body(pass, ScopeKind::Branch, n.then_branch)?;
            if let Some(else_branch) = n.else_branch {
                walk_scoped_body(pass, ScopeKind::Branch, else_branch)?;
            }
        }
        Statement::Iteration(n) => {
            walk_expression(pass, n.condition)?;
            walk_scoped_body(pass, ScopeKind::Loop, n.body)?;
        }
        Statement::Return(n) => {
            if let Some(expr) = n.expression {
                walk_expression(pass, expr)?;
            }
        }
    }
    pass.check_statement(stmt)
}

/// Walk the body of a branch or loop inside a fresh scope. A compound body
/// shares that scope instead of opening a second one.
fn walk_scoped_body<P: SemanticPass + ?Sized>(
    pass: &mut P,
    kind: ScopeKind,
    body: &Statement<'_>,
) -> PassResult {
    pass.open_scope(kind, body.line())?;
    match body {
        Statement::Compound(block) => {
            walk_block_contents(pass, block)?;
            pass.check_statement(body)?;
        }
        _ => walk_statement(pass, body)?,
    }
    pass.close_scope();
    Ok(())
}

pub fn walk_expression<P: SemanticPass + ?Sized>(pass: &mut P, expr: &Expression<'_>) -> PassResult {
    match expr {
        Expression::Identifier(n) => pass.reference(&n.name)?,
        Expression::Constant(_) => {}
        Expression::ArrayAccess(n) => {
            pass.reference(&n.array)?;
            walk_expression(pass, n.index)?;
        }
        Expression::Assignment(n) => {
            walk_expression(pass, n.target)?;
            walk_expression(pass, n.value)?;
        }
        Expression::Binary(n) => {
            walk_expression(pass, n.left)?;
            walk_expression(pass, n.right)?;
        }
        Expression::Call(n) => {
            pass.reference(&n.callee)?;
            for arg in n.arguments.iter() {
                walk_expression(pass, arg)?;
            }
        }
    }
    pass.check_expression(expr)
}
