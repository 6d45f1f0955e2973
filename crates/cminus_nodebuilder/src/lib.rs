//! cminus_nodebuilder: Synthetic AST node construction.
//!
//! Allocates C-Minus syntax trees in a bump arena. The parser front end,
//! the tests and the benchmarks all build trees through this one API, so
//! node ids are assigned consistently.

use bumpalo::Bump;
use cminus_ast::*;
use std::cell::Cell;

/// Builds arena-allocated nodes with sequential node ids.
///
/// # Example
/// ```
/// use bumpalo::Bump;
/// use cminus_ast::{Declaration, TypeSpecifier};
/// use cminus_nodebuilder::NodeBuilder;
///
/// let arena = Bump::new();
/// let b = NodeBuilder::new(&arena);
/// // int x; void main(void) { x = 1; }
/// let program = b.program(vec![
///     b.global(b.var_decl(TypeSpecifier::Int, "x", 1)),
///     b.function(
///         TypeSpecifier::Void,
///         "main",
///         1,
///         vec![],
///         b.block(1, vec![], vec![b.expr_stmt(b.assign(b.id("x", 1), b.num(1, 1), 1))]),
///     ),
/// ]);
/// assert_eq!(program.declarations.len(), 2);
/// assert!(matches!(program.declarations[1], Declaration::Function(_)));
/// ```
pub struct NodeBuilder<'a> {
    arena: &'a Bump,
    next_id: Cell<u32>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
        }
    }

    /// Number of nodes built so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    fn data(&self, line: u32) -> NodeData {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeData::new(NodeId(id), line)
    }

    fn list<T>(&self, items: Vec<T>) -> NodeList<'a, T> {
        self.arena.alloc_slice_fill_iter(items)
    }

    pub fn identifier(&self, text: &str, line: u32) -> Identifier<'a> {
        Identifier {
            data: self.data(line),
            text: self.arena.alloc_str(text),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn program(&self, declarations: Vec<Declaration<'a>>) -> &'a Program<'a> {
        self.arena.alloc(Program {
            declarations: self.list(declarations),
        })
    }

    pub fn var_decl(&self, type_specifier: TypeSpecifier, name: &str, line: u32) -> VariableDeclaration<'a> {
        VariableDeclaration {
            data: self.data(line),
            type_specifier,
            name: self.identifier(name, line),
            array_size: None,
        }
    }

    /// `int name[size];`
    pub fn array_decl(&self, name: &str, size: u32, line: u32) -> VariableDeclaration<'a> {
        VariableDeclaration {
            data: self.data(line),
            type_specifier: TypeSpecifier::Int,
            name: self.identifier(name, line),
            array_size: Some(size),
        }
    }

    pub fn global(&self, declaration: VariableDeclaration<'a>) -> Declaration<'a> {
        Declaration::Variable(declaration)
    }

    pub fn param(&self, type_specifier: TypeSpecifier, name: &str, line: u32) -> ParameterDeclaration<'a> {
        ParameterDeclaration {
            data: self.data(line),
            type_specifier,
            name: self.identifier(name, line),
            is_array: false,
        }
    }

    /// `int name[]`
    pub fn array_param(&self, name: &str, line: u32) -> ParameterDeclaration<'a> {
        ParameterDeclaration {
            data: self.data(line),
            type_specifier: TypeSpecifier::Int,
            name: self.identifier(name, line),
            is_array: true,
        }
    }

    pub fn function(
        &self,
        return_type: TypeSpecifier,
        name: &str,
        line: u32,
        parameters: Vec<ParameterDeclaration<'a>>,
        body: CompoundStatement<'a>,
    ) -> Declaration<'a> {
        Declaration::Function(FunctionDeclaration {
            data: self.data(line),
            return_type,
            name: self.identifier(name, line),
            parameters: self.list(parameters),
            body,
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn block(
        &self,
        line: u32,
        local_declarations: Vec<VariableDeclaration<'a>>,
        statements: Vec<Statement<'a>>,
    ) -> CompoundStatement<'a> {
        CompoundStatement {
            data: self.data(line),
            local_declarations: self.list(local_declarations),
            statements: self.list(statements),
        }
    }

    /// A compound statement used as a statement.
    pub fn compound(
        &self,
        line: u32,
        local_declarations: Vec<VariableDeclaration<'a>>,
        statements: Vec<Statement<'a>>,
    ) -> Statement<'a> {
        Statement::Compound(self.block(line, local_declarations, statements))
    }

    pub fn expr_stmt(&self, expression: Expression<'a>) -> Statement<'a> {
        let line = expression.line();
        Statement::Expression(ExpressionStatement {
            data: self.data(line),
            expression: Some(self.arena.alloc(expression)),
        })
    }

    /// The empty statement `;`.
    pub fn empty_stmt(&self, line: u32) -> Statement<'a> {
        Statement::Expression(ExpressionStatement {
            data: self.data(line),
            expression: None,
        })
    }

    pub fn if_stmt(
        &self,
        line: u32,
        condition: Expression<'a>,
        then_branch: Statement<'a>,
        else_branch: Option<Statement<'a>>,
    ) -> Statement<'a> {
        Statement::Selection(SelectionStatement {
            data: self.data(line),
            condition: self.arena.alloc(condition),
            then_branch: self.arena.alloc(then_branch),
            else_branch: else_branch.map(|s| &*self.arena.alloc(s)),
        })
    }

    pub fn while_stmt(&self, line: u32, condition: Expression<'a>, body: Statement<'a>) -> Statement<'a> {
        Statement::Iteration(IterationStatement {
            data: self.data(line),
            condition: self.arena.alloc(condition),
            body: self.arena.alloc(body),
        })
    }

    pub fn return_stmt(&self, line: u32, expression: Option<Expression<'a>>) -> Statement<'a> {
        Statement::Return(ReturnStatement {
            data: self.data(line),
            expression: expression.map(|e| &*self.arena.alloc(e)),
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn id(&self, name: &str, line: u32) -> Expression<'a> {
        Expression::Identifier(IdentifierExpression {
            data: self.data(line),
            name: self.identifier(name, line),
            ty: TypeSlot::new(),
        })
    }

    pub fn num(&self, value: i32, line: u32) -> Expression<'a> {
        Expression::Constant(ConstantExpression {
            data: self.data(line),
            value,
            ty: TypeSlot::new(),
        })
    }

    /// `array[index]`
    pub fn index(&self, array: &str, index: Expression<'a>, line: u32) -> Expression<'a> {
        Expression::ArrayAccess(ArrayAccessExpression {
            data: self.data(line),
            array: self.identifier(array, line),
            index: self.arena.alloc(index),
            ty: TypeSlot::new(),
        })
    }

    pub fn assign(&self, target: Expression<'a>, value: Expression<'a>, line: u32) -> Expression<'a> {
        Expression::Assignment(AssignmentExpression {
            data: self.data(line),
            target: self.arena.alloc(target),
            value: self.arena.alloc(value),
            ty: TypeSlot::new(),
        })
    }

    pub fn binary(
        &self,
        operator: BinaryOperator,
        left: Expression<'a>,
        right: Expression<'a>,
        line: u32,
    ) -> Expression<'a> {
        Expression::Binary(BinaryExpression {
            data: self.data(line),
            operator,
            left: self.arena.alloc(left),
            right: self.arena.alloc(right),
            ty: TypeSlot::new(),
        })
    }

    pub fn call(&self, callee: &str, arguments: Vec<Expression<'a>>, line: u32) -> Expression<'a> {
        Expression::Call(CallExpression {
            data: self.data(line),
            callee: self.identifier(callee, line),
            arguments: self.list(arguments),
            ty: TypeSlot::new(),
        })
    }
}
