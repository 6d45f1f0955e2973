//! AST node definitions for C-Minus.
//!
//! Every node kind has its own struct with named children. Nodes reference
//! child nodes via arena-allocated references; lists are arena slices kept in
//! source order.

use crate::types::*;
use std::cell::Cell;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    /// Unique node ID.
    pub id: NodeId,
    /// Source line the node starts on.
    pub line: u32,
}

impl NodeData {
    pub fn new(id: NodeId, line: u32) -> Self {
        Self { id, line }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

/// Slot holding an expression's resolved type. Empty until the checker runs.
#[derive(Debug, Default)]
pub struct TypeSlot(Cell<Option<ExprType>>);

impl TypeSlot {
    pub fn new() -> Self {
        Self(Cell::new(None))
    }

    pub fn get(&self) -> Option<ExprType> {
        self.0.get()
    }

    pub fn set(&self, ty: ExprType) {
        self.0.set(Some(ty));
    }
}

// ============================================================================
// Program & Declarations
// ============================================================================

#[derive(Debug)]
pub struct Program<'a> {
    pub declarations: NodeList<'a, Declaration<'a>>,
}

#[derive(Debug)]
pub enum Declaration<'a> {
    Variable(VariableDeclaration<'a>),
    Function(FunctionDeclaration<'a>),
}

impl<'a> Declaration<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Declaration::Variable(n) => n.name.text,
            Declaration::Function(n) => n.name.text,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Declaration::Variable(n) => n.data.line,
            Declaration::Function(n) => n.data.line,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    pub data: NodeData,
    pub text: &'a str,
}

impl Identifier<'_> {
    pub fn line(&self) -> u32 {
        self.data.line
    }
}

/// `int x;`, `int a[10];` (or the ill-typed `void x;`).
#[derive(Debug)]
pub struct VariableDeclaration<'a> {
    pub data: NodeData,
    pub type_specifier: TypeSpecifier,
    pub name: Identifier<'a>,
    /// Element count for array declarations.
    pub array_size: Option<u32>,
}

/// `int x` or `int x[]` in a parameter list.
#[derive(Debug)]
pub struct ParameterDeclaration<'a> {
    pub data: NodeData,
    pub type_specifier: TypeSpecifier,
    pub name: Identifier<'a>,
    pub is_array: bool,
}

#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub data: NodeData,
    pub return_type: TypeSpecifier,
    pub name: Identifier<'a>,
    /// Empty for `(void)`.
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub body: CompoundStatement<'a>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    Compound(CompoundStatement<'a>),
    Expression(ExpressionStatement<'a>),
    Selection(SelectionStatement<'a>),
    Iteration(IterationStatement<'a>),
    Return(ReturnStatement<'a>),
}

impl Statement<'_> {
    pub fn line(&self) -> u32 {
        match self {
            Statement::Compound(n) => n.data.line,
            Statement::Expression(n) => n.data.line,
            Statement::Selection(n) => n.data.line,
            Statement::Iteration(n) => n.data.line,
            Statement::Return(n) => n.data.line,
        }
    }
}

/// `{ local-declarations statement-list }`
#[derive(Debug)]
pub struct CompoundStatement<'a> {
    pub data: NodeData,
    pub local_declarations: NodeList<'a, VariableDeclaration<'a>>,
    pub statements: NodeList<'a, Statement<'a>>,
}

/// `expression ;` or the empty statement `;`.
#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct SelectionStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub then_branch: &'a Statement<'a>,
    pub else_branch: OptionalNode<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct IterationStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    Identifier(IdentifierExpression<'a>),
    Constant(ConstantExpression),
    ArrayAccess(ArrayAccessExpression<'a>),
    Assignment(AssignmentExpression<'a>),
    Binary(BinaryExpression<'a>),
    Call(CallExpression<'a>),
}

impl Expression<'_> {
    fn type_slot(&self) -> &TypeSlot {
        match self {
            Expression::Identifier(n) => &n.ty,
            Expression::Constant(n) => &n.ty,
            Expression::ArrayAccess(n) => &n.ty,
            Expression::Assignment(n) => &n.ty,
            Expression::Binary(n) => &n.ty,
            Expression::Call(n) => &n.ty,
        }
    }

    /// The resolved type, if the checker has visited this expression.
    pub fn ty(&self) -> Option<ExprType> {
        self.type_slot().get()
    }

    pub fn set_ty(&self, ty: ExprType) {
        self.type_slot().set(ty);
    }

    pub fn line(&self) -> u32 {
        self.data().line
    }

    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Identifier(n) => &n.data,
            Expression::Constant(n) => &n.data,
            Expression::ArrayAccess(n) => &n.data,
            Expression::Assignment(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Call(n) => &n.data,
        }
    }
}

#[derive(Debug)]
pub struct IdentifierExpression<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub ty: TypeSlot,
}

#[derive(Debug)]
pub struct ConstantExpression {
    pub data: NodeData,
    pub value: i32,
    pub ty: TypeSlot,
}

/// `a[index]`
#[derive(Debug)]
pub struct ArrayAccessExpression<'a> {
    pub data: NodeData,
    pub array: Identifier<'a>,
    pub index: &'a Expression<'a>,
    pub ty: TypeSlot,
}

/// `target = value`, where `target` is an identifier or an array access.
#[derive(Debug)]
pub struct AssignmentExpression<'a> {
    pub data: NodeData,
    pub target: &'a Expression<'a>,
    pub value: &'a Expression<'a>,
    pub ty: TypeSlot,
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub operator: BinaryOperator,
    pub left: &'a Expression<'a>,
    pub right: &'a Expression<'a>,
    pub ty: TypeSlot,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub callee: Identifier<'a>,
    pub arguments: NodeList<'a, Expression<'a>>,
    pub ty: TypeSlot,
}
