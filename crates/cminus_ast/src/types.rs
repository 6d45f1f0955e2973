//! Ids, operator kinds and the small type vocabulary of the language.

use std::fmt;

/// The type written on a declaration: `int` or `void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSpecifier {
    Int,
    Void,
}

impl TypeSpecifier {
    pub fn is_void(self) -> bool {
        self == TypeSpecifier::Void
    }

    /// The expression type a value of this specifier evaluates to.
    pub fn expr_type(self) -> ExprType {
        match self {
            TypeSpecifier::Int => ExprType::Integer,
            TypeSpecifier::Void => ExprType::Void,
        }
    }
}

impl fmt::Display for TypeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpecifier::Int => write!(f, "int"),
            TypeSpecifier::Void => write!(f, "void"),
        }
    }
}

/// The resolved type of an expression, written by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprType {
    Void,
    Integer,
    Boolean,
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprType::Void => write!(f, "void"),
            ExprType::Integer => write!(f, "integer"),
            ExprType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Relational and arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    Plus,
    Minus,
    Times,
    Over,
}

impl BinaryOperator {
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessEqual
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEqual
                | BinaryOperator::Equal
                | BinaryOperator::NotEqual
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Over => "/",
        }
    }

    /// The type of a well-formed application of this operator.
    pub fn result_type(self) -> ExprType {
        if self.is_relational() {
            ExprType::Boolean
        } else {
            ExprType::Integer
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The construct that opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Function,
    /// A compound statement nested inside a statement list.
    Block,
    /// The then- or else-branch of a selection statement.
    Branch,
    /// The body of an iteration statement.
    Loop,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Global => write!(f, "global"),
            ScopeKind::Function => write!(f, "function"),
            ScopeKind::Block => write!(f, "block"),
            ScopeKind::Branch => write!(f, "branch"),
            ScopeKind::Loop => write!(f, "loop"),
        }
    }
}

/// Unique node id, assigned when the tree is built.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a symbol stored in the binder's symbol arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
