use std::{fmt::Display, rc::Rc};

use crate::Span;

use super::{
    expressions::{AccessExpr, BinaryExpr, FunctionExpr, GroupExpr, LiteralExpr},
    statements::{
        AssignmentStmt, DeclarationStmt, ExpressionStmt, ForStmt, IfStmt, ReturnStmt, WhileStmt,
    },
};

/// Identity of an AST node, handed out by the parser.
///
/// Passes never mutate the tree; anything they learn about a node is kept in
/// side tables keyed by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Root of a program: global fields followed by methods.
#[derive(Debug, Clone)]
pub struct Source {
    pub fields: Vec<Field>,
    pub methods: Vec<Rc<Method>>,
    pub span: Span,
}

/// A global variable: `LET CONST? name: Type (= value)?;`
#[derive(Debug, Clone)]
pub struct Field {
    pub id: NodeId,
    pub name: String,
    pub type_name: String,
    pub constant: bool,
    pub value: Option<Expr>,
    pub span: Span,
}

/// A method definition: `DEF name(params): Type DO ... END`
///
/// Methods are shared by reference so runtime closures can hold on to their body.
#[derive(Debug, Clone)]
pub struct Method {
    pub id: NodeId,
    pub name: String,
    pub parameters: Vec<String>,
    pub parameter_type_names: Vec<String>,
    pub return_type_name: Option<String>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// Statement Kinds
#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Declaration(DeclarationStmt),
    Assignment(AssignmentStmt),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Return(ReturnStmt),
}

impl Stmt {
    /// Returns the span of the statement.
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::Declaration(stmt) => &stmt.span,
            Stmt::Assignment(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::For(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
        }
    }
}

/// Expression Kinds
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(LiteralExpr),
    Group(GroupExpr),
    Binary(BinaryExpr),
    Access(AccessExpr),
    Function(FunctionExpr),
}

impl Expr {
    /// Returns the node id of the expression.
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal(expr) => expr.id,
            Expr::Group(expr) => expr.id,
            Expr::Binary(expr) => expr.id,
            Expr::Access(expr) => expr.id,
            Expr::Function(expr) => expr.id,
        }
    }

    /// Returns the span of the expression.
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Literal(expr) => &expr.span,
            Expr::Group(expr) => &expr.span,
            Expr::Binary(expr) => &expr.span,
            Expr::Access(expr) => &expr.span,
            Expr::Function(expr) => &expr.span,
        }
    }
}
