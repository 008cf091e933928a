use crate::Span;

use super::ast::{Expr, NodeId, Stmt};

#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

/// A local variable: `LET name (: Type)? (= value)?;`
#[derive(Debug, Clone)]
pub struct DeclarationStmt {
    pub id: NodeId,
    pub name: String,
    pub type_name: Option<String>,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignmentStmt {
    pub receiver: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_statements: Vec<Stmt>,
    pub else_statements: Vec<Stmt>,
    pub span: Span,
}

/// `FOR (init; condition; increment) DO ... END`, every header part optional.
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub initialization: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub increment: Option<Box<Stmt>>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Expr,
    pub span: Span,
}
