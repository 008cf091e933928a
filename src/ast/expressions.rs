use std::fmt::Display;

use crate::{lexer::tokens::TokenKind, Span};

use super::{
    ast::{Expr, NodeId},
    types::Literal,
};

#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub id: NodeId,
    pub literal: Literal,
    pub span: Span,
}

/// A parenthesised expression.
#[derive(Debug, Clone)]
pub struct GroupExpr {
    pub id: NodeId,
    pub expression: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,
    Or,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::And => BinaryOperator::And,
            TokenKind::Or => BinaryOperator::Or,
            TokenKind::Equals => BinaryOperator::Equals,
            TokenKind::NotEquals => BinaryOperator::NotEquals,
            TokenKind::Less => BinaryOperator::Less,
            TokenKind::LessEquals => BinaryOperator::LessEquals,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::GreaterEquals => BinaryOperator::GreaterEquals,
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Dash => BinaryOperator::Subtract,
            TokenKind::Star => BinaryOperator::Multiply,
            TokenKind::Slash => BinaryOperator::Divide,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub id: NodeId,
    pub operator: BinaryOperator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Variable or field read: `name` or `receiver.name`.
#[derive(Debug, Clone)]
pub struct AccessExpr {
    pub id: NodeId,
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    pub span: Span,
}

/// Function or method call: `name(args)` or `receiver.name(args)`.
#[derive(Debug, Clone)]
pub struct FunctionExpr {
    pub id: NodeId,
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    pub arguments: Vec<Expr>,
    pub span: Span,
}
