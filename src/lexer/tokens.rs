use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("LET", TokenKind::Let);
        map.insert("CONST", TokenKind::Const);
        map.insert("DEF", TokenKind::Def);
        map.insert("DO", TokenKind::Do);
        map.insert("END", TokenKind::End);
        map.insert("IF", TokenKind::If);
        map.insert("ELSE", TokenKind::Else);
        map.insert("FOR", TokenKind::For);
        map.insert("WHILE", TokenKind::While);
        map.insert("RETURN", TokenKind::Return);
        map.insert("TRUE", TokenKind::True);
        map.insert("FALSE", TokenKind::False);
        map.insert("NIL", TokenKind::Nil);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    Decimal,
    Character,
    String,
    Identifier,

    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    Dot,
    Semicolon,
    Colon,
    Comma,

    Plus,
    Dash,
    Slash,
    Star,

    // Reserved
    Let,
    Const,
    Def,
    Do,
    End,
    If,
    Else,
    For,
    While,
    Return,
    True,
    False,
    Nil,
}

impl TokenKind {
    /// Whether a token of this kind can be the last token of an operand.
    ///
    /// A sign directly after such a token is a binary operator, never part
    /// of a numeric literal.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::Decimal
                | TokenKind::Character
                | TokenKind::String
                | TokenKind::Identifier
                | TokenKind::CloseParen
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Nil
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Integer
            | TokenKind::Decimal
            | TokenKind::Character
            | TokenKind::String
            | TokenKind::Identifier => write!(f, "{} ({:?})", self.kind, self.value),
            _ => write!(f, "{}", self.kind),
        }
    }
}
