//! Literal values as written in source.
//!
//! Integers are kept wider than the language's 32-bit range so the analyzer,
//! not the parser, is the one to reject out-of-range literals.

use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    Character(char),
    String(String),
}
