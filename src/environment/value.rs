use std::fmt::Display;

use rust_decimal::Decimal;

use super::types::Type;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i32),
    Decimal(Decimal),
    Character(char),
    String(String),
}

impl Value {
    pub fn get_type(&self) -> Type {
        match self {
            Value::Nil => Type::Nil,
            Value::Boolean(_) => Type::Boolean,
            Value::Integer(_) => Type::Integer,
            Value::Decimal(_) => Type::Decimal,
            Value::Character(_) => Type::Character,
            Value::String(_) => Type::String,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "NIL"),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Decimal(value) => write!(f, "{}", value),
            Value::Character(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
        }
    }
}
