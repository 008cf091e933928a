use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::DuplicateDefinition { .. } => "DuplicateDefinition",
            ErrorImpl::UnknownSymbol { .. } => "UnknownSymbol",
            ErrorImpl::UnknownMember { .. } => "UnknownMember",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::InvalidOperation { .. } => "InvalidOperation",
            ErrorImpl::ConstantViolation { .. } => "ConstantViolation",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::AmbiguousDeclaration { .. } => "AmbiguousDeclaration",
            ErrorImpl::UninitializedConstant { .. } => "UninitializedConstant",
            ErrorImpl::EmptyBranch => "EmptyBranch",
            ErrorImpl::IntegerOverflow { .. } => "IntegerOverflow",
            ErrorImpl::MissingEntryPoint => "MissingEntryPoint",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::RuntimeTypeMismatch { .. } => "RuntimeTypeMismatch",
            ErrorImpl::UnboundReturn => "UnboundReturn",
            ErrorImpl::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            ErrorImpl::OutputError { .. } => "OutputError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::DuplicateDefinition { name } => {
                ErrorTip::Suggestion(format!("`{}` is already defined in this scope", name))
            }
            ErrorImpl::UnknownSymbol { name } => {
                ErrorTip::Suggestion(format!("`{}` is not defined", name))
            }
            ErrorImpl::UnknownMember { type_, member } => ErrorTip::Suggestion(format!(
                "Type `{}` has no member `{}`",
                type_, member
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::InvalidOperation {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` cannot be applied to `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::ConstantViolation { name } => {
                ErrorTip::Suggestion(format!("`{}` is constant and cannot be assigned", name))
            }
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "Only variables and fields can be assigned to",
            )),
            ErrorImpl::AmbiguousDeclaration { name } => ErrorTip::Suggestion(format!(
                "Declaration of `{}` needs a type or an initial value",
                name
            )),
            ErrorImpl::UninitializedConstant { name } => {
                ErrorTip::Suggestion(format!("Constant `{}` must be given a value", name))
            }
            ErrorImpl::EmptyBranch => ErrorTip::Suggestion(String::from(
                "An IF statement needs at least one statement after DO",
            )),
            ErrorImpl::IntegerOverflow { value } => ErrorTip::Suggestion(format!(
                "`{}` does not fit in a 32-bit signed integer",
                value
            )),
            ErrorImpl::MissingEntryPoint => ErrorTip::Suggestion(String::from(
                "Define `DEF main(): Integer DO ... END`",
            )),
            ErrorImpl::DivisionByZero => ErrorTip::None,
            ErrorImpl::RuntimeTypeMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected a `{}` value at runtime, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::UnboundReturn => ErrorTip::Suggestion(String::from(
                "RETURN can only be used inside a method",
            )),
            ErrorImpl::IndexOutOfBounds { index, length } => ErrorTip::Suggestion(format!(
                "Index {} is outside a string of length {}",
                index, length
            )),
            ErrorImpl::OutputError { message } => ErrorTip::Suggestion(message.clone()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}: {}", self.get_error_name(), self.position, self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("{name:?} is already defined in this scope")]
    DuplicateDefinition { name: String },
    #[error("unknown symbol {name:?}")]
    UnknownSymbol { name: String },
    #[error("type {type_} has no member {member:?}")]
    UnknownMember { type_: String, member: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMismatch { expected: String, received: String },
    #[error("invalid operation {operator} between {left} and {right}")]
    InvalidOperation {
        operator: String,
        left: String,
        right: String,
    },
    #[error("cannot assign to constant {name:?}")]
    ConstantViolation { name: String },
    #[error("assignment target must be a variable or field")]
    InvalidAssignmentTarget,
    #[error("declaration of {name:?} has neither a type nor a value")]
    AmbiguousDeclaration { name: String },
    #[error("constant {name:?} has no initial value")]
    UninitializedConstant { name: String },
    #[error("if statement has an empty then branch")]
    EmptyBranch,
    #[error("integer {value} overflows a 32-bit signed integer")]
    IntegerOverflow { value: String },
    #[error("program must define main(): Integer")]
    MissingEntryPoint,
    #[error("division by zero")]
    DivisionByZero,
    #[error("runtime type mismatch: expected {expected}, received {received}")]
    RuntimeTypeMismatch { expected: String, received: String },
    #[error("return outside of a method")]
    UnboundReturn,
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    #[error("failed to write output: {message}")]
    OutputError { message: String },
}

impl ErrorImpl {
    /// Attaches a source position, turning the failure into a reportable [`Error`].
    pub fn at(self, position: Position) -> Error {
        Error::new(self, position)
    }
}
