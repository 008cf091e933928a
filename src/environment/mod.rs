//! Runtime and static environment shared by the analyzer and interpreter.
//!
//! - environment: scope chain with variable and function bindings
//! - types: the fixed type lattice
//! - value: runtime values
//! - stdlib: builtin fields and methods available on each type

pub mod environment;
pub mod stdlib;
pub mod types;
pub mod value;

pub use environment::{
    Callable, Function, FunctionRef, NativeFn, Scope, ScopeRef, Variable, VariableRef,
};
pub use types::Type;
pub use value::Value;
