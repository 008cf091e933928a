//! Interpreter module.
//!
//! - interpreter: the tree-walking evaluator
//! - operators: runtime semantics of the binary operators

pub mod interpreter;
pub mod operators;
