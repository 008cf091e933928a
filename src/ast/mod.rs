/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Program root, fields, methods and the statement/expression sum types
/// - expressions: Definitions for the expression nodes
/// - statements: Definitions for the statement nodes
/// - types: Literal values carried by literal expressions
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
