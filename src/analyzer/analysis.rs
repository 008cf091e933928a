//! Side table produced by the analyzer.
//!
//! The AST is never mutated; what the analyzer learns about a node is stored
//! here under the node's id.

use std::collections::HashMap;

use crate::{
    ast::ast::NodeId,
    environment::{FunctionRef, Type, VariableRef},
};

#[derive(Debug, Default)]
pub struct Analysis {
    types: HashMap<NodeId, Type>,
    variables: HashMap<NodeId, VariableRef>,
    functions: HashMap<NodeId, FunctionRef>,
}

impl Analysis {
    /// Static type of an expression.
    pub fn get_type(&self, id: NodeId) -> Option<Type> {
        self.types.get(&id).copied()
    }

    /// Variable bound by a field, declaration or access.
    pub fn get_variable(&self, id: NodeId) -> Option<&VariableRef> {
        self.variables.get(&id)
    }

    /// Function bound by a method or call.
    pub fn get_function(&self, id: NodeId) -> Option<&FunctionRef> {
        self.functions.get(&id)
    }

    pub fn record_type(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }

    pub fn record_variable(&mut self, id: NodeId, variable: VariableRef) {
        self.variables.insert(id, variable);
    }

    pub fn record_function(&mut self, id: NodeId, function: FunctionRef) {
        self.functions.insert(id, function);
    }
}
