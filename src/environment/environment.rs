//! Lexical scopes for both passes.
//!
//! A scope owns the variables and functions defined directly in it and links
//! to its parent. Lookups walk outward until a binding is found, so the
//! nearest definition shadows outer ones. Bindings keep insertion order.

use std::{cell::RefCell, fmt::Debug, rc::Rc};

use crate::{ast::ast::Method, errors::errors::ErrorImpl};

use super::{types::Type, value::Value};

pub type ScopeRef = Rc<RefCell<Scope>>;
pub type VariableRef = Rc<Variable>;
pub type FunctionRef = Rc<Function>;

/// A builtin implementation. Member methods receive their receiver as the
/// first argument.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, ErrorImpl>>;

#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub constant: bool,
    value: RefCell<Value>,
}

impl Variable {
    pub fn new(name: &str, ty: Type, constant: bool, value: Value) -> Self {
        Variable {
            name: String::from(name),
            ty,
            constant,
            value: RefCell::new(value),
        }
    }

    pub fn get_value(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn set_value(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }
}

/// What runs when a function is invoked.
#[derive(Clone)]
pub enum Callable {
    Native(NativeFn),
    /// A user method known only by its signature, as seen by the analyzer.
    Declared,
    /// A user method together with the scope it was defined in.
    Closure { method: Rc<Method>, scope: ScopeRef },
}

impl Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "Native"),
            Callable::Declared => write!(f, "Declared"),
            // The captured scope usually contains this very function.
            Callable::Closure { method, .. } => write!(f, "Closure({})", method.name),
        }
    }
}

#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
    pub body: Callable,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<ScopeRef>,
    variables: Vec<VariableRef>,
    functions: Vec<FunctionRef>,
}

impl Scope {
    /// Creates a scope without a parent.
    pub fn root() -> ScopeRef {
        Rc::new(RefCell::new(Scope::default()))
    }

    /// Creates an empty scope nested inside `parent`.
    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            parent: Some(Rc::clone(parent)),
            ..Scope::default()
        }))
    }

    pub fn get_parent(&self) -> Option<ScopeRef> {
        self.parent.clone()
    }

    /// Fails with `DuplicateDefinition` if `name` is already bound in this
    /// scope. Parents are not consulted.
    pub fn define_variable(
        &mut self,
        name: &str,
        ty: Type,
        constant: bool,
        value: Value,
    ) -> Result<VariableRef, ErrorImpl> {
        if self.variables.iter().any(|variable| variable.name == name) {
            return Err(ErrorImpl::DuplicateDefinition {
                name: String::from(name),
            });
        }

        Ok(self.insert_variable(Variable::new(name, ty, constant, value)))
    }

    /// Functions are keyed by name and arity, so overloads on arity coexist.
    pub fn define_function(
        &mut self,
        name: &str,
        parameter_types: Vec<Type>,
        return_type: Type,
        body: Callable,
    ) -> Result<FunctionRef, ErrorImpl> {
        let arity = parameter_types.len();
        if self
            .functions
            .iter()
            .any(|function| function.name == name && function.arity() == arity)
        {
            return Err(ErrorImpl::DuplicateDefinition {
                name: format!("{}/{}", name, arity),
            });
        }

        Ok(self.insert_function(Function {
            name: String::from(name),
            parameter_types,
            return_type,
            body,
        }))
    }

    /// Binds `variable` without the duplicate check, for tables built by the crate itself.
    pub(crate) fn insert_variable(&mut self, variable: Variable) -> VariableRef {
        let variable = Rc::new(variable);
        self.variables.push(Rc::clone(&variable));
        variable
    }

    /// Binds `function` without the duplicate check, for tables built by the crate itself.
    pub(crate) fn insert_function(&mut self, function: Function) -> FunctionRef {
        let function = Rc::new(function);
        self.functions.push(Rc::clone(&function));
        function
    }

    pub fn lookup_variable(&self, name: &str) -> Result<VariableRef, ErrorImpl> {
        if let Some(variable) = self.variables.iter().find(|variable| variable.name == name) {
            return Ok(Rc::clone(variable));
        }

        match &self.parent {
            Some(parent) => parent.borrow().lookup_variable(name),
            None => Err(ErrorImpl::UnknownSymbol {
                name: String::from(name),
            }),
        }
    }

    pub fn lookup_function(&self, name: &str, arity: usize) -> Result<FunctionRef, ErrorImpl> {
        if let Some(function) = self
            .functions
            .iter()
            .find(|function| function.name == name && function.arity() == arity)
        {
            return Ok(Rc::clone(function));
        }

        match &self.parent {
            Some(parent) => parent.borrow().lookup_function(name, arity),
            None => Err(ErrorImpl::UnknownSymbol {
                name: format!("{}/{}", name, arity),
            }),
        }
    }

    /// Drops every function bound here, releasing closures that capture this scope.
    pub fn clear_functions(&mut self) {
        self.functions.clear();
    }
}
