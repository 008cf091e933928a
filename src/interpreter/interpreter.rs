//! Tree-walking evaluator.
//!
//! Runs an analyzed [`Source`] against a runtime scope chain. Each block
//! executes in a fresh child scope, and RETURN travels back to the call site
//! as [`Flow::Returned`] rather than as an error.

use std::{cell::RefCell, io::Write, rc::Rc};

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Expr, Source, Stmt},
        expressions::{BinaryExpr, BinaryOperator, FunctionExpr},
        statements::{AssignmentStmt, DeclarationStmt, ForStmt},
        types::Literal,
    },
    environment::{
        stdlib::TypeMembers, Callable, Function, FunctionRef, NativeFn, Scope, ScopeRef, Type,
        Value,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::operators::{binary, require_boolean};

/// How a statement list finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Completed,
    Returned(Value),
}

pub struct Interpreter {
    globals: ScopeRef,
    scope: ScopeRef,
    members: TypeMembers,
    output: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    /// Creates an interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(std::io::stdout())))
    }

    /// Creates an interpreter whose `print` writes to `output`.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        let globals = Scope::root();
        let mut interpreter = Interpreter {
            scope: Rc::clone(&globals),
            globals,
            members: TypeMembers::new(),
            output,
        };

        let output = Rc::clone(&interpreter.output);
        let print: NativeFn = Rc::new(move |arguments: &[Value]| {
            let mut output = output.borrow_mut();
            for argument in arguments {
                writeln!(output, "{}", argument).map_err(|error| ErrorImpl::OutputError {
                    message: error.to_string(),
                })?;
            }
            Ok(Value::Nil)
        });

        interpreter.globals.borrow_mut().insert_function(Function {
            name: String::from("print"),
            parameter_types: vec![Type::Any],
            return_type: Type::Nil,
            body: Callable::Native(print),
        });
        interpreter
    }

    /// Adds a builtin function to the global scope.
    pub fn define_native(
        &mut self,
        name: &str,
        parameter_types: Vec<Type>,
        return_type: Type,
        native: NativeFn,
    ) -> Result<FunctionRef, Error> {
        self.globals
            .borrow_mut()
            .define_function(name, parameter_types, return_type, Callable::Native(native))
            .map_err(|error| error.at(Position::null()))
    }

    pub fn get_scope(&self) -> ScopeRef {
        Rc::clone(&self.scope)
    }

    /// Evaluates fields, defines methods, then invokes `main()` and returns its value.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, source: &Source) -> Result<Value, Error> {
        debug!(
            fields = source.fields.len(),
            methods = source.methods.len(),
            "running source"
        );

        for field in &source.fields {
            let value = match &field.value {
                Some(value) => self.evaluate(value)?,
                None => Value::Nil,
            };
            let ty = Type::from_name(&field.type_name).unwrap_or(Type::Any);

            self.globals
                .borrow_mut()
                .define_variable(&field.name, ty, field.constant, value)
                .map_err(|error| error.at(field.span.start.clone()))?;
        }

        for method in &source.methods {
            let parameter_types = method
                .parameter_type_names
                .iter()
                .map(|name| Type::from_name(name).unwrap_or(Type::Any))
                .collect();
            let return_type = method
                .return_type_name
                .as_deref()
                .and_then(Type::from_name)
                .unwrap_or(Type::Any);
            let closure = Callable::Closure {
                method: Rc::clone(method),
                scope: Rc::clone(&self.globals),
            };

            self.globals
                .borrow_mut()
                .define_function(&method.name, parameter_types, return_type, closure)
                .map_err(|error| error.at(method.span.start.clone()))?;
        }

        let main = self
            .globals
            .borrow()
            .lookup_function("main", 0)
            .map_err(|_| ErrorImpl::MissingEntryPoint.at(source.span.end.clone()))?;

        self.invoke(&main, vec![], &source.span.end)
    }

    /// Runs `f` with `scope` as the active scope, restoring the previous one
    /// afterwards whether or not `f` succeeds.
    fn with_scope<T>(
        &mut self,
        scope: ScopeRef,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let previous = std::mem::replace(&mut self.scope, scope);
        trace!("scope pushed");
        let result = f(self);
        self.scope = previous;
        trace!(failed = result.is_err(), "scope restored");
        result
    }

    fn with_child_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let scope = Scope::child(&self.scope);
        self.with_scope(scope, f)
    }

    /// Calls `function` with already evaluated arguments.
    ///
    /// For member methods the receiver is the first argument.
    pub fn invoke(
        &mut self,
        function: &FunctionRef,
        arguments: Vec<Value>,
        position: &Position,
    ) -> Result<Value, Error> {
        match &function.body {
            Callable::Native(native) => {
                native(arguments.as_slice()).map_err(|error| error.at(position.clone()))
            }
            Callable::Declared => Err(ErrorImpl::UnknownSymbol {
                name: function.name.clone(),
            }
            .at(position.clone())),
            Callable::Closure { method, scope } => {
                debug!(method = %method.name, arguments = arguments.len(), "invoking method");

                let call_scope = Scope::child(scope);
                for ((name, ty), value) in method
                    .parameters
                    .iter()
                    .zip(&function.parameter_types)
                    .zip(arguments)
                {
                    call_scope
                        .borrow_mut()
                        .define_variable(name, *ty, false, value)
                        .map_err(|error| error.at(method.span.start.clone()))?;
                }

                let flow = self.with_scope(call_scope, |interpreter| {
                    interpreter.execute(&method.statements)
                })?;

                Ok(match flow {
                    Flow::Returned(value) => value,
                    Flow::Completed => Value::Nil,
                })
            }
        }
    }

    /// Executes statements in the active scope, stopping at the first RETURN.
    pub fn execute(&mut self, statements: &[Stmt]) -> Result<Flow, Error> {
        for statement in statements {
            if let Flow::Returned(value) = self.execute_stmt(statement)? {
                return Ok(Flow::Returned(value));
            }
        }

        Ok(Flow::Completed)
    }

    /// Executes a single statement outside of any method.
    ///
    /// A RETURN reaching this point has no call frame to return to.
    pub fn run_statement(&mut self, statement: &Stmt) -> Result<(), Error> {
        match self.execute_stmt(statement)? {
            Flow::Completed => Ok(()),
            Flow::Returned(_) => Err(ErrorImpl::UnboundReturn.at(statement.get_span().start.clone())),
        }
    }

    fn execute_stmt(&mut self, ast: &Stmt) -> Result<Flow, Error> {
        trace!(position = %ast.get_span().start, "executing statement");

        match ast {
            Stmt::Expression(stmt) => {
                self.evaluate(&stmt.expression)?;
                Ok(Flow::Completed)
            }
            Stmt::Declaration(stmt) => {
                self.execute_declaration(stmt)?;
                Ok(Flow::Completed)
            }
            Stmt::Assignment(stmt) => {
                self.execute_assignment(stmt)?;
                Ok(Flow::Completed)
            }
            Stmt::If(stmt) => {
                let condition = self.evaluate_condition(&stmt.condition)?;
                let branch = if condition {
                    &stmt.then_statements
                } else {
                    &stmt.else_statements
                };

                self.with_child_scope(|interpreter| interpreter.execute(branch))
            }
            Stmt::For(stmt) => self.execute_for(stmt),
            Stmt::While(stmt) => {
                while self.evaluate_condition(&stmt.condition)? {
                    let flow =
                        self.with_child_scope(|interpreter| interpreter.execute(&stmt.statements))?;
                    if let Flow::Returned(_) = flow {
                        return Ok(flow);
                    }
                }

                Ok(Flow::Completed)
            }
            Stmt::Return(stmt) => Ok(Flow::Returned(self.evaluate(&stmt.value)?)),
        }
    }

    fn execute_declaration(&mut self, stmt: &DeclarationStmt) -> Result<(), Error> {
        let value = match &stmt.value {
            Some(value) => self.evaluate(value)?,
            None => Value::Nil,
        };
        let ty = stmt
            .type_name
            .as_deref()
            .and_then(Type::from_name)
            .unwrap_or_else(|| value.get_type());

        self.scope
            .borrow_mut()
            .define_variable(&stmt.name, ty, false, value)
            .map_err(|error| error.at(stmt.span.start.clone()))?;

        Ok(())
    }

    fn execute_assignment(&mut self, stmt: &AssignmentStmt) -> Result<(), Error> {
        let Expr::Access(receiver) = &stmt.receiver else {
            return Err(ErrorImpl::InvalidAssignmentTarget.at(stmt.span.start.clone()));
        };

        // Builtin member fields are read-only
        if receiver.receiver.is_some() {
            return Err(ErrorImpl::ConstantViolation {
                name: receiver.name.clone(),
            }
            .at(stmt.span.start.clone()));
        }

        let variable = self
            .scope
            .borrow()
            .lookup_variable(&receiver.name)
            .map_err(|error| error.at(receiver.span.start.clone()))?;
        if variable.constant {
            return Err(ErrorImpl::ConstantViolation {
                name: receiver.name.clone(),
            }
            .at(stmt.span.start.clone()));
        }

        let value = self.evaluate(&stmt.value)?;
        variable.set_value(value);

        Ok(())
    }

    fn execute_for(&mut self, stmt: &ForStmt) -> Result<Flow, Error> {
        // Initialization, condition and increment share one loop scope
        self.with_child_scope(|interpreter| {
            if let Some(initialization) = &stmt.initialization {
                interpreter.execute_stmt(initialization)?;
            }

            loop {
                if let Some(condition) = &stmt.condition {
                    if !interpreter.evaluate_condition(condition)? {
                        break;
                    }
                }

                let flow = interpreter
                    .with_child_scope(|interpreter| interpreter.execute(&stmt.statements))?;
                if let Flow::Returned(_) = flow {
                    return Ok(flow);
                }

                if let Some(increment) = &stmt.increment {
                    interpreter.execute_stmt(increment)?;
                }
            }

            Ok(Flow::Completed)
        })
    }

    fn evaluate_condition(&mut self, condition: &Expr) -> Result<bool, Error> {
        let value = self.evaluate(condition)?;
        require_boolean(&value).map_err(|error| error.at(condition.get_span().start.clone()))
    }

    pub fn evaluate(&mut self, ast: &Expr) -> Result<Value, Error> {
        match ast {
            Expr::Literal(expr) => literal_value(&expr.literal)
                .map_err(|error| error.at(expr.span.start.clone())),
            Expr::Group(expr) => self.evaluate(&expr.expression),
            Expr::Binary(expr) => self.evaluate_binary(expr),
            Expr::Access(expr) => match &expr.receiver {
                Some(receiver) => {
                    let receiver = self.evaluate(receiver)?;
                    self.members
                        .read_field(&receiver, &expr.name)
                        .map_err(|error| error.at(expr.span.start.clone()))
                }
                None => {
                    let variable = self
                        .scope
                        .borrow()
                        .lookup_variable(&expr.name)
                        .map_err(|error| error.at(expr.span.start.clone()))?;
                    Ok(variable.get_value())
                }
            },
            Expr::Function(expr) => self.evaluate_function(expr),
        }
    }

    fn evaluate_binary(&mut self, expr: &BinaryExpr) -> Result<Value, Error> {
        let position = &expr.span.start;
        let left = self.evaluate(&expr.left)?;

        // Logical operators only look at the right side when they must
        match expr.operator {
            BinaryOperator::And | BinaryOperator::Or => {
                let left = require_boolean(&left).map_err(|error| error.at(position.clone()))?;
                if left == (expr.operator == BinaryOperator::Or) {
                    return Ok(Value::Boolean(left));
                }

                let right = self.evaluate(&expr.right)?;
                let right = require_boolean(&right).map_err(|error| error.at(position.clone()))?;
                Ok(Value::Boolean(right))
            }
            operator => {
                let right = self.evaluate(&expr.right)?;
                binary(operator, &left, &right).map_err(|error| error.at(position.clone()))
            }
        }
    }

    fn evaluate_function(&mut self, expr: &FunctionExpr) -> Result<Value, Error> {
        let position = &expr.span.start;
        let mut arguments = vec![];

        let function = match &expr.receiver {
            Some(receiver) => {
                let receiver = self.evaluate(receiver)?;
                let function = self
                    .members
                    .lookup_method(receiver.get_type(), &expr.name, expr.arguments.len())
                    .map_err(|error| error.at(position.clone()))?;
                arguments.push(receiver);
                function
            }
            None => self
                .scope
                .borrow()
                .lookup_function(&expr.name, expr.arguments.len())
                .map_err(|error| error.at(position.clone()))?,
        };

        for argument in &expr.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        self.invoke(&function, arguments, position)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        // Methods capture the global scope that owns them
        self.globals.borrow_mut().clear_functions();
    }
}

fn literal_value(literal: &Literal) -> Result<Value, ErrorImpl> {
    Ok(match literal {
        Literal::Nil => Value::Nil,
        Literal::Boolean(value) => Value::Boolean(*value),
        Literal::Integer(value) => {
            Value::Integer(i32::try_from(*value).map_err(|_| ErrorImpl::IntegerOverflow {
                value: value.to_string(),
            })?)
        }
        Literal::Decimal(value) => Value::Decimal(*value),
        Literal::Character(value) => Value::Character(*value),
        Literal::String(value) => Value::String(value.clone()),
    })
}
