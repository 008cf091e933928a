//! Static analysis pass.
//!
//! Resolves every name against the scope chain, computes the type of every
//! expression and rejects ill-typed programs before anything runs. Results
//! are recorded in an [`Analysis`] side table keyed by node id.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Expr, Field, Method, Source, Stmt},
        expressions::{AccessExpr, BinaryExpr, BinaryOperator, FunctionExpr},
        statements::{AssignmentStmt, DeclarationStmt, ForStmt, IfStmt},
        types::Literal,
    },
    environment::{
        stdlib::TypeMembers, Callable, Function, FunctionRef, Scope, ScopeRef, Type, Value,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::analysis::Analysis;

#[derive(Debug)]
pub struct Analyzer {
    root: ScopeRef,
    scope: ScopeRef,
    members: TypeMembers,
    /// Method whose body is being analyzed, used to check RETURN
    method: Option<FunctionRef>,
    analysis: Analysis,
}

impl Analyzer {
    /// Creates an analyzer whose root scope knows the builtin `print`.
    pub fn new() -> Self {
        let root = Scope::root();
        let mut analyzer = Analyzer {
            scope: Rc::clone(&root),
            root,
            members: TypeMembers::new(),
            method: None,
            analysis: Analysis::default(),
        };

        analyzer.root.borrow_mut().insert_function(Function {
            name: String::from("print"),
            parameter_types: vec![Type::Any],
            return_type: Type::Nil,
            body: Callable::Declared,
        });
        analyzer
    }

    /// Declares a builtin function by signature in the root scope.
    pub fn define_native(
        &mut self,
        name: &str,
        parameter_types: Vec<Type>,
        return_type: Type,
    ) -> Result<FunctionRef, Error> {
        self.root
            .borrow_mut()
            .define_function(name, parameter_types, return_type, Callable::Declared)
            .map_err(|error| error.at(Position::null()))
    }

    /// Analyzes a whole program, returning what was learned about each node.
    pub fn analyze(&mut self, source: &Source) -> Result<Analysis, Error> {
        analyze_source(self, source)?;
        Ok(std::mem::take(&mut self.analysis))
    }

    pub fn get_scope(&self) -> ScopeRef {
        Rc::clone(&self.scope)
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
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyzes `source` with a fresh [`Analyzer`].
pub fn analyze(source: &Source) -> Result<Analysis, Error> {
    Analyzer::new().analyze(source)
}

/// Fails with `TypeMismatch` unless a value of type `actual` may be stored
/// where `target` is expected.
pub fn require_assignable(target: Type, actual: Type, position: Position) -> Result<(), Error> {
    if target.is_assignable_from(actual) {
        Ok(())
    } else {
        Err(ErrorImpl::TypeMismatch {
            expected: target.to_string(),
            received: actual.to_string(),
        }
        .at(position))
    }
}

fn resolve_type(name: &str, position: &Position) -> Result<Type, Error> {
    Type::from_name(name).ok_or_else(|| {
        ErrorImpl::UnknownType {
            type_: String::from(name),
        }
        .at(position.clone())
    })
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn analyze_source(analyzer: &mut Analyzer, source: &Source) -> Result<(), Error> {
    debug!(
        fields = source.fields.len(),
        methods = source.methods.len(),
        "analyzing source"
    );

    for field in &source.fields {
        analyze_field(analyzer, field)?;
    }

    // Headers first so methods can call each other regardless of order
    let mut functions = vec![];
    for method in &source.methods {
        functions.push(declare_method(analyzer, method)?);
    }

    for (method, function) in source.methods.iter().zip(functions) {
        analyze_method(analyzer, method, function)?;
    }

    let main = analyzer.root.borrow().lookup_function("main", 0);
    match main {
        Ok(main) if main.return_type == Type::Integer => Ok(()),
        _ => Err(ErrorImpl::MissingEntryPoint.at(source.span.end.clone())),
    }
}

fn analyze_field(analyzer: &mut Analyzer, field: &Field) -> Result<(), Error> {
    let position = &field.span.start;
    let ty = resolve_type(&field.type_name, position)?;

    match &field.value {
        Some(value) => {
            let actual = analyze_expr(analyzer, value)?;
            require_assignable(ty, actual, value.get_span().start.clone())?;
        }
        None if field.constant => {
            return Err(ErrorImpl::UninitializedConstant {
                name: field.name.clone(),
            }
            .at(position.clone()))
        }
        None => {}
    }

    let variable = analyzer
        .scope
        .borrow_mut()
        .define_variable(&field.name, ty, field.constant, Value::Nil)
        .map_err(|error| error.at(position.clone()))?;
    analyzer.analysis.record_variable(field.id, variable);

    Ok(())
}

fn declare_method(analyzer: &mut Analyzer, method: &Method) -> Result<FunctionRef, Error> {
    let position = &method.span.start;

    let parameter_types = method
        .parameter_type_names
        .iter()
        .map(|name| resolve_type(name, position))
        .collect::<Result<Vec<_>, _>>()?;
    let return_type = match &method.return_type_name {
        Some(name) => resolve_type(name, position)?,
        None => Type::Any,
    };

    let function = analyzer
        .scope
        .borrow_mut()
        .define_function(&method.name, parameter_types, return_type, Callable::Declared)
        .map_err(|error| error.at(position.clone()))?;
    analyzer
        .analysis
        .record_function(method.id, Rc::clone(&function));

    Ok(function)
}

#[tracing::instrument(level = "debug", skip_all, fields(method = %method.name))]
fn analyze_method(
    analyzer: &mut Analyzer,
    method: &Method,
    function: FunctionRef,
) -> Result<(), Error> {
    debug!("analyzing method body");

    let scope = Scope::child(&analyzer.root);
    let previous = analyzer.method.replace(Rc::clone(&function));

    let result = analyzer.with_scope(scope, |analyzer| {
        for (name, ty) in method.parameters.iter().zip(&function.parameter_types) {
            analyzer
                .scope
                .borrow_mut()
                .define_variable(name, *ty, false, Value::Nil)
                .map_err(|error| error.at(method.span.start.clone()))?;
        }

        analyze_statements(analyzer, &method.statements)?;

        // Falling off the end yields Nil
        if !matches!(function.return_type, Type::Any | Type::Nil)
            && !always_returns(&method.statements)
        {
            return Err(ErrorImpl::TypeMismatch {
                expected: function.return_type.to_string(),
                received: Type::Nil.to_string(),
            }
            .at(method.span.end.clone()));
        }

        Ok(())
    });

    analyzer.method = previous;
    result
}

/// Whether every path through `statements` reaches a RETURN. Loops are not
/// followed, since their bodies may run zero times.
fn always_returns(statements: &[Stmt]) -> bool {
    statements.iter().any(|statement| match statement {
        Stmt::Return(_) => true,
        Stmt::If(stmt) => {
            always_returns(&stmt.then_statements) && always_returns(&stmt.else_statements)
        }
        _ => false,
    })
}

pub fn analyze_statements(analyzer: &mut Analyzer, statements: &[Stmt]) -> Result<(), Error> {
    for statement in statements {
        analyze_stmt(analyzer, statement)?;
    }

    Ok(())
}

pub fn analyze_stmt(analyzer: &mut Analyzer, ast: &Stmt) -> Result<(), Error> {
    trace!(position = %ast.get_span().start, "analyzing statement");

    match ast {
        Stmt::Expression(stmt) => analyze_expr(analyzer, &stmt.expression).map(|_| ()),
        Stmt::Declaration(stmt) => analyze_declaration(analyzer, stmt),
        Stmt::Assignment(stmt) => analyze_assignment(analyzer, stmt),
        Stmt::If(stmt) => analyze_if(analyzer, stmt),
        Stmt::For(stmt) => analyze_for(analyzer, stmt),
        Stmt::While(stmt) => {
            let condition = analyze_expr(analyzer, &stmt.condition)?;
            require_assignable(Type::Boolean, condition, stmt.condition.get_span().start.clone())?;

            analyzer.with_child_scope(|analyzer| analyze_statements(analyzer, &stmt.statements))
        }
        Stmt::Return(stmt) => {
            let Some(method) = analyzer.method.clone() else {
                return Err(ErrorImpl::UnboundReturn.at(stmt.span.start.clone()));
            };

            let actual = analyze_expr(analyzer, &stmt.value)?;
            require_assignable(method.return_type, actual, stmt.value.get_span().start.clone())
        }
    }
}

fn analyze_declaration(analyzer: &mut Analyzer, stmt: &DeclarationStmt) -> Result<(), Error> {
    let position = &stmt.span.start;

    let ty = match (&stmt.type_name, &stmt.value) {
        (Some(type_name), value) => {
            let ty = resolve_type(type_name, position)?;
            if let Some(value) = value {
                let actual = analyze_expr(analyzer, value)?;
                require_assignable(ty, actual, value.get_span().start.clone())?;
            }
            ty
        }
        (None, Some(value)) => analyze_expr(analyzer, value)?,
        (None, None) => {
            return Err(ErrorImpl::AmbiguousDeclaration {
                name: stmt.name.clone(),
            }
            .at(position.clone()))
        }
    };

    let variable = analyzer
        .scope
        .borrow_mut()
        .define_variable(&stmt.name, ty, false, Value::Nil)
        .map_err(|error| error.at(position.clone()))?;
    analyzer.analysis.record_variable(stmt.id, variable);

    Ok(())
}

fn analyze_assignment(analyzer: &mut Analyzer, stmt: &AssignmentStmt) -> Result<(), Error> {
    let Expr::Access(receiver) = &stmt.receiver else {
        return Err(ErrorImpl::InvalidAssignmentTarget.at(stmt.span.start.clone()));
    };

    analyze_access(analyzer, receiver)?;
    let variable = match analyzer.analysis.get_variable(receiver.id) {
        Some(variable) => Rc::clone(variable),
        None => {
            return Err(ErrorImpl::UnknownSymbol {
                name: receiver.name.clone(),
            }
            .at(receiver.span.start.clone()))
        }
    };

    if variable.constant {
        return Err(ErrorImpl::ConstantViolation {
            name: receiver.name.clone(),
        }
        .at(stmt.span.start.clone()));
    }

    let actual = analyze_expr(analyzer, &stmt.value)?;
    require_assignable(variable.ty, actual, stmt.value.get_span().start.clone())
}

fn analyze_if(analyzer: &mut Analyzer, stmt: &IfStmt) -> Result<(), Error> {
    let condition = analyze_expr(analyzer, &stmt.condition)?;
    require_assignable(Type::Boolean, condition, stmt.condition.get_span().start.clone())?;

    if stmt.then_statements.is_empty() {
        return Err(ErrorImpl::EmptyBranch.at(stmt.span.start.clone()));
    }

    analyzer.with_child_scope(|analyzer| analyze_statements(analyzer, &stmt.then_statements))?;
    analyzer.with_child_scope(|analyzer| analyze_statements(analyzer, &stmt.else_statements))
}

fn analyze_for(analyzer: &mut Analyzer, stmt: &ForStmt) -> Result<(), Error> {
    // The loop scope holds the initialization; the body nests inside it
    analyzer.with_child_scope(|analyzer| {
        if let Some(initialization) = &stmt.initialization {
            analyze_stmt(analyzer, initialization)?;
        }

        if let Some(condition) = &stmt.condition {
            let ty = analyze_expr(analyzer, condition)?;
            require_assignable(Type::Boolean, ty, condition.get_span().start.clone())?;
        }

        if let Some(increment) = &stmt.increment {
            analyze_stmt(analyzer, increment)?;
        }

        analyzer.with_child_scope(|analyzer| analyze_statements(analyzer, &stmt.statements))
    })
}

/// Computes and records the static type of `ast`.
pub fn analyze_expr(analyzer: &mut Analyzer, ast: &Expr) -> Result<Type, Error> {
    let ty = match ast {
        Expr::Literal(expr) => literal_type(&expr.literal, &expr.span.start)?,
        Expr::Group(expr) => analyze_expr(analyzer, &expr.expression)?,
        Expr::Binary(expr) => analyze_binary(analyzer, expr)?,
        Expr::Access(expr) => analyze_access(analyzer, expr)?,
        Expr::Function(expr) => analyze_function(analyzer, expr)?,
    };

    analyzer.analysis.record_type(ast.id(), ty);
    Ok(ty)
}

fn literal_type(literal: &Literal, position: &Position) -> Result<Type, Error> {
    Ok(match literal {
        Literal::Nil => Type::Nil,
        Literal::Boolean(_) => Type::Boolean,
        Literal::Integer(value) => {
            if i32::try_from(*value).is_err() {
                return Err(ErrorImpl::IntegerOverflow {
                    value: value.to_string(),
                }
                .at(position.clone()));
            }
            Type::Integer
        }
        Literal::Decimal(_) => Type::Decimal,
        Literal::Character(_) => Type::Character,
        Literal::String(_) => Type::String,
    })
}

/// Result type of `left operator right`, if the operator applies at all.
pub fn binary_type(operator: BinaryOperator, left: Type, right: Type) -> Option<Type> {
    use BinaryOperator::*;

    let numeric = matches!(
        (left, right),
        (Type::Integer, Type::Integer) | (Type::Decimal, Type::Decimal)
    );

    match operator {
        Add if left == Type::String || right == Type::String => Some(Type::String),
        Add | Subtract | Multiply | Divide if numeric => Some(left),
        Less | LessEquals | Greater | GreaterEquals if numeric => Some(Type::Boolean),
        Equals | NotEquals if left == right => Some(Type::Boolean),
        And | Or if left == Type::Boolean && right == Type::Boolean => Some(Type::Boolean),
        _ => None,
    }
}

fn analyze_binary(analyzer: &mut Analyzer, expr: &BinaryExpr) -> Result<Type, Error> {
    let left = analyze_expr(analyzer, &expr.left)?;
    let right = analyze_expr(analyzer, &expr.right)?;

    binary_type(expr.operator, left, right).ok_or_else(|| {
        ErrorImpl::InvalidOperation {
            operator: expr.operator.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
        .at(expr.span.start.clone())
    })
}

fn analyze_access(analyzer: &mut Analyzer, expr: &AccessExpr) -> Result<Type, Error> {
    let variable = match &expr.receiver {
        Some(receiver) => {
            let receiver_type = analyze_expr(analyzer, receiver)?;
            analyzer.members.lookup_field(receiver_type, &expr.name)
        }
        None => analyzer.scope.borrow().lookup_variable(&expr.name),
    }
    .map_err(|error| error.at(expr.span.start.clone()))?;

    let ty = variable.ty;
    analyzer.analysis.record_variable(expr.id, variable);
    Ok(ty)
}

fn analyze_function(analyzer: &mut Analyzer, expr: &FunctionExpr) -> Result<Type, Error> {
    let arity = expr.arguments.len();
    let function = match &expr.receiver {
        Some(receiver) => {
            let receiver_type = analyze_expr(analyzer, receiver)?;
            analyzer.members.lookup_method(receiver_type, &expr.name, arity)
        }
        None => analyzer.scope.borrow().lookup_function(&expr.name, arity),
    }
    .map_err(|error| error.at(expr.span.start.clone()))?;

    for (argument, parameter_type) in expr.arguments.iter().zip(&function.parameter_types) {
        let actual = analyze_expr(analyzer, argument)?;
        require_assignable(*parameter_type, actual, argument.get_span().start.clone())?;
    }

    let ty = function.return_type;
    analyzer.analysis.record_function(expr.id, function);
    Ok(ty)
}
