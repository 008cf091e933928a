//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Fields and methods
//! - Declarations and assignments
//! - Control flow statements
//! - Operator precedence and member access
//! - Error cases

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::parser::parse;
use crate::{
    ast::{
        ast::{Expr, Source, Stmt},
        expressions::BinaryOperator,
        types::Literal,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Source, Error> {
    let tokens = tokenize(source.to_string(), Some("test.plc".to_string()))?;
    parse(tokens, Rc::new("test.plc".to_string()))
}

/// Parses `expr` as the sole return value of a method.
fn parse_return_value(expr: &str) -> Expr {
    let source = parse_source(&format!("DEF main() DO RETURN {}; END", expr)).unwrap();
    match &source.methods[0].statements[0] {
        Stmt::Return(stmt) => stmt.value.clone(),
        other => panic!("expected return, got {:?}", other),
    }
}

#[test]
fn test_parse_empty_source() {
    let source = parse_source("").unwrap();

    assert!(source.fields.is_empty());
    assert!(source.methods.is_empty());
}

#[test]
fn test_parse_fields() {
    let source = parse_source("LET x: Integer = 1; LET CONST LIMIT: Integer = 10; LET s: String;")
        .unwrap();

    assert_eq!(source.fields.len(), 3);
    assert_eq!(source.fields[0].name, "x");
    assert_eq!(source.fields[0].type_name, "Integer");
    assert!(!source.fields[0].constant);
    assert!(source.fields[1].constant);
    assert!(source.fields[2].value.is_none());
}

#[test]
fn test_field_requires_type() {
    let error = parse_source("LET x = 1;").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_method_header() {
    let source = parse_source("DEF add(a: Integer, b: Integer): Integer DO RETURN a + b; END")
        .unwrap();
    let method = &source.methods[0];

    assert_eq!(method.name, "add");
    assert_eq!(method.parameters, vec!["a", "b"]);
    assert_eq!(method.parameter_type_names, vec!["Integer", "Integer"]);
    assert_eq!(method.return_type_name.as_deref(), Some("Integer"));
    assert_eq!(method.statements.len(), 1);
}

#[test]
fn test_parse_method_without_return_type() {
    let source = parse_source("DEF log(value: Any) DO print(value); END").unwrap();

    assert!(source.methods[0].return_type_name.is_none());
}

#[test]
fn test_parse_declarations() {
    let source = parse_source("DEF main() DO LET a; LET b: Integer; LET c = 1; END").unwrap();
    let statements = &source.methods[0].statements;

    match (&statements[0], &statements[1], &statements[2]) {
        (Stmt::Declaration(a), Stmt::Declaration(b), Stmt::Declaration(c)) => {
            assert!(a.type_name.is_none() && a.value.is_none());
            assert_eq!(b.type_name.as_deref(), Some("Integer"));
            assert!(c.value.is_some());
        }
        other => panic!("expected declarations, got {:?}", other),
    }
}

#[test]
fn test_parse_assignment() {
    let source = parse_source("DEF main() DO x = 1; END").unwrap();

    match &source.methods[0].statements[0] {
        Stmt::Assignment(stmt) => {
            assert!(matches!(&stmt.receiver, Expr::Access(access) if access.name == "x"));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_parse_if_else() {
    let source = parse_source("DEF main() DO IF x DO f(); ELSE g(); h(); END END").unwrap();

    match &source.methods[0].statements[0] {
        Stmt::If(stmt) => {
            assert_eq!(stmt.then_statements.len(), 1);
            assert_eq!(stmt.else_statements.len(), 2);
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_parse_else_do() {
    let source = parse_source("DEF main() DO IF x DO f(); ELSE DO g(); END END").unwrap();

    assert!(matches!(&source.methods[0].statements[0], Stmt::If(stmt) if stmt.else_statements.len() == 1));
}

#[test]
fn test_parse_for_loop() {
    let source =
        parse_source("DEF main() DO FOR (LET i = 0; i < 10; i = i + 1) DO print(i); END END")
            .unwrap();

    match &source.methods[0].statements[0] {
        Stmt::For(stmt) => {
            assert!(matches!(stmt.initialization.as_deref(), Some(Stmt::Declaration(_))));
            assert!(stmt.condition.is_some());
            assert!(matches!(stmt.increment.as_deref(), Some(Stmt::Assignment(_))));
            assert_eq!(stmt.statements.len(), 1);
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_parse_for_loop_empty_header() {
    let source = parse_source("DEF main() DO FOR (;;) DO END END").unwrap();

    match &source.methods[0].statements[0] {
        Stmt::For(stmt) => {
            assert!(stmt.initialization.is_none());
            assert!(stmt.condition.is_none());
            assert!(stmt.increment.is_none());
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_parse_while_loop() {
    let source = parse_source("DEF main() DO WHILE x < 10 DO x = x + 1; END END").unwrap();

    assert!(matches!(&source.methods[0].statements[0], Stmt::While(stmt) if stmt.statements.len() == 1));
}

#[test]
fn test_precedence_multiplicative_over_additive() {
    match parse_return_value("1 + 2 * 3") {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOperator::Add);
            assert!(matches!(*binary.right, Expr::Binary(ref right) if right.operator == BinaryOperator::Multiply));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_precedence_and_over_or() {
    match parse_return_value("a || b && c") {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOperator::Or);
            assert!(matches!(*binary.right, Expr::Binary(ref right) if right.operator == BinaryOperator::And));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_binary_is_left_associative() {
    match parse_return_value("10 - 2 - 3") {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOperator::Subtract);
            assert!(matches!(*binary.left, Expr::Binary(_)));
            assert!(matches!(*binary.right, Expr::Literal(_)));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_group_overrides_precedence() {
    match parse_return_value("(1 + 2) * 3") {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOperator::Multiply);
            assert!(matches!(*binary.left, Expr::Group(_)));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_parse_literals() {
    assert!(matches!(parse_return_value("NIL"), Expr::Literal(ref l) if l.literal == Literal::Nil));
    assert!(matches!(parse_return_value("TRUE"), Expr::Literal(ref l) if l.literal == Literal::Boolean(true)));
    assert!(matches!(parse_return_value("'c'"), Expr::Literal(ref l) if l.literal == Literal::Character('c')));
    assert!(matches!(parse_return_value("-5"), Expr::Literal(ref l) if l.literal == Literal::Integer(-5)));
}

#[test]
fn test_integer_literal_wider_than_32_bits() {
    assert!(matches!(
        parse_return_value("3000000000"),
        Expr::Literal(ref l) if l.literal == Literal::Integer(3_000_000_000)
    ));
}

#[test]
fn test_integer_literal_beyond_64_bits() {
    let error = parse_source("DEF main() DO RETURN 99999999999999999999; END").unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::IntegerOverflow {
            value: "99999999999999999999".to_string()
        }
    );
    assert_eq!(error.get_position().0, 21);
}

#[test]
fn test_decimal_literal_beyond_precision() {
    let error =
        parse_source("DEF main() DO RETURN 123456789012345678901234567890.5; END").unwrap_err();

    assert_eq!(error.get_error_name(), "NumberParseError");
}

#[test]
fn test_parse_member_access_and_call() {
    match parse_return_value("name.length") {
        Expr::Access(access) => {
            assert_eq!(access.name, "length");
            assert!(matches!(access.receiver.as_deref(), Some(Expr::Access(r)) if r.name == "name"));
        }
        other => panic!("expected access, got {:?}", other),
    }

    match parse_return_value("name.charAt(0)") {
        Expr::Function(function) => {
            assert_eq!(function.name, "charAt");
            assert_eq!(function.arguments.len(), 1);
            assert!(function.receiver.is_some());
        }
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_parse_call_arguments() {
    match parse_return_value("f(1, 2 + 3, g())") {
        Expr::Function(function) => {
            assert!(function.receiver.is_none());
            assert_eq!(function.arguments.len(), 3);
        }
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_node_ids_are_unique() {
    let source = parse_source("LET x: Integer = 1; DEF main() DO RETURN x + f(x); END").unwrap();
    let mut ids = vec![source.fields[0].id, source.methods[0].id];

    if let Stmt::Return(stmt) = &source.methods[0].statements[0] {
        ids.push(stmt.value.id());
    }
    let count = ids.len();
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), count);
}

#[test]
fn test_missing_semicolon() {
    let error = parse_source("DEF main() DO print(1) END").unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnexpectedToken {
            token: "END".to_string()
        }
    );
}

#[test]
fn test_unterminated_block() {
    let error = parse_source("DEF main() DO print(1);").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_statement_at_top_level() {
    let error = parse_source("print(1);").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(error.get_position().0, 0);
}

#[test]
fn test_missing_operand() {
    assert!(parse_source("DEF main() DO RETURN 1 + ; END").is_err());
}
