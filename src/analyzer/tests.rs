//! Unit tests for the analyzer module.
//!
//! Programs are parsed from source and run through the analyzer; the tests
//! check both accepted programs (and what was recorded about them) and each
//! kind of rejection.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::{
    analysis::Analysis,
    analyzer::{analyze, analyze_stmt, binary_type, require_assignable, Analyzer},
};
use crate::{
    ast::{
        ast::{Source, Stmt},
        expressions::BinaryOperator,
    },
    environment::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
    Position,
};

fn parse_source(source: &str) -> Source {
    let tokens = tokenize(source.to_string(), Some("test.plc".to_string())).unwrap();
    parse(tokens, Rc::new("test.plc".to_string())).unwrap()
}

fn analyze_source(source: &str) -> Result<Analysis, Error> {
    analyze(&parse_source(source))
}

/// Wraps `body` in a valid `main`.
fn analyze_main(body: &str) -> Result<Analysis, Error> {
    analyze_source(&format!("DEF main(): Integer DO {} RETURN 0; END", body))
}

fn error_name(result: Result<Analysis, Error>) -> String {
    result.unwrap_err().get_error_name().to_string()
}

#[test]
fn test_minimal_program() {
    assert!(analyze_source("DEF main(): Integer DO RETURN 1 + 2; END").is_ok());
}

#[test]
fn test_missing_main() {
    assert_eq!(error_name(analyze_source("DEF helper(): Integer DO RETURN 1; END")), "MissingEntryPoint");
}

#[test]
fn test_main_with_wrong_return_type() {
    assert_eq!(error_name(analyze_source("DEF main(): Decimal DO RETURN 1.0; END")), "MissingEntryPoint");
    assert_eq!(error_name(analyze_source("DEF main() DO RETURN 1; END")), "MissingEntryPoint");
}

#[test]
fn test_main_with_parameters_is_not_entry_point() {
    assert_eq!(
        error_name(analyze_source("DEF main(x: Integer): Integer DO RETURN x; END")),
        "MissingEntryPoint"
    );
}

#[test]
fn test_uninitialized_constant_field() {
    let error = analyze_source("LET CONST LIMIT: Integer; DEF main(): Integer DO RETURN 0; END").unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UninitializedConstant {
            name: "LIMIT".to_string()
        }
    );
}

#[test]
fn test_field_type_mismatch() {
    assert_eq!(
        error_name(analyze_source("LET x: Integer = \"one\"; DEF main(): Integer DO RETURN x; END")),
        "TypeMismatch"
    );
}

#[test]
fn test_unknown_type() {
    assert_eq!(
        error_name(analyze_source("LET x: Float = 1.0; DEF main(): Integer DO RETURN 0; END")),
        "UnknownType"
    );
}

#[test]
fn test_duplicate_field() {
    assert_eq!(
        error_name(analyze_source(
            "LET x: Integer; LET x: Integer; DEF main(): Integer DO RETURN 0; END"
        )),
        "DuplicateDefinition"
    );
}

#[test]
fn test_methods_can_reference_each_other() {
    let source = "
        DEF main(): Integer DO RETURN twice(2); END
        DEF twice(x: Integer): Integer DO RETURN x * 2; END
    ";

    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_overload_on_arity() {
    let source = "
        DEF f(): Integer DO RETURN 1; END
        DEF f(x: Integer): Integer DO RETURN x; END
        DEF main(): Integer DO RETURN f() + f(2); END
    ";

    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_duplicate_method_same_arity() {
    let source = "
        DEF f(x: Integer): Integer DO RETURN 1; END
        DEF f(y: String): Integer DO RETURN 2; END
        DEF main(): Integer DO RETURN 0; END
    ";

    assert_eq!(error_name(analyze_source(source)), "DuplicateDefinition");
}

#[test]
fn test_declaration_inference_and_ambiguity() {
    assert!(analyze_main("LET x = 1; LET y: Integer = x;").is_ok());
    assert!(analyze_main("LET s: String;").is_ok());
    assert_eq!(error_name(analyze_main("LET x;")), "AmbiguousDeclaration");
    assert_eq!(error_name(analyze_main("LET x = 1.5; LET y: Integer = x;")), "TypeMismatch");
}

#[test]
fn test_declaration_records_variable_type() {
    let source = parse_source("DEF main(): Integer DO LET x = 'c'; RETURN 0; END");
    let analysis = analyze(&source).unwrap();

    let Stmt::Declaration(declaration) = &source.methods[0].statements[0] else {
        panic!("expected declaration");
    };
    assert_eq!(analysis.get_variable(declaration.id).unwrap().ty, Type::Character);
}

#[test]
fn test_expression_types_are_recorded() {
    let source = parse_source("DEF main(): Integer DO RETURN (1 + 2) * 3; END");
    let analysis = analyze(&source).unwrap();

    let Stmt::Return(stmt) = &source.methods[0].statements[0] else {
        panic!("expected return");
    };
    assert_eq!(analysis.get_type(stmt.value.id()), Some(Type::Integer));
    assert!(analysis.get_function(source.methods[0].id).is_some());
}

#[test]
fn test_duplicate_local() {
    assert_eq!(error_name(analyze_main("LET x = 1; LET x = 2;")), "DuplicateDefinition");
}

#[test]
fn test_shadowing_in_nested_block_is_allowed() {
    assert!(analyze_main("LET x = 1; IF TRUE DO LET x = \"inner\"; END").is_ok());
}

#[test]
fn test_unknown_symbol() {
    assert_eq!(error_name(analyze_main("LET y = x;")), "UnknownSymbol");
    assert_eq!(error_name(analyze_main("missing();")), "UnknownSymbol");
}

#[test]
fn test_call_arity_must_match() {
    assert_eq!(error_name(analyze_main("print();")), "UnknownSymbol");
    assert_eq!(error_name(analyze_main("print(1, 2);")), "UnknownSymbol");
}

#[test]
fn test_argument_types_checked() {
    let source = "
        DEF square(x: Integer): Integer DO RETURN x * x; END
        DEF main(): Integer DO RETURN square(\"two\"); END
    ";

    assert_eq!(error_name(analyze_source(source)), "TypeMismatch");
}

#[test]
fn test_comparable_parameter() {
    let source = "
        DEF show(x: Comparable) DO print(x); END
        DEF main(): Integer DO show(1); show(1.5); show('c'); show(\"s\"); RETURN 0; END
    ";
    assert!(analyze_source(source).is_ok());

    let source = "
        DEF show(x: Comparable) DO print(x); END
        DEF main(): Integer DO show(TRUE); RETURN 0; END
    ";
    assert_eq!(error_name(analyze_source(source)), "TypeMismatch");
}

#[test]
fn test_assignment_rules() {
    assert!(analyze_main("LET x = 1; x = 2;").is_ok());
    assert_eq!(error_name(analyze_main("LET x = 1; x = \"two\";")), "TypeMismatch");
    assert_eq!(error_name(analyze_main("1 = 2;")), "InvalidAssignmentTarget");
    assert_eq!(error_name(analyze_main("f() = 2;")), "InvalidAssignmentTarget");
}

#[test]
fn test_constant_violation() {
    let error = analyze_source("LET CONST x: Integer = 5; DEF main(): Integer DO x = 6; RETURN x; END")
        .unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::ConstantViolation {
            name: "x".to_string()
        }
    );
}

#[test]
fn test_member_field_is_constant() {
    assert_eq!(error_name(analyze_main("LET s = \"abc\"; s.length = 1;")), "ConstantViolation");
}

#[test]
fn test_if_rules() {
    assert!(analyze_main("IF 1 < 2 DO print(1); ELSE print(2); END").is_ok());
    assert_eq!(error_name(analyze_main("IF 1 DO print(1); END")), "TypeMismatch");
    assert_eq!(error_name(analyze_main("IF TRUE DO ELSE print(2); END")), "EmptyBranch");
}

#[test]
fn test_if_branch_scope_does_not_leak() {
    assert_eq!(
        error_name(analyze_main("IF TRUE DO LET inner = 1; END print(inner);")),
        "UnknownSymbol"
    );
}

#[test]
fn test_while_body_scope_does_not_leak() {
    assert_eq!(
        error_name(analyze_main("WHILE FALSE DO LET inner = 1; END print(inner);")),
        "UnknownSymbol"
    );
    assert_eq!(error_name(analyze_main("WHILE 1 DO END")), "TypeMismatch");
}

#[test]
fn test_for_scoping() {
    assert!(analyze_main("FOR (LET i = 0; i < 3; i = i + 1) DO print(i); END").is_ok());
    assert!(analyze_main("FOR (;;) DO END").is_ok());
    assert_eq!(
        error_name(analyze_main("FOR (LET i = 0; i < 3; i = i + 1) DO END print(i);")),
        "UnknownSymbol"
    );
    assert_eq!(
        error_name(analyze_main("FOR (;;) DO LET inner = 1; END print(inner);")),
        "UnknownSymbol"
    );
    assert_eq!(error_name(analyze_main("FOR (; 1;) DO END")), "TypeMismatch");
}

#[test]
fn test_return_type_checked() {
    let source = "
        DEF name(): String DO RETURN 1; END
        DEF main(): Integer DO RETURN 0; END
    ";
    assert_eq!(error_name(analyze_source(source)), "TypeMismatch");

    // Methods without a return type return Any
    let source = "
        DEF anything() DO RETURN 1; END
        DEF main(): Integer DO anything(); RETURN 0; END
    ";
    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_return_outside_method() {
    let source = parse_source("DEF main(): Integer DO RETURN 0; END");
    let statement = &source.methods[0].statements[0];

    let error = analyze_stmt(&mut Analyzer::new(), statement).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::UnboundReturn);
}

#[test]
fn test_integer_literal_range() {
    assert!(analyze_main("LET x = 2147483647; LET y = -2147483648;").is_ok());

    let error = analyze_main("LET x = 2147483648;").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::IntegerOverflow {
            value: "2147483648".to_string()
        }
    );

    // Too wide to even hold while parsing, still the same kind of error
    let error = crate::run_source(
        "DEF main(): Integer DO LET x = 99999999999999999999; RETURN 0; END",
        "test.plc",
    )
    .unwrap_err();
    assert_eq!(error.get_error_name(), "IntegerOverflow");
}

#[test]
fn test_typed_method_must_return() {
    let error = analyze_source(
        "DEF f(): Integer DO print(1); END DEF main(): Integer DO RETURN f() + 1; END",
    )
    .unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::TypeMismatch {
            expected: "Integer".to_string(),
            received: "Nil".to_string()
        }
    );

    assert_eq!(error_name(analyze_source("DEF main(): Integer DO print(1); END")), "TypeMismatch");
    assert_eq!(
        error_name(analyze_source(
            "DEF main(): Integer DO IF TRUE DO RETURN 1; END END"
        )),
        "TypeMismatch"
    );
    assert_eq!(
        error_name(analyze_source(
            "DEF main(): Integer DO WHILE TRUE DO RETURN 1; END END"
        )),
        "TypeMismatch"
    );
}

#[test]
fn test_typed_method_returns_on_every_path() {
    assert!(analyze_source(
        "DEF main(): Integer DO IF TRUE DO RETURN 1; ELSE print(2); RETURN 2; END END"
    )
    .is_ok());
    assert!(analyze_source(
        "DEF sign(n: Integer): Integer DO
            IF n < 0 DO RETURN -1; ELSE IF n == 0 DO RETURN 0; ELSE RETURN 1; END END
        END
        DEF main(): Integer DO RETURN sign(5); END"
    )
    .is_ok());

    // Untyped and Nil methods may fall off the end
    assert!(analyze_source("DEF show(x: Integer) DO print(x); END DEF main(): Integer DO show(1); RETURN 0; END").is_ok());
}

#[test]
fn test_binary_typing() {
    use BinaryOperator::*;

    assert_eq!(binary_type(Add, Type::Integer, Type::Integer), Some(Type::Integer));
    assert_eq!(binary_type(Add, Type::Integer, Type::String), Some(Type::String));
    assert_eq!(binary_type(Add, Type::Boolean, Type::String), Some(Type::String));
    assert_eq!(binary_type(Add, Type::Integer, Type::Decimal), None);
    assert_eq!(binary_type(Subtract, Type::Decimal, Type::Decimal), Some(Type::Decimal));
    assert_eq!(binary_type(Multiply, Type::String, Type::String), None);
    assert_eq!(binary_type(Divide, Type::Integer, Type::Integer), Some(Type::Integer));
    assert_eq!(binary_type(Divide, Type::Decimal, Type::Integer), None);
    assert_eq!(binary_type(Less, Type::Integer, Type::Integer), Some(Type::Boolean));
    assert_eq!(binary_type(Less, Type::String, Type::String), None);
    assert_eq!(binary_type(Equals, Type::Character, Type::Character), Some(Type::Boolean));
    assert_eq!(binary_type(NotEquals, Type::Integer, Type::Decimal), None);
    assert_eq!(binary_type(And, Type::Boolean, Type::Boolean), Some(Type::Boolean));
    assert_eq!(binary_type(Or, Type::Boolean, Type::Integer), None);
}

#[test]
fn test_invalid_operation_error() {
    let error = analyze_main("LET x = 1 + 1.0;").unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::InvalidOperation {
            operator: "+".to_string(),
            left: "Integer".to_string(),
            right: "Decimal".to_string()
        }
    );
}

#[test]
fn test_builtin_members() {
    assert!(analyze_main("LET n: Integer = \"abc\".length;").is_ok());
    assert!(analyze_main("LET c: Character = \"abc\".charAt(1);").is_ok());
    assert!(analyze_main("LET d: Decimal = (-3).toDecimal().abs();").is_ok());
    assert!(analyze_main("LET i: Integer = 2.5.round();").is_ok());
    assert_eq!(error_name(analyze_main("LET n = 5.length;")), "UnknownMember");
    assert_eq!(error_name(analyze_main("LET c = \"abc\".charAt(\"1\");")), "TypeMismatch");
}

#[test]
fn test_define_native() {
    let mut analyzer = Analyzer::new();
    analyzer
        .define_native("record", vec![Type::Integer], Type::Boolean)
        .unwrap();

    let source = parse_source("DEF main(): Integer DO IF record(1) DO RETURN 1; END RETURN 0; END");
    assert!(analyzer.analyze(&source).is_ok());
}

#[test]
fn test_builtin_print_is_predefined() {
    let mut analyzer = Analyzer::new();

    let print = analyzer.get_scope().borrow().lookup_function("print", 1).unwrap();
    assert_eq!(print.parameter_types, vec![Type::Any]);
    assert_eq!(print.return_type, Type::Nil);

    let error = analyzer
        .define_native("print", vec![Type::String], Type::Nil)
        .unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::DuplicateDefinition {
            name: "print/1".to_string()
        }
    );
}

#[test]
fn test_require_assignable() {
    let position = Position::null();

    assert!(require_assignable(Type::Any, Type::Nil, position.clone()).is_ok());
    assert!(require_assignable(Type::Comparable, Type::String, position.clone()).is_ok());
    assert_eq!(
        require_assignable(Type::Comparable, Type::Boolean, position)
            .unwrap_err()
            .get_impl(),
        &ErrorImpl::TypeMismatch {
            expected: "Comparable".to_string(),
            received: "Boolean".to_string()
        }
    );
}
