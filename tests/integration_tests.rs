//! End-to-end tests: source text through tokenizing, parsing, analysis and
//! interpretation.

use std::{cell::RefCell, path::Path, rc::Rc};

use plc::{
    analyzer::analyzer::analyze,
    display_error,
    environment::Value,
    errors::errors::{Error, ErrorImpl},
    interpreter::interpreter::Interpreter,
    lexer::lexer::tokenize,
    parser::parser::parse,
    run_source,
};
use pretty_assertions::assert_eq;

/// Runs `source` through the full pipeline, capturing `print` output.
fn run_captured(source: &str) -> Result<(Value, String), Error> {
    let tokens = tokenize(source.to_string(), Some("main.plc".to_string()))?;
    let ast = parse(tokens, Rc::new("main.plc".to_string()))?;
    analyze(&ast)?;

    let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
    let value = Interpreter::with_output(buffer.clone()).run(&ast)?;
    let output = String::from_utf8(buffer.borrow().clone()).unwrap();

    Ok((value, output))
}

fn error_name(source: &str) -> String {
    run_source(source, "main.plc")
        .unwrap_err()
        .get_error_name()
        .to_string()
}

#[test]
fn test_main_return_value() {
    let value = run_source("DEF main(): Integer DO RETURN 1 + 2; END", "main.plc").unwrap();
    assert_eq!(value, Value::Integer(3));
}

#[test]
fn test_uninitialized_constant_field() {
    let error = run_source(
        "LET CONST LIMIT: Integer; DEF main(): Integer DO RETURN 0; END",
        "main.plc",
    )
    .unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UninitializedConstant {
            name: "LIMIT".to_string()
        }
    );
}

#[test]
fn test_constant_reassignment() {
    let error = run_source(
        "LET CONST x: Integer = 5; DEF main(): Integer DO x = 6; RETURN x; END",
        "main.plc",
    )
    .unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::ConstantViolation {
            name: "x".to_string()
        }
    );
}

#[test]
fn test_fizz_buzz() {
    let source = r#"
        DEF divides(n: Integer, d: Integer): Boolean DO
            RETURN n - n / d * d == 0;
        END

        DEF main(): Integer DO
            FOR (LET i = 1; i <= 15; i = i + 1) DO
                IF divides(i, 15) DO
                    print("FizzBuzz");
                ELSE
                    IF divides(i, 3) DO
                        print("Fizz");
                    ELSE
                        IF divides(i, 5) DO
                            print("Buzz");
                        ELSE
                            print(i);
                        END
                    END
                END
            END
            RETURN 0;
        END
    "#;

    let (value, output) = run_captured(source).unwrap();

    assert_eq!(value, Value::Integer(0));
    assert_eq!(
        output,
        "1\n2\nFizz\n4\nBuzz\nFizz\n7\n8\nFizz\nBuzz\n11\nFizz\n13\n14\nFizzBuzz\n"
    );
}

#[test]
fn test_fields_shared_between_methods() {
    let source = r#"
        LET counter: Integer = 0;
        LET CONST STEP: Integer = 2;

        DEF bump() DO
            counter = counter + STEP;
        END

        DEF main(): Integer DO
            LET i = 0;
            WHILE i < 3 DO
                bump();
                i = i + 1;
            END
            RETURN counter;
        END
    "#;

    let (value, _) = run_captured(source).unwrap();
    assert_eq!(value, Value::Integer(6));
}

#[test]
fn test_recursion_and_string_members() {
    let source = r#"
        DEF fib(n: Integer): Integer DO
            IF n < 2 DO RETURN n; END
            RETURN fib(n - 1) + fib(n - 2);
        END

        DEF main(): Integer DO
            LET name = "plc";
            print(name + " " + fib(10));
            print(name.charAt(1));
            print(2.5.round());
            RETURN name.length;
        END
    "#;

    let (value, output) = run_captured(source).unwrap();

    assert_eq!(value, Value::Integer(3));
    assert_eq!(output, "plc 55\nl\n3\n");
}

#[test]
fn test_decimal_arithmetic() {
    let source = r#"
        DEF main(): Integer DO
            LET total: Decimal = 0.0;
            FOR (LET i = 0; i < 4; i = i + 1) DO
                total = total + 0.5;
            END
            print(total / 3.0);
            RETURN 0;
        END
    "#;

    let (_, output) = run_captured(source).unwrap();
    assert_eq!(output, "0.7\n");
}

#[test]
fn test_analysis_rejects_before_running() {
    // The print would run first if the interpreter ever saw this program.
    let source = r#"
        DEF main(): Integer DO
            print(1);
            RETURN TRUE;
        END
    "#;

    let error = run_captured(source).unwrap_err();
    assert_eq!(error.get_error_name(), "TypeMismatch");
}

#[test]
fn test_errors_by_stage() {
    assert_eq!(error_name("DEF main(): Integer DO RETURN #; END"), "UnrecognisedToken");
    assert_eq!(error_name("DEF main(): Integer DO RETURN 1 END"), "UnexpectedToken");
    assert_eq!(error_name("DEF main() DO END"), "MissingEntryPoint");
    assert_eq!(error_name("DEF main(): Integer DO print(1); END"), "TypeMismatch");
    assert_eq!(
        error_name("DEF main(): Integer DO RETURN 99999999999999999999; END"),
        "IntegerOverflow"
    );
    assert_eq!(error_name("DEF main(): Integer DO RETURN y; END"), "UnknownSymbol");
    assert_eq!(error_name("DEF main(): Integer DO RETURN 1 / 0; END"), "DivisionByZero");
    assert_eq!(
        error_name("DEF main(): Integer DO RETURN 2147483647 + 1; END"),
        "IntegerOverflow"
    );
}

#[test]
fn test_display_error() {
    let content = "DEF main(): Integer DO\n    RETURN y;\nEND\n";
    let error = run_source(content, "main.plc").unwrap_err();

    let mut out = Vec::new();
    display_error(&error, Path::new("main.plc"), content, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Error: UnknownSymbol (`y` is not defined)\n\
         -> main.plc\n  |\n\
         2 | RETURN y;\n  \
         | -------^\n"
    );
}
