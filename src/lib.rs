#![allow(clippy::module_inception)]

use std::{fmt::Display, io::Write, path::Path, rc::Rc};

use crate::{
    analyzer::analyzer::analyze,
    environment::Value,
    errors::errors::{Error, ErrorTip},
    interpreter::interpreter::Interpreter,
    lexer::lexer::tokenize,
    parser::parser::parse,
};

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod environment;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.1, self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Runs the whole pipeline on `source`: tokenize, parse, analyze, then
/// interpret, returning the value produced by `main`.
pub fn run_source(source: &str, file: &str) -> Result<Value, Error> {
    let tokens = tokenize(source.to_string(), Some(file.to_string()))?;
    let ast = parse(tokens, Rc::new(file.to_string()))?;
    analyze(&ast)?;
    Interpreter::new().run(&ast)
}

/// Finds the line containing the byte offset `position`.
///
/// Returns the 1-based line number, the line text and the offset within it.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        start = end;
        line_number += 1;
    }

    // Offset of the EOF token, one past the last character.
    content
        .split_inclusive('\n')
        .last()
        .map(|line| (line_number - 1, line.to_string(), line.len()))
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let content = "Hello, world!\nsecond\nthird\nTesting { }\n";

        let (line_number, line, line_pos) = super::get_line_at_position(content, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(content, 35).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);
    }

    #[test]
    fn test_get_line_past_end() {
        assert!(super::get_line_at_position("abc", 10).is_none());
    }

    #[test]
    fn test_run_source_returns_main_value() {
        let value = super::run_source("DEF main(): Integer DO RETURN 1 + 2; END", "test.plc");
        assert_eq!(value.unwrap(), super::Value::Integer(3));
    }
}

pub fn display_error(
    error: &Error,
    file: &Path,
    content: &str,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    /*
        Error: name (tip)
        -> main.plc
           |
        20 | LET a = #;
           | --------^
    */

    if let ErrorTip::None = error.get_tip() {
        writeln!(out, "Error: {}", error.get_error_name())?;
    } else {
        writeln!(out, "Error: {} ({})", error.get_error_name(), error.get_tip())?;
    }
    writeln!(out, "-> {}", file.as_os_str().to_string_lossy())?;

    let Some((line, line_text, line_pos)) = get_line_at_position(content, error.get_position().0)
    else {
        return Ok(());
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    writeln!(out, "{:>padding$}", "|")?;

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    writeln!(out, "{} | {}", line_string, line_text_removed.trim_end())?;

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    writeln!(out, "{:>padding$} {:->arrows$}", "|", "^")
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ' || *c == '\t').count();

    (String::from(&string[start..]), start)
}
