use crate::{
    ast::{
        ast::{Expr, Field, Method, Stmt},
        statements::{
            AssignmentStmt, DeclarationStmt, ExpressionStmt, ForStmt, IfStmt, ReturnStmt, WhileStmt,
        },
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::parser::Parser;

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(stmt_fn) = parser.get_stmt_lookup().get(&parser.current_token_kind()) {
        let stmt_fn = *stmt_fn;
        return stmt_fn(parser);
    }

    let stmt = parse_simple_stmt(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(stmt)
}

/// A declaration, assignment or bare expression, without the trailing `;`.
///
/// These are the only statements allowed in a FOR header.
fn parse_simple_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if parser.current_token_kind() == TokenKind::Let {
        return parse_declaration(parser);
    }

    let expression = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() != TokenKind::Assignment {
        return Ok(Stmt::Expression(ExpressionStmt {
            span: expression.get_span().clone(),
            expression,
        }));
    }

    parser.advance();
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::Assignment(AssignmentStmt {
        span: Span {
            start: expression.get_span().start.clone(),
            end: value.get_span().end.clone(),
        },
        receiver: expression,
        value,
    }))
}

fn parse_declaration(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::Let)?.span.start;
    let name = parser.expect_identifier("expected identifier during variable declaration")?;

    let type_name = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parser.expect_identifier("expected type name after `:`")?)
    } else {
        None
    };

    let value = parse_initializer(parser)?;

    Ok(Stmt::Declaration(DeclarationStmt {
        id: parser.advance_id(),
        name,
        type_name,
        value,
        span: parser.span_from(start),
    }))
}

fn parse_initializer(parser: &mut Parser) -> Result<Option<Expr>, Error> {
    if parser.current_token_kind() != TokenKind::Assignment {
        return Ok(None);
    }

    parser.advance();
    Ok(Some(parse_expr(parser, BindingPower::Default)?))
}

/// Parses statements until one of `terminators` (not consumed) is reached.
fn parse_block(parser: &mut Parser, terminators: &[TokenKind]) -> Result<Vec<Stmt>, Error> {
    let mut statements = vec![];

    while !terminators.contains(&parser.current_token_kind()) {
        if !parser.has_tokens() {
            return Err(parser.unexpected_detailed("expected `END` to close block"));
        }
        statements.push(parse_stmt(parser)?);
    }

    Ok(statements)
}

pub fn parse_declaration_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let declaration = parse_declaration(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(declaration)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Do)?;
    let then_statements = parse_block(parser, &[TokenKind::Else, TokenKind::End])?;

    let mut else_statements = vec![];
    if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        // `ELSE DO` is accepted as well as a bare `ELSE`
        if parser.current_token_kind() == TokenKind::Do {
            parser.advance();
        }
        else_statements = parse_block(parser, &[TokenKind::End])?;
    }

    parser.expect(TokenKind::End)?;

    Ok(Stmt::If(IfStmt {
        condition,
        then_statements,
        else_statements,
        span: parser.span_from(start),
    }))
}

pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect(TokenKind::OpenParen)?;

    let initialization = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(Box::new(parse_simple_stmt(parser)?))
    } else {
        None
    };
    parser.expect(TokenKind::Semicolon)?;

    let condition = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };
    parser.expect(TokenKind::Semicolon)?;

    let increment = if parser.current_token_kind() != TokenKind::CloseParen {
        Some(Box::new(parse_simple_stmt(parser)?))
    } else {
        None
    };
    parser.expect(TokenKind::CloseParen)?;

    parser.expect(TokenKind::Do)?;
    let statements = parse_block(parser, &[TokenKind::End])?;
    parser.expect(TokenKind::End)?;

    Ok(Stmt::For(ForStmt {
        initialization,
        condition,
        increment,
        statements,
        span: parser.span_from(start),
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Do)?;
    let statements = parse_block(parser, &[TokenKind::End])?;
    parser.expect(TokenKind::End)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        statements,
        span: parser.span_from(start),
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: parser.span_from(start),
    }))
}

/// `LET CONST? name: Type (= value)?;` at the top level.
pub fn parse_field(parser: &mut Parser) -> Result<Field, Error> {
    let start = parser.expect(TokenKind::Let)?.span.start;

    let constant = parser.current_token_kind() == TokenKind::Const;
    if constant {
        parser.advance();
    }

    let name = parser.expect_identifier("expected identifier during field declaration")?;
    let error = parser.unexpected_detailed("fields require an explicit type");
    parser.expect_error(TokenKind::Colon, Some(error))?;
    let type_name = parser.expect_identifier("expected type name after `:`")?;

    let value = parse_initializer(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Field {
        id: parser.advance_id(),
        name,
        type_name,
        constant,
        value,
        span: parser.span_from(start),
    })
}

pub fn parse_method(parser: &mut Parser) -> Result<Method, Error> {
    let start = parser.expect(TokenKind::Def)?.span.start;
    let name = parser.expect_identifier("expected method name after `DEF`")?;

    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = vec![];
    let mut parameter_type_names = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        if !parameters.is_empty() {
            let error = parser.unexpected_detailed("expected `,` or `)` in parameter list");
            parser.expect_error(TokenKind::Comma, Some(error))?;
        }

        parameters.push(parser.expect_identifier("expected parameter name")?);
        let error = parser.unexpected_detailed("parameters require an explicit type");
        parser.expect_error(TokenKind::Colon, Some(error))?;
        parameter_type_names.push(parser.expect_identifier("expected parameter type")?);
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type_name = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parser.expect_identifier("expected return type after `:`")?)
    } else {
        None
    };

    parser.expect(TokenKind::Do)?;
    let statements = parse_block(parser, &[TokenKind::End])?;
    parser.expect(TokenKind::End)?;

    Ok(Method {
        id: parser.advance_id(),
        name,
        parameters,
        parameter_type_names,
        return_type_name,
        statements,
        span: parser.span_from(start),
    })
}
