use std::{num::IntErrorKind, str::FromStr};

use rust_decimal::Decimal;

use crate::{
    ast::{
        ast::Expr,
        expressions::{AccessExpr, BinaryExpr, BinaryOperator, FunctionExpr, GroupExpr, LiteralExpr},
        types::Literal,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud_fn = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud_fn) => *nud_fn,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if token_bp <= bp {
            break;
        }

        let led_fn = match parser.get_led_lookup().get(&token_kind) {
            Some(led_fn) => *led_fn,
            None => return Err(parser.unexpected()),
        };

        left = led_fn(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();

    let literal = match token.kind {
        TokenKind::Nil => Literal::Nil,
        TokenKind::True => Literal::Boolean(true),
        TokenKind::False => Literal::Boolean(false),
        TokenKind::Integer => match token.value.parse::<i64>() {
            Ok(value) => Literal::Integer(value),
            Err(error)
                if matches!(error.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) =>
            {
                return Err(ErrorImpl::IntegerOverflow { value: token.value }.at(token.span.start))
            }
            Err(_) => {
                return Err(ErrorImpl::NumberParseError { token: token.value }.at(token.span.start))
            }
        },
        TokenKind::Decimal => match Decimal::from_str(&token.value) {
            Ok(value) => Literal::Decimal(value),
            Err(_) => {
                return Err(ErrorImpl::NumberParseError { token: token.value }.at(token.span.start))
            }
        },
        TokenKind::Character => match token.value.chars().next() {
            Some(value) => Literal::Character(value),
            None => return Err(parser.unexpected()),
        },
        TokenKind::String => Literal::String(token.value),
        TokenKind::Identifier => return parse_symbol_expr(parser, None),
        _ => return Err(parser.unexpected()),
    };

    parser.advance();
    Ok(Expr::Literal(LiteralExpr {
        id: parser.advance_id(),
        literal,
        span: token.span,
    }))
}

/// Parses `name` or `name(args)`, optionally hanging off a receiver.
fn parse_symbol_expr(parser: &mut Parser, receiver: Option<Expr>) -> Result<Expr, Error> {
    let start = match &receiver {
        Some(receiver) => receiver.get_span().start.clone(),
        None => parser.get_position(),
    };
    let name = parser.expect_identifier("expected identifier")?;
    let receiver = receiver.map(Box::new);

    if parser.current_token_kind() != TokenKind::OpenParen {
        return Ok(Expr::Access(AccessExpr {
            id: parser.advance_id(),
            receiver,
            name,
            span: parser.span_from(start),
        }));
    }

    let arguments = parse_arguments(parser)?;

    Ok(Expr::Function(FunctionExpr {
        id: parser.advance_id(),
        receiver,
        name,
        arguments,
        span: parser.span_from(start),
    }))
}

fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut arguments = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        arguments.push(parse_expr(parser, BindingPower::Default)?);
        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            arguments.push(parse_expr(parser, BindingPower::Default)?);
        }
    }

    let error = parser.unexpected_detailed("expected `,` or `)` in argument list");
    parser.expect_error(TokenKind::CloseParen, Some(error))?;

    Ok(arguments)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match BinaryOperator::from_token(operator_token.kind) {
        Some(operator) => operator,
        None => {
            return Err(ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            }
            .at(operator_token.span.start))
        }
    };

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        id: parser.advance_id(),
        span: Span {
            start: left.get_span().start.clone(),
            end: right.get_span().end.clone(),
        },
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    let expression = parse_expr(parser, BindingPower::Default)?;

    let error = parser.unexpected_detailed("expected `)` to close group");
    parser.expect_error(TokenKind::CloseParen, Some(error))?;

    Ok(Expr::Group(GroupExpr {
        id: parser.advance_id(),
        expression: Box::new(expression),
        span: parser.span_from(start),
    }))
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    parse_symbol_expr(parser, Some(left))
}
