use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

impl RegexPattern {
    fn new(pattern: &str, handler: RegexHandler) -> Self {
        RegexPattern {
            // Every pattern is anchored to the current lexer position.
            regex: Regex::new(&format!("^(?:{})", pattern)).expect("lexer pattern is valid"),
            handler,
        }
    }
}

lazy_static! {
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern::new("\\s+", skip_handler),
        RegexPattern::new("//[^\\n]*", skip_handler),
        RegexPattern::new("[A-Za-z_][A-Za-z0-9_]*", symbol_handler),
        RegexPattern::new("[0-9]+(\\.[0-9]+)?", number_handler),
        RegexPattern::new("'(\\\\.|[^'\\\\\\n\\r])*'?", character_handler),
        RegexPattern::new("\"(\\\\.|[^\"\\\\\\n\\r])*\"?", string_handler),
        RegexPattern::new("&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        RegexPattern::new("\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        RegexPattern::new("==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        RegexPattern::new("!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        RegexPattern::new("<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        RegexPattern::new(">=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        RegexPattern::new("<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        RegexPattern::new(">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        RegexPattern::new("=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        RegexPattern::new("\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        RegexPattern::new("-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        RegexPattern::new("\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        RegexPattern::new("/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        RegexPattern::new("\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        RegexPattern::new("\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        RegexPattern::new(",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        RegexPattern::new(";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        RegexPattern::new(":", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        RegexPattern::new("\\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            source,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Rc::clone(&self.file))
    }

    /// Span covering the next `length` bytes of input.
    pub fn span_of(&self, length: usize) -> Span {
        Span {
            start: self.position(),
            end: Position((self.pos + length) as u32, Rc::clone(&self.file)),
        }
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Pops a sign token that belongs to a numeric literal starting here.
    ///
    /// The sign must touch the number and must not follow an operand,
    /// so `a-1` stays a subtraction while `f(-1)` reads a negative literal.
    fn take_sign(&mut self) -> Option<Token> {
        let sign = self.tokens.last()?;
        if !matches!(sign.kind, TokenKind::Plus | TokenKind::Dash)
            || sign.span.end.0 as usize != self.pos
        {
            return None;
        }

        let follows_operand = self
            .tokens
            .len()
            .checked_sub(2)
            .and_then(|index| self.tokens.get(index))
            .is_some_and(|previous| previous.kind.ends_operand());

        if follows_operand {
            None
        } else {
            self.tokens.pop()
        }
    }
}

fn matched_len(lexer: &Lexer, regex: &Regex) -> usize {
    regex.find(lexer.remainder()).map_or(0, |found| found.end())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let length = matched_len(lexer, regex);
    lexer.advance_n(length);
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let length = matched_len(lexer, regex);
    let value = lexer.remainder()[..length].to_string();
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let span = lexer.span_of(length);
    lexer.push(MK_TOKEN!(kind, value, span));
    lexer.advance_n(length);
    Ok(())
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let length = matched_len(lexer, regex);
    let digits = lexer.remainder()[..length].to_string();
    let kind = if digits.contains('.') {
        TokenKind::Decimal
    } else {
        TokenKind::Integer
    };

    let mut span = lexer.span_of(length);
    let value = match lexer.take_sign() {
        Some(sign) => {
            span.start = sign.span.start;
            format!("{}{}", sign.value, digits)
        }
        None => digits,
    };

    lexer.push(MK_TOKEN!(kind, value, span));
    lexer.advance_n(length);
    Ok(())
}

fn character_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let length = matched_len(lexer, regex);
    let raw = lexer.remainder()[..length].to_string();

    if length < 2 || !raw.ends_with('\'') {
        return Err(ErrorImpl::UnexpectedTokenDetailed {
            token: raw,
            message: String::from("unterminated character literal"),
        }
        .at(lexer.position()));
    }

    let value = unescape(&raw[1..length - 1], lexer.position())?;
    if value.chars().count() != 1 {
        return Err(ErrorImpl::UnexpectedTokenDetailed {
            token: raw,
            message: String::from("character literals hold exactly one character"),
        }
        .at(lexer.position()));
    }

    let span = lexer.span_of(length);
    lexer.push(MK_TOKEN!(TokenKind::Character, value, span));
    lexer.advance_n(length);
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let length = matched_len(lexer, regex);
    let raw = lexer.remainder()[..length].to_string();

    if length < 2 || !raw.ends_with('"') {
        return Err(ErrorImpl::UnexpectedTokenDetailed {
            token: raw,
            message: String::from("unterminated string literal"),
        }
        .at(lexer.position()));
    }

    let value = unescape(&raw[1..length - 1], lexer.position())?;

    let span = lexer.span_of(length);
    lexer.push(MK_TOKEN!(TokenKind::String, value, span));
    lexer.advance_n(length);
    Ok(())
}

fn unescape(literal: &str, position: Position) -> Result<String, Error> {
    let mut result = String::new();
    let mut chars = literal.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('b') => result.push('\u{8}'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\'') => result.push('\''),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            other => {
                return Err(ErrorImpl::UnexpectedTokenDetailed {
                    token: format!("\\{}", other.map(String::from).unwrap_or_default()),
                    message: String::from("invalid escape sequence"),
                }
                .at(position))
            }
        }
    }

    Ok(result)
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                let token = lex.remainder().chars().next().map(String::from).unwrap_or_default();
                return Err(ErrorImpl::UnrecognisedToken { token }.at(lex.position()));
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}
