use super::lexer::{LexError, Span, TokenKind};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("error at position {}: {kind}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn position(&self) -> usize {
        self.span.start
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        Self::new(ParseErrorKind::Lex(e.clone()), e.span())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
    },
    ModifierWithoutDice(TokenKind),
    ZeroSidedDie,
    Lex(LexError),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token: found {}, expected ", found.as_str())?;
                fmt_expected(expected, f)
            }
            Self::ModifierWithoutDice(kind) => {
                write!(f, "{} can only be applied to dice", kind.as_str())
            }
            Self::ZeroSidedDie => f.write_str("dice must have at least one side"),
            Self::Lex(e) => fmt::Display::fmt(e, f),
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expected {
        [] => Ok(()),
        [a] => f.write_str(a.as_str()),
        [a, b] => write!(f, "{} or {}", a.as_str(), b.as_str()),
        [init @ .., last] => {
            for exp in init {
                write!(f, "{}, ", exp.as_str())?;
            }
            write!(f, "or {}", last.as_str())
        }
    }
}
