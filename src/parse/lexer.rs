use crate::common::*;
use logos::Logos;
use std::fmt;

pub type Span = logos::Span;

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+", |lex| lex.slice().parse())]
    Number(Int),

    #[regex(r"[dD]")]
    D,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,

    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,

    #[token("kh")]
    KeepHigh,
    #[token("kl")]
    KeepLow,
    #[token("dh")]
    DropHigh,
    #[token("dl")]
    DropLow,
    #[token("r")]
    Reroll,
    #[token("ro")]
    RerollOnce,
    #[token("!")]
    Explode,
    #[token("!o")]
    ExplodeOnce,
    #[token("x")]
    Limit,
    #[token("adv")]
    Advantage,
    #[token("dis")]
    Disadvantage,
    #[token("s")]
    Success,
    #[token("f")]
    Failure,
    #[token("cs")]
    Critical,
    #[token("cf")]
    Fumble,

    Eof,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Number(_) => "<number>",
            D => "'d'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            LeftParen => "'('",
            RightParen => "')'",
            LessThan => "'<'",
            GreaterThan => "'>'",
            LessEqual => "'<='",
            GreaterEqual => "'>='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            KeepHigh => "'kh'",
            KeepLow => "'kl'",
            DropHigh => "'dh'",
            DropLow => "'dl'",
            Reroll => "'r'",
            RerollOnce => "'ro'",
            Explode => "'!'",
            ExplodeOnce => "'!o'",
            Limit => "'x'",
            Advantage => "'adv'",
            Disadvantage => "'dis'",
            Success => "'s'",
            Failure => "'f'",
            Critical => "'cs'",
            Fumble => "'cf'",
            Eof => "<end of input>",
            Error => "<error>",
        }
    }

    pub const fn is_modifier(&self) -> bool {
        use TokenKind::*;

        matches!(
            self,
            KeepHigh
                | KeepLow
                | DropHigh
                | DropLow
                | Reroll
                | RerollOnce
                | Explode
                | ExplodeOnce
                | Advantage
                | Disadvantage
                | Success
                | Failure
                | Critical
                | Fumble
        )
    }

    pub fn as_binary_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            _ => return None,
        })
    }

    pub fn as_comparison_op(&self) -> Option<ComparisonOperator> {
        use ComparisonOperator::*;
        Some(match self {
            Self::LessThan => Lt,
            Self::GreaterThan => Gt,
            Self::LessEqual => Le,
            Self::GreaterEqual => Ge,
            Self::EqualEqual => Eq,
            Self::BangEqual => Ne,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => write!(f, "{}", x),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum LexError {
    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedChar { position: usize, found: char },
    #[error("number at position {} is too large", .span.start)]
    NumberTooLarge { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar { position, found } => *position..*position + found.len_utf8(),
            Self::NumberTooLarge { span } => span.clone(),
        }
    }
}

/// Lazily turns source text into tokens, ending with a single [`TokenKind::Eof`].
///
/// The sequence stops after the first error.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            finished: false,
        }
    }

    fn error(&self) -> LexError {
        let span = self.inner.span();
        let slice = self.inner.slice();
        match slice.chars().next() {
            Some(c) if c.is_ascii_digit() => LexError::NumberTooLarge { span },
            Some(found) => LexError::UnexpectedChar {
                position: span.start,
                found,
            },
            None => LexError::UnexpectedChar {
                position: span.start,
                found: char::REPLACEMENT_CHARACTER,
            },
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let item = match self.inner.next() {
            Some(TokenKind::Error) => {
                self.finished = true;
                Err(self.error())
            }
            Some(kind) => Ok(Token {
                kind,
                span: self.inner.span(),
            }),
            None => {
                self.finished = true;
                let end = self.inner.source().len();
                Ok(Token {
                    kind: TokenKind::Eof,
                    span: end..end,
                })
            }
        };
        Some(item)
    }
}

pub fn lexer(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}
