use super::{
    ast::*,
    error::{ParseError, ParseErrorKind},
    lexer::*,
};
use crate::common::*;
use crate::ops::{self, Modifier};

type PResult<T = Node> = Result<T, ParseError>;

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    prev_end: usize,
    len: usize,
}

impl<'a> Parser<'a> {
    /// Stands in for any number in "expected" lists.
    const NUMBER: TokenKind = TokenKind::Number(0);

    const PREDICATE_START: &'static [TokenKind] = &[
        Self::NUMBER,
        TokenKind::LessThan,
        TokenKind::GreaterThan,
        TokenKind::LessEqual,
        TokenKind::GreaterEqual,
        TokenKind::EqualEqual,
    ];

    pub fn new(source: &'a str) -> PResult<Self> {
        let mut parser = Self {
            lexer: lexer(source),
            current: Token {
                kind: TokenKind::Eof,
                span: 0..0,
            },
            prev_end: 0,
            len: source.len(),
        };
        parser.bump()?;
        Ok(parser)
    }

    pub fn parse(mut self) -> PResult {
        let root = self.parse_comparison()?;
        match self.current.kind {
            TokenKind::Eof => Ok(root),
            _ => self.unexpected(vec![TokenKind::Eof]),
        }
    }

    /// Moves to the next token, returning the one just passed.
    fn bump(&mut self) -> PResult<Token> {
        let next = match self.lexer.next() {
            Some(token) => token?,
            None => Token {
                kind: TokenKind::Eof,
                span: self.len..self.len,
            },
        };
        self.prev_end = self.current.span.end;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.current.kind == kind {
            self.bump()
        } else {
            self.unexpected(vec![kind])
        }
    }

    fn expect_number(&mut self) -> PResult<Int> {
        match self.current.kind {
            TokenKind::Number(n) => {
                self.bump()?;
                Ok(n)
            }
            _ => self.unexpected(vec![Self::NUMBER]),
        }
    }

    fn unexpected<T>(&self, expected: Vec<TokenKind>) -> PResult<T> {
        Err(ParseError::new(
            ParseErrorKind::UnexpectedToken {
                found: self.current.kind,
                expected,
            },
            self.current.span.clone(),
        ))
    }

    fn reject_modifier(&self) -> PResult<()> {
        if self.current.kind.is_modifier() {
            Err(ParseError::new(
                ParseErrorKind::ModifierWithoutDice(self.current.kind),
                self.current.span.clone(),
            ))
        } else {
            Ok(())
        }
    }

    fn parse_comparison(&mut self) -> PResult {
        let lhs = self.parse_expr()?;

        match self.current.kind.as_comparison_op() {
            Some(op) => {
                self.bump()?;
                let rhs = self.parse_expr()?;
                Ok(Node::Comparison(Box::new(lhs), op, Box::new(rhs)))
            }
            None => Ok(lhs),
        }
    }

    fn parse_binary(&mut self, precedence: u8, operand: fn(&mut Self) -> PResult) -> PResult {
        let mut lhs = operand(self)?;

        while let Some(op) = self
            .current
            .kind
            .as_binary_op()
            .filter(|op| op.precedence() == precedence)
        {
            self.bump()?;
            let rhs = operand(self)?;
            lhs = Node::Binary(Box::new(lhs), op, Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_expr(&mut self) -> PResult {
        self.parse_binary(1, Self::parse_term)
    }

    fn parse_term(&mut self) -> PResult {
        self.parse_binary(2, Self::parse_factor)
    }

    fn parse_factor(&mut self) -> PResult {
        if self.current.kind == TokenKind::Minus {
            self.bump()?;
            let operand = self.parse_factor()?;
            Ok(Node::Unary(UnaryOperator::Neg, Box::new(operand)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> PResult {
        match self.current.kind {
            TokenKind::Number(n) => {
                self.bump()?;
                if self.current.kind == TokenKind::D {
                    self.parse_dice(n)
                } else {
                    self.reject_modifier()?;
                    Ok(Node::Literal(n))
                }
            }
            TokenKind::D => self.parse_dice(1),
            TokenKind::LeftParen => {
                self.bump()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen)?;
                self.reject_modifier()?;
                Ok(inner)
            }
            _ => self.unexpected(vec![
                Self::NUMBER,
                TokenKind::D,
                TokenKind::LeftParen,
                TokenKind::Minus,
            ]),
        }
    }

    fn parse_dice(&mut self, count: Int) -> PResult {
        self.expect(TokenKind::D)?;
        let sides_span = self.current.span.clone();
        let sides = self.expect_number()?;
        if sides == 0 {
            return Err(ParseError::new(ParseErrorKind::ZeroSidedDie, sides_span));
        }

        let mut modifiers = Vec::new();
        while self.current.kind.is_modifier() {
            modifiers.push(self.parse_modifier()?);
        }

        Ok(Node::Dice(DiceTerm::new(count, sides, modifiers)))
    }

    fn parse_modifier(&mut self) -> PResult<Modifier> {
        let token = self.bump()?;

        Ok(match token.kind {
            TokenKind::KeepHigh => ops::KeepHighest(self.optional_count()?).into(),
            TokenKind::KeepLow => ops::KeepLowest(self.optional_count()?).into(),
            TokenKind::DropHigh => ops::DropHighest(self.optional_count()?).into(),
            TokenKind::DropLow => ops::DropLowest(self.optional_count()?).into(),
            TokenKind::Reroll => ops::Reroll {
                predicate: self.parse_predicate()?,
                max_rerolls: self.parse_limit(ops::Reroll::DEFAULT_LIMIT)?,
            }
            .into(),
            TokenKind::RerollOnce => ops::Reroll {
                predicate: self.parse_predicate()?,
                max_rerolls: self.parse_limit(1)?,
            }
            .into(),
            TokenKind::Explode => ops::Explode {
                predicate: self.adjacent_predicate()?,
                max_explosions: self.parse_limit(ops::Explode::DEFAULT_LIMIT)?,
            }
            .into(),
            TokenKind::ExplodeOnce => ops::Explode {
                predicate: self.adjacent_predicate()?,
                max_explosions: self.parse_limit(1)?,
            }
            .into(),
            TokenKind::Advantage => ops::Advantage.into(),
            TokenKind::Disadvantage => ops::Disadvantage.into(),
            TokenKind::Success => ops::CountSuccesses(self.parse_predicate()?).into(),
            TokenKind::Failure => ops::CountFailures(self.parse_predicate()?).into(),
            TokenKind::Critical => ops::Critical(self.adjacent_predicate()?).into(),
            TokenKind::Fumble => ops::Fumble(self.adjacent_predicate()?).into(),
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken {
                        found: token.kind,
                        expected: vec![],
                    },
                    token.span,
                ))
            }
        })
    }

    fn optional_count(&mut self) -> PResult<Int> {
        match self.current.kind {
            TokenKind::Number(n) => {
                self.bump()?;
                Ok(n)
            }
            _ => Ok(1),
        }
    }

    fn parse_limit(&mut self, default: Int) -> PResult<Int> {
        if self.current.kind == TokenKind::Limit {
            self.bump()?;
            self.expect_number()
        } else {
            Ok(default)
        }
    }

    fn parse_predicate(&mut self) -> PResult<Predicate> {
        let make: fn(Int) -> Predicate = match self.current.kind {
            TokenKind::Number(n) => {
                self.bump()?;
                return Ok(Predicate::Equal(n));
            }
            TokenKind::LessThan => Predicate::Less,
            TokenKind::GreaterThan => Predicate::Greater,
            TokenKind::LessEqual => Predicate::LessOrEqual,
            TokenKind::GreaterEqual => Predicate::GreaterOrEqual,
            TokenKind::EqualEqual => Predicate::Equal,
            _ => return self.unexpected(Self::PREDICATE_START.to_vec()),
        };
        self.bump()?;
        Ok(make(self.expect_number()?))
    }

    /// A predicate that is optional only counts when written directly against
    /// the keyword before it, so `3d6! > 10` stays a comparison.
    fn adjacent_predicate(&mut self) -> PResult<Option<Predicate>> {
        let starts_predicate = match self.current.kind {
            TokenKind::Number(_) => true,
            kind => Self::PREDICATE_START.contains(&kind),
        };

        if starts_predicate && self.current.span.start == self.prev_end {
            self.parse_predicate().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::parse::lexer::LexError;
    use BinaryOperator::*;

    fn parse(s: &str) -> PResult {
        Parser::new(s)?.parse()
    }

    fn check(s: &str, expected: Node) {
        assert_eq!(parse(s), Ok(expected), "parsing {:?}", s);
    }

    fn check_err(s: &str, kind: ParseErrorKind, span: Span) {
        assert_eq!(parse(s), Err(ParseError::new(kind, span)), "parsing {:?}", s);
    }

    #[test]
    fn test_parse_nums() {
        check("32", Node::int(32));
        check("(7)", Node::int(7));
    }

    #[test]
    fn test_parse_dice() {
        check("1d20", Node::dice(1, 20));
        check("d4", Node::dice(1, 4));
        check("3D8", Node::dice(3, 8));
        check("0d6", Node::dice(0, 6));
        check("4d6kh3", Node::op_dice(4, 6, vec![KeepHighest(3).into()]));
        check(
            "8d6kldh2dl",
            Node::op_dice(
                8,
                6,
                vec![
                    KeepLowest(1).into(),
                    DropHighest(2).into(),
                    DropLowest(1).into(),
                ],
            ),
        );
        check("1d20adv", Node::op_dice(1, 20, vec![Advantage.into()]));
        check("1d20dis", Node::op_dice(1, 20, vec![Disadvantage.into()]));
    }

    #[test]
    fn test_parse_reroll() {
        check(
            "2d6r1",
            Node::op_dice(2, 6, vec![Reroll::new(Predicate::Equal(1)).into()]),
        );
        check(
            "2d6r<3x2",
            Node::op_dice(2, 6, vec![Reroll::new(Predicate::Less(3)).limit(2).into()]),
        );
        check(
            "2d6ro==2",
            Node::op_dice(2, 6, vec![Reroll::once(Predicate::Equal(2)).into()]),
        );
    }

    #[test]
    fn test_parse_explode() {
        check("3d6!", Node::op_dice(3, 6, vec![Explode::new(None).into()]));
        check(
            "3d6!>5",
            Node::op_dice(3, 6, vec![Explode::new(Some(Predicate::Greater(5))).into()]),
        );
        check(
            "3d6!ox4",
            Node::op_dice(3, 6, vec![Explode::once(None).limit(4).into()]),
        );
        check(
            "3d6! > 10",
            Node::cmp(
                Node::op_dice(3, 6, vec![Explode::new(None).into()]),
                ComparisonOperator::Gt,
                Node::int(10),
            ),
        );
    }

    #[test]
    fn test_parse_success_counting() {
        check(
            "5d10s>=7f1",
            Node::op_dice(
                5,
                10,
                vec![
                    CountSuccesses(Predicate::GreaterOrEqual(7)).into(),
                    CountFailures(Predicate::Equal(1)).into(),
                ],
            ),
        );
        check(
            "1d20cscf<=2",
            Node::op_dice(
                1,
                20,
                vec![
                    Critical(None).into(),
                    Fumble(Some(Predicate::LessOrEqual(2))).into(),
                ],
            ),
        );
    }

    #[test]
    fn test_parse_unary() {
        check("-2", Node::neg(Node::int(2)));
        check("-2d6", Node::neg(Node::dice(2, 6)));
        check("- - 1", Node::neg(Node::neg(Node::int(1))));
    }

    #[test]
    fn test_parse_binary() {
        check(
            "2d6+3",
            Node::bin(Node::dice(2, 6), Add, Node::int(3)),
        );
        check(
            "1 - 2 - 3",
            Node::bin(Node::bin(Node::int(1), Sub, Node::int(2)), Sub, Node::int(3)),
        );
        check(
            "1 + 2 * 3",
            Node::bin(Node::int(1), Add, Node::bin(Node::int(2), Mul, Node::int(3))),
        );
        check(
            "(1 + 2) / -3",
            Node::bin(
                Node::bin(Node::int(1), Add, Node::int(2)),
                Div,
                Node::neg(Node::int(3)),
            ),
        );
    }

    #[test]
    fn test_parse_comparison() {
        check(
            "1d20 + 5 >= 15",
            Node::cmp(
                Node::bin(Node::dice(1, 20), Add, Node::int(5)),
                ComparisonOperator::Ge,
                Node::int(15),
            ),
        );
        check_err(
            "1 < 2 < 3",
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::LessThan,
                expected: vec![TokenKind::Eof],
            },
            6..7,
        );
    }

    #[test]
    fn test_parse_errors() {
        check_err("1d0", ParseErrorKind::ZeroSidedDie, 2..3);
        check_err(
            "3kh1",
            ParseErrorKind::ModifierWithoutDice(TokenKind::KeepHigh),
            1..3,
        );
        check_err(
            "(1d6)adv",
            ParseErrorKind::ModifierWithoutDice(TokenKind::Advantage),
            5..8,
        );
        check_err(
            "(1 + 2",
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Eof,
                expected: vec![TokenKind::RightParen],
            },
            6..6,
        );
        check_err(
            "2d6 3",
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Number(3),
                expected: vec![TokenKind::Eof],
            },
            4..5,
        );
        check_err(
            "",
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Eof,
                expected: vec![
                    Parser::NUMBER,
                    TokenKind::D,
                    TokenKind::LeftParen,
                    TokenKind::Minus,
                ],
            },
            0..0,
        );
        check_err(
            "2d6s",
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Eof,
                expected: Parser::PREDICATE_START.to_vec(),
            },
            4..4,
        );
        check_err(
            "1 + #",
            ParseErrorKind::Lex(LexError::UnexpectedChar {
                position: 4,
                found: '#',
            }),
            4..5,
        );
    }
}
