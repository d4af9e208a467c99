use crate::common::*;
use crate::ops::Modifier;
use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Node {
    Literal(Int),
    Dice(DiceTerm),
    Unary(UnaryOperator, Box<Node>),
    Binary(Box<Node>, BinaryOperator, Box<Node>),
    /// Only produced at the root of a parsed expression.
    Comparison(Box<Node>, ComparisonOperator, Box<Node>),
}

impl Node {
    const COMPARISON: u8 = 0;
    const UNARY: u8 = 3;
    const ATOM: u8 = 4;

    fn precedence(&self) -> u8 {
        match self {
            Self::Literal(_) | Self::Dice(_) => Self::ATOM,
            Self::Unary(..) => Self::UNARY,
            Self::Binary(_, op, _) => op.precedence(),
            Self::Comparison(..) => Self::COMPARISON,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Writes canonical notation: binary operators spaced, parentheses only where
/// precedence or left associativity require them.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(x) => write!(f, "{}", x),
            Self::Dice(dice) => write!(f, "{}", dice),
            Self::Unary(op, x) => {
                write!(f, "{}", op)?;
                x.fmt_operand(f, x.precedence() < Self::UNARY)
            }
            Self::Binary(l, op, r) => {
                let prec = op.precedence();
                l.fmt_operand(f, l.precedence() < prec)?;
                write!(f, " {} ", op)?;
                r.fmt_operand(f, r.precedence() <= prec)
            }
            Self::Comparison(l, op, r) => {
                l.fmt_operand(f, l.precedence() == Self::COMPARISON)?;
                write!(f, " {} ", op)?;
                r.fmt_operand(f, r.precedence() == Self::COMPARISON)
            }
        }
    }
}

/// `{count}d{sides}` followed by its modifiers in application order.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiceTerm {
    pub count: Int,
    pub sides: Int,
    pub modifiers: Vec<Modifier>,
}

impl DiceTerm {
    pub fn new(count: Int, sides: Int, modifiers: Vec<Modifier>) -> Self {
        Self {
            count,
            sides,
            modifiers,
        }
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        for modifier in &self.modifiers {
            write!(f, "{}", modifier)?;
        }
        Ok(())
    }
}
