use std::fmt::{self, Write};

/// Integer type used for literals, dice counts, faces and results.
pub type Int = i64;

pub type NonEmpty<T> = vec1::Vec1<T>;
pub use vec1::vec1;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnaryOperator {
    Neg,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neg => f.write_char('-'),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    pub(crate) const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        };
        f.write_char(c)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ComparisonOperator {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl ComparisonOperator {
    pub fn apply(self, left: Int, right: Int) -> bool {
        match self {
            Self::Lt => left < right,
            Self::Gt => left > right,
            Self::Le => left <= right,
            Self::Ge => left >= right,
            Self::Eq => left == right,
            Self::Ne => left != right,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        };
        f.write_str(s)
    }
}

/// A test applied to a single die face.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Predicate {
    Equal(Int),
    Less(Int),
    Greater(Int),
    LessOrEqual(Int),
    GreaterOrEqual(Int),
}

impl Predicate {
    pub const fn matches(&self, value: Int) -> bool {
        match *self {
            Self::Equal(x) => value == x,
            Self::Less(x) => value < x,
            Self::Greater(x) => value > x,
            Self::LessOrEqual(x) => value <= x,
            Self::GreaterOrEqual(x) => value >= x,
        }
    }

    /// Whether every face in `1..=sides` satisfies the predicate.
    pub const fn matches_every_face(&self, sides: Int) -> bool {
        match *self {
            Self::Equal(x) => sides == 1 && x == 1,
            Self::Less(x) => x > sides,
            Self::Greater(x) => x < 1,
            Self::LessOrEqual(x) => x >= sides,
            Self::GreaterOrEqual(x) => x <= 1,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal(x) => write!(f, "{}", x),
            Self::Less(x) => write!(f, "<{}", x),
            Self::Greater(x) => write!(f, ">{}", x),
            Self::LessOrEqual(x) => write!(f, "<={}", x),
            Self::GreaterOrEqual(x) => write!(f, ">={}", x),
        }
    }
}
