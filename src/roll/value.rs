use crate::common::Int;
use std::fmt;

/// The result of evaluating an expression. Only a root comparison produces a
/// `Bool`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Int(Int),
    Bool(bool),
}

impl Value {
    pub fn as_int(self) -> Option<Int> {
        match self {
            Self::Int(x) => Some(x),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            Self::Int(_) => None,
        }
    }
}

impl From<Int> for Value {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}
