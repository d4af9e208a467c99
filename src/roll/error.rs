use crate::common::{Int, Predicate};
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum EvalError {
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("dice must have at least one side, found d{sides}")]
    ZeroSidedDie { sides: Int },
    #[error("cannot roll a negative number of dice ({count})")]
    NegativeDiceCount { count: Int },
    #[error("reroll condition {predicate} matches every face of a d{sides}")]
    UnsatisfiableReroll { predicate: Predicate, sides: Int },
    #[error("'{modifier}' needs exactly one die, found {count}")]
    InvalidModifierArity { modifier: &'static str, count: Int },
    #[error("'{modifier}' count must not be negative, found {n}")]
    ModifierCountOutOfRange { modifier: &'static str, n: Int },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("too many dice rolled (limit is {max})")]
    TooManyRolls { max: usize },
    #[error("a comparison result cannot be used as a number")]
    TypeMismatch,
}
