use super::{pool::DicePool, value::Value, EResult, RollResult};
use crate::common::*;
use crate::parse::ast::DiceTerm;
use std::fmt;

/// A finished evaluation: the final value and how it was reached.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Evaluation {
    pub value: Value,
    pub trace: EvaluationTrace,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EvaluationTrace {
    /// One entry per dice term, in evaluation order.
    pub terms: Vec<TermTrace>,
    pub reductions: Vec<ReductionStep>,
}

/// Every roll of one dice term, kept and dropped, in the order they were made.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TermTrace {
    pub notation: String,
    pub count: Int,
    pub sides: Int,
    pub rolls: Vec<RollResult>,
    pub value: Int,
    pub successes: usize,
    pub failures: usize,
    pub criticals: usize,
    pub fumbles: usize,
}

impl TermTrace {
    pub(crate) fn new(term: &DiceTerm, pool: DicePool) -> EResult<Self> {
        Ok(Self {
            notation: term.to_string(),
            count: pool.count,
            sides: pool.sides,
            value: pool.total()?,
            successes: pool.successes(),
            failures: pool.failures(),
            criticals: pool.criticals(),
            fumbles: pool.fumbles(),
            rolls: pool.rolls,
        })
    }

    pub fn kept(&self) -> impl Iterator<Item = &RollResult> + '_ {
        self.rolls.iter().filter(|r| r.kept)
    }

    pub fn dropped(&self) -> impl Iterator<Item = &RollResult> + '_ {
        self.rolls.iter().filter(|r| !r.kept)
    }
}

/// One arithmetic or comparison step, recorded as it is applied.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ReductionStep {
    Negate {
        operand: Int,
        result: Int,
    },
    Binary {
        left: Int,
        op: BinaryOperator,
        right: Int,
        result: Int,
    },
    Compare {
        left: Int,
        op: ComparisonOperator,
        right: Int,
        result: bool,
    },
}

impl fmt::Display for ReductionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negate { operand, result } => write!(f, "-({}) = {}", operand, result),
            Self::Binary {
                left,
                op,
                right,
                result,
            } => write!(f, "{} {} {} = {}", left, op, right, result),
            Self::Compare {
                left,
                op,
                right,
                result,
            } => write!(f, "{} {} {} = {}", left, op, right, result),
        }
    }
}
