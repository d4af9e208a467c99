use super::{
    error::EvalError,
    pool::DicePool,
    source::RandomSource,
    trace::{Evaluation, EvaluationTrace, ReductionStep, TermTrace},
    value::Value,
    EResult,
};
use crate::common::*;
use crate::ops::Modify;
use crate::parse::{
    ast,
    visit::{self, Accept},
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EvalConfig {
    /// Upper bound on dice rolled during one evaluation, counting rerolls,
    /// explosions and advantage dice. `None` disables the check.
    pub max_rolls: Option<usize>,
}

impl EvalConfig {
    pub const DEFAULT_MAX_ROLLS: usize = 1000;

    pub const fn bounded(max_rolls: usize) -> Self {
        Self {
            max_rolls: Some(max_rolls),
        }
    }

    pub const fn unbounded() -> Self {
        Self { max_rolls: None }
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::bounded(Self::DEFAULT_MAX_ROLLS)
    }
}

pub struct RollContext<'r> {
    rng: &'r mut dyn RandomSource,
    config: EvalConfig,
    rolls: usize,
    trace: EvaluationTrace,
}

impl<'r> RollContext<'r> {
    pub fn new(rng: &'r mut dyn RandomSource, config: EvalConfig) -> Self {
        Self {
            rng,
            config,
            rolls: 0,
            trace: EvaluationTrace::default(),
        }
    }

    /// Dice rolled so far.
    pub fn rolls(&self) -> usize {
        self.rolls
    }

    fn count_rolls(&mut self, n: usize) -> EResult<()> {
        self.rolls = self.rolls.saturating_add(n);
        match self.config.max_rolls {
            Some(max) if self.rolls > max => Err(EvalError::TooManyRolls { max }),
            _ => Ok(()),
        }
    }

    pub(crate) fn roll_die(&mut self, sides: Int) -> EResult<Int> {
        self.count_rolls(1)?;
        let value = self.rng.next(1, sides);
        tracing::trace!(target: "dicelang::roll", sides, value, "rolled die");
        Ok(value)
    }

    pub fn eval(mut self, node: &ast::Node) -> EResult<Evaluation> {
        let value = node.accept(&mut self)?;
        Ok(Evaluation {
            value,
            trace: self.trace,
        })
    }

    fn eval_int(&mut self, node: &ast::Node) -> EResult<Int> {
        match node.accept(self)? {
            Value::Int(x) => Ok(x),
            Value::Bool(_) => Err(EvalError::TypeMismatch),
        }
    }
}

impl visit::AstVisitor for RollContext<'_> {
    type Output = EResult<Value>;

    fn visit_literal(&mut self, x: Int) -> Self::Output {
        Ok(Value::Int(x))
    }

    fn visit_dice(&mut self, dice: &ast::DiceTerm) -> Self::Output {
        if dice.sides < 1 {
            return Err(EvalError::ZeroSidedDie { sides: dice.sides });
        }
        let count = usize::try_from(dice.count)
            .map_err(|_| EvalError::NegativeDiceCount { count: dice.count })?;

        self.count_rolls(count)?;
        let rng = &mut *self.rng;
        let values: Vec<_> = (0..count).map(|_| rng.next(1, dice.sides)).collect();
        tracing::trace!(target: "dicelang::roll", ?values, "rolled {}d{}", dice.count, dice.sides);

        let pool = DicePool::new(dice.count, dice.sides, values);
        let pool = dice
            .modifiers
            .iter()
            .try_fold(pool, |pool, modifier| modifier.apply(pool, self))?;

        let term = TermTrace::new(dice, pool)?;
        tracing::debug!(
            target: "dicelang::roll",
            notation = %term.notation,
            value = term.value,
            kept = term.kept().count(),
            dropped = term.dropped().count(),
            "evaluated dice term"
        );

        let value = term.value;
        self.trace.terms.push(term);
        Ok(Value::Int(value))
    }

    fn visit_unary(&mut self, op: UnaryOperator, x: &ast::Node) -> Self::Output {
        let operand = self.eval_int(x)?;
        let result = match op {
            UnaryOperator::Neg => operand.checked_neg().ok_or(EvalError::Overflow)?,
        };
        self.trace
            .reductions
            .push(ReductionStep::Negate { operand, result });
        Ok(Value::Int(result))
    }

    fn visit_binary(&mut self, l: &ast::Node, op: BinaryOperator, r: &ast::Node) -> Self::Output {
        let left = self.eval_int(l)?;
        let right = self.eval_int(r)?;

        let result = match op {
            BinaryOperator::Add => left.checked_add(right),
            BinaryOperator::Sub => left.checked_sub(right),
            BinaryOperator::Mul => left.checked_mul(right),
            BinaryOperator::Div if right == 0 => return Err(EvalError::DivisionByZero),
            BinaryOperator::Div => left.checked_div(right),
        }
        .ok_or(EvalError::Overflow)?;

        self.trace.reductions.push(ReductionStep::Binary {
            left,
            op,
            right,
            result,
        });
        Ok(Value::Int(result))
    }

    fn visit_comparison(
        &mut self,
        l: &ast::Node,
        op: ComparisonOperator,
        r: &ast::Node,
    ) -> Self::Output {
        let left = self.eval_int(l)?;
        let right = self.eval_int(r)?;
        let result = op.apply(left, right);

        self.trace.reductions.push(ReductionStep::Compare {
            left,
            op,
            right,
            result,
        });
        Ok(Value::Bool(result))
    }
}
