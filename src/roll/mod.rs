mod ctx;
mod error;
mod pool;
mod source;
mod trace;
mod value;

use crate::parse::ast::Node;

pub(crate) type EResult<T> = Result<T, EvalError>;

pub use ctx::{EvalConfig, RollContext};
pub use error::EvalError;
pub use pool::{DicePool, Flag, RollFlags, RollResult};
pub use source::{RandomSource, ScriptedSource};
pub use trace::{Evaluation, EvaluationTrace, ReductionStep, TermTrace};
pub use value::Value;

/// Evaluates a syntax tree with the default [`EvalConfig`].
pub fn evaluate(ast: &Node, rng: &mut dyn RandomSource) -> Result<Evaluation, EvalError> {
    evaluate_with(ast, rng, EvalConfig::default())
}

pub fn evaluate_with(
    ast: &Node,
    rng: &mut dyn RandomSource,
    config: EvalConfig,
) -> Result<Evaluation, EvalError> {
    let ctx = RollContext::new(rng, config);
    let result = ctx.eval(ast);
    match &result {
        Ok(evaluation) => tracing::debug!(
            target: "dicelang::roll",
            %ast,
            value = %evaluation.value,
            terms = evaluation.trace.terms.len(),
            "evaluated"
        ),
        Err(e) => tracing::debug!(target: "dicelang::roll", %ast, error = %e, "evaluation failed"),
    }
    result
}
