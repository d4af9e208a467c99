//! Parser and evaluator for tabletop dice notation such as `2d6+3`, `4d6kh3`,
//! `1d20adv` or `3d10!`.
//!
//! ```
//! use dicelang::{roll, ScriptedSource, Value};
//!
//! let mut dice = ScriptedSource::from_slice(&[1, 6, 3, 2]).unwrap();
//! let result = roll("4d6kh3", &mut dice).unwrap();
//! assert_eq!(result.value, Value::Int(11));
//! ```

mod common;
mod error;
pub mod ops;
pub mod parse;
pub mod roll;

pub use common::{BinaryOperator, ComparisonOperator, Int, NonEmpty, Predicate, UnaryOperator};
pub use error::Error;
pub use parse::{ast::Node, error::ParseError, parse};
pub use roll::{
    evaluate, evaluate_with, EvalConfig, EvalError, Evaluation, RandomSource, ScriptedSource,
    Value,
};

/// Parses `source` and evaluates it with the default [`EvalConfig`].
pub fn roll(source: &str, rng: &mut dyn RandomSource) -> Result<Evaluation, Error> {
    let ast = parse(source)?;
    Ok(evaluate(&ast, rng)?)
}
