use crate::{parse::error::ParseError, roll::EvalError};

/// Any failure from [`roll`](crate::roll()): the text did not parse, or the
/// expression could not be evaluated.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
