use thiserror::Error;

use crate::series::Label;

/// Failure raised while parsing or evaluating a formula.
///
/// Every variant is a per-call failure: the engine holds no state, so a
/// failed call leaves nothing to clean up. The series aligner treats
/// per-timestamp failures as missing points rather than propagating them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The token stream does not match the formula grammar.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A call names a function the evaluator does not know.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A referenced label has no value in the binding set.
    #[error("no value bound for label {0}")]
    UnboundLabel(Label),

    /// Division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
}

/// Convenience alias for results carrying an [`EvalError`].
pub type Result<T> = std::result::Result<T, EvalError>;
