//! Tree-walking evaluation of parsed formulas.
//!
//! Evaluation is the security-sensitive step: values reach the formula only
//! through the binding set, never by splicing text into the expression, and
//! the walk can perform nothing beyond the four arithmetic operators and the
//! `min`/`max` built-ins. The walk is stateless and reentrant.

use std::collections::BTreeMap;

use crate::error::{EvalError, Result};
use crate::expr::parser::{BinaryOp, BuiltinFn, Expr, FormulaExpr};
use crate::series::Label;

/// Label-to-value bindings valid at exactly one timestamp.
///
/// # Example
///
/// ```
/// use derived_metrics::{Bindings, Label};
///
/// let bindings = Bindings::new().with(Label::new('A').unwrap(), 10.0);
/// assert_eq!(bindings.get(&Label::new('A').unwrap()), Some(10.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<Label, f64>,
}

impl Bindings {
    /// Creates an empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value to a label, builder style.
    pub fn with(mut self, label: Label, value: f64) -> Self {
        self.set(label, value);
        self
    }

    /// Binds a value to a label, replacing any previous binding.
    pub fn set(&mut self, label: Label, value: f64) {
        self.values.insert(label, value);
    }

    /// Returns the value bound to a label, if any.
    pub fn get(&self, label: &Label) -> Option<f64> {
        self.values.get(label).copied()
    }
}

impl FormulaExpr {
    /// Evaluates the parsed formula against one binding set.
    ///
    /// Labels resolve strictly from `bindings`; a missing label fails with
    /// [`EvalError::UnboundLabel`] and a zero divisor with
    /// [`EvalError::DivisionByZero`] rather than leaking an infinity or NaN.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64> {
        eval_expr(self.root(), bindings)
    }
}

fn eval_expr(expr: &Expr, bindings: &Bindings) -> Result<f64> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Label(label) => bindings
            .get(label)
            .ok_or(EvalError::UnboundLabel(*label)),
        Expr::Binary { op, lhs, rhs } => {
            let left = eval_expr(lhs, bindings)?;
            let right = eval_expr(rhs, bindings)?;
            apply_binary_op(*op, left, right)
        }
        Expr::Call { func, args } => {
            let fold = match func {
                BuiltinFn::Min => f64::min,
                BuiltinFn::Max => f64::max,
            };
            let mut result = eval_expr(&args[0], bindings)?;
            for arg in &args[1..] {
                result = fold(result, eval_expr(arg, bindings)?);
            }
            Ok(result)
        }
    }
}

fn apply_binary_op(op: BinaryOp, left: f64, right: f64) -> Result<f64> {
    match op {
        BinaryOp::Add => Ok(left + right),
        BinaryOp::Sub => Ok(left - right),
        BinaryOp::Mul => Ok(left * right),
        BinaryOp::Div => {
            if right == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(left / right)
            }
        }
    }
}

/// Evaluates a formula against one binding set in a single call.
///
/// Equivalent to [`FormulaExpr::parse`] followed by
/// [`FormulaExpr::eval`]; hosts evaluating the same formula repeatedly
/// should parse once instead.
///
/// # Example
///
/// ```
/// use derived_metrics::{Bindings, Label, evaluate};
///
/// let bindings = Bindings::new()
///     .with(Label::new('A').unwrap(), 10.0)
///     .with(Label::new('B').unwrap(), 2.0);
/// assert_eq!(evaluate("A/B", &bindings).unwrap(), 5.0);
/// ```
pub fn evaluate(formula: &str, bindings: &Bindings) -> Result<f64> {
    FormulaExpr::parse(formula)?.eval(bindings)
}
