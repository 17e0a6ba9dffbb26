//! Derived-metric formula engine for dashboard time series.
//!
//! A dashboard lets its user define a *derived metric* as a short arithmetic
//! formula over named queries (`A/B`, `avg(A,B,C)`) and charts the result.
//! This crate is the engine behind that feature:
//!
//! - [`validate_formula`] gives the chart editor inline feedback without ever
//!   failing.
//! - [`extract_references`] reports which query labels a formula depends on.
//! - [`evaluate`] computes a formula against one set of label bindings over a
//!   closed grammar: tokenizer, precedence-climbing parser, and tree-walking
//!   evaluator, with no dynamic code execution path.
//! - [`evaluate_series`] aligns independently-sampled input series on exact
//!   timestamps and produces the derived series.
//! - [`substitute_variables`] resolves `${variable}` placeholders in query
//!   text before dispatch to the metrics backend.
//!
//! The crate is pure and synchronous: no I/O, no shared state, and
//! bit-identical output for identical input.
//!
//! # Example
//!
//! ```
//! use derived_metrics::{Label, Sample, SeriesSet, evaluate_series};
//!
//! let set = SeriesSet::new()
//!     .with_series(
//!         Label::new('A').unwrap(),
//!         vec![Sample::new(1000, 10.0), Sample::new(2000, 20.0)],
//!     )
//!     .with_series(
//!         Label::new('B').unwrap(),
//!         vec![Sample::new(1000, 2.0), Sample::new(2000, 4.0)],
//!     );
//!
//! let derived = evaluate_series("A/B", &set).unwrap();
//! assert_eq!(derived, vec![Sample::new(1000, 5.0), Sample::new(2000, 5.0)]);
//! ```

mod align;
mod error;
mod expr;
mod series;
mod template;

pub use align::evaluate_series;
pub use error::{EvalError, Result};
pub use expr::{
    Bindings, FormulaExample, FormulaExpr, Validation, ValidationErrorKind, evaluate,
    extract_references, formula_examples, formula_help, normalize_functions, validate_formula,
};
pub use series::{InvalidLabel, Label, Sample, SeriesSet};
pub use template::{
    ChartQuery, VariableCheck, Variables, extract_variables, has_variables, substitute_queries,
    substitute_variables, validate_variables,
};
