//! Formula engine: validation, reference extraction, aggregate
//! normalization, and safe evaluation over a closed grammar.

mod evaluator;
mod normalize;
mod parser;
mod references;
mod token;
mod validate;

pub use evaluator::{Bindings, evaluate};
pub use normalize::normalize_functions;
pub use parser::FormulaExpr;
pub use references::extract_references;
pub use validate::{Validation, ValidationErrorKind, validate_formula};

/// A worked formula with a short description, for the editor's help panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaExample {
    /// The formula text, ready to paste into the editor.
    pub formula: &'static str,
    /// What it computes.
    pub description: &'static str,
}

/// Example formulas shown alongside the chart editor.
pub fn formula_examples() -> &'static [FormulaExample] {
    const EXAMPLES: &[FormulaExample] = &[
        FormulaExample {
            formula: "A/B",
            description: "Divide A by B",
        },
        FormulaExample {
            formula: "A*100",
            description: "Multiply A by 100",
        },
        FormulaExample {
            formula: "(A+B)/2",
            description: "Average of A and B",
        },
        FormulaExample {
            formula: "avg(A,B,C)",
            description: "Average of A, B, and C",
        },
        FormulaExample {
            formula: "(A-B)*100/B",
            description: "Percentage difference",
        },
        FormulaExample {
            formula: "sum(A,B,C)",
            description: "Sum of A, B, and C",
        },
        FormulaExample {
            formula: "min(A,B)",
            description: "Minimum of A and B",
        },
        FormulaExample {
            formula: "max(A,B)",
            description: "Maximum of A and B",
        },
        FormulaExample {
            formula: "(A+B+C)/3",
            description: "Average using operators",
        },
        FormulaExample {
            formula: "A*0.5+B*0.5",
            description: "Weighted average (50% A, 50% B)",
        },
    ];
    EXAMPLES
}

/// Help text for the formula editor.
pub fn formula_help() -> &'static str {
    "\
Mathematical Expressions Help:

Operators:
  +    Addition (A + B)
  -    Subtraction (A - B)
  *    Multiplication (A * 100)
  /    Division (A / B)
  ()   Grouping ((A + B) / 2)

Functions:
  avg(A,B,C)  Average of multiple queries
  sum(A,B)    Sum of multiple queries
  min(A,B)    Minimum of multiple queries
  max(A,B)    Maximum of multiple queries

Examples:
  A/B                    Divide A by B
  A*100                  Multiply A by 100
  (A+B)/2                Average of A and B
  avg(A,B,C)             Average of A, B, and C
  (A-B)*100/B            Percentage difference
  sum(A,B,C)             Sum of A, B, and C

Note:
  - Query labels are uppercase letters: A, B, C, etc.
  - Division by zero produces no value for that point
  - Use parentheses to control operation order
"
}
