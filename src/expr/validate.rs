//! Advisory syntax checks for formulas as typed in the chart editor.
//!
//! Validation runs on every keystroke, so it returns structured data and
//! never fails. It is independent from evaluation: the evaluator re-parses
//! the formula against the full grammar regardless of what the validator
//! reported.

use serde::Serialize;

/// What a validation check found wrong with a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationErrorKind {
    /// The formula is empty or whitespace only.
    EmptyExpression,
    /// Opening and closing parentheses do not balance.
    UnbalancedParentheses,
    /// A character outside the formula alphabet.
    InvalidCharacter,
    /// Two adjacent symbol characters, e.g. `**` or `+-`.
    InvalidOperatorSequence,
}

/// Verdict for a formula, shaped for inline display in the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    /// True when all checks passed.
    pub valid: bool,
    /// The failing check, when one failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValidationErrorKind>,
    /// Human-readable description of the failure, empty when valid.
    pub message: String,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            kind: None,
            message: String::new(),
        }
    }

    fn fail(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            kind: Some(kind),
            message: message.into(),
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_allowed(c: char) -> bool {
    is_word(c) || c.is_whitespace() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | ',' | '.')
}

/// Checks a raw formula for the errors an editor should flag inline.
///
/// Checks run in order: emptiness, parenthesis balance (net count of opens
/// minus closes, reporting the excess side), character whitelist, and
/// adjacent symbol pairs after whitespace removal. The grammar has no unary
/// operators, so every adjacent symbol pair is rejected.
///
/// # Example
///
/// ```
/// use derived_metrics::validate_formula;
///
/// assert!(validate_formula("A/B").valid);
/// assert!(!validate_formula("(A+B").valid);
/// ```
pub fn validate_formula(formula: &str) -> Validation {
    if formula.trim().is_empty() {
        return Validation::fail(ValidationErrorKind::EmptyExpression, "expression is empty");
    }

    let opens = formula.chars().filter(|&c| c == '(').count() as i64;
    let closes = formula.chars().filter(|&c| c == ')').count() as i64;
    let excess = opens - closes;
    if excess != 0 {
        let side = if excess > 0 { '(' } else { ')' };
        return Validation::fail(
            ValidationErrorKind::UnbalancedParentheses,
            format!("unbalanced parentheses: {} extra {}", excess.abs(), side),
        );
    }

    if let Some(c) = formula.chars().find(|&c| !is_allowed(c)) {
        return Validation::fail(
            ValidationErrorKind::InvalidCharacter,
            format!("expression contains invalid character {c:?}"),
        );
    }

    let compact: Vec<char> = formula.chars().filter(|c| !c.is_whitespace()).collect();
    for pair in compact.windows(2) {
        if !is_word(pair[0]) && !is_word(pair[1]) {
            return Validation::fail(
                ValidationErrorKind::InvalidOperatorSequence,
                format!("invalid operator sequence \"{}{}\"", pair[0], pair[1]),
            );
        }
    }

    Validation::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A/B")]
    #[case("A * 100")]
    #[case("avg(A, B, C)")]
    #[case("sum(A,B)")]
    #[case("min(A,B)")]
    #[case("A*0.5 + B*0.5")]
    fn should_accept_well_formed_formulas(#[case] formula: &str) {
        let validation = validate_formula(formula);
        assert!(validation.valid, "{formula}: {}", validation.message);
        assert_eq!(validation.kind, None);
    }

    #[test]
    fn should_flag_empty_expression() {
        for formula in ["", "   ", "\t\n"] {
            let validation = validate_formula(formula);
            assert_eq!(validation.kind, Some(ValidationErrorKind::EmptyExpression));
        }
    }

    #[test]
    fn should_report_extra_open_parenthesis() {
        // Given
        let formula = "(A+B";

        // When
        let validation = validate_formula(formula);

        // Then
        assert!(!validation.valid);
        assert_eq!(
            validation.kind,
            Some(ValidationErrorKind::UnbalancedParentheses)
        );
        assert_eq!(validation.message, "unbalanced parentheses: 1 extra (");
    }

    #[test]
    fn should_report_extra_close_parenthesis() {
        let validation = validate_formula("A+B))");
        assert_eq!(
            validation.kind,
            Some(ValidationErrorKind::UnbalancedParentheses)
        );
        assert_eq!(validation.message, "unbalanced parentheses: 2 extra )");
    }

    #[test]
    fn should_flag_invalid_characters() {
        let validation = validate_formula("A & B");
        assert_eq!(validation.kind, Some(ValidationErrorKind::InvalidCharacter));
        assert!(validation.message.contains('&'));
    }

    #[rstest]
    #[case("A**B")]
    #[case("A+-B")]
    #[case("A+ -B")]
    #[case("A//B")]
    fn should_flag_adjacent_operators(#[case] formula: &str) {
        let validation = validate_formula(formula);
        assert_eq!(
            validation.kind,
            Some(ValidationErrorKind::InvalidOperatorSequence),
            "{formula}"
        );
    }

    #[test]
    fn should_serialize_for_editor_feedback() {
        let validation = validate_formula("(A+B");
        let json = serde_json::to_value(&validation).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["kind"], "UnbalancedParentheses");

        let json = serde_json::to_value(validate_formula("A+B")).unwrap();
        assert_eq!(json["valid"], true);
        assert!(json.get("kind").is_none());
    }
}
