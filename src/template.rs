//! Template-variable substitution for query strings.
//!
//! Dashboard queries may carry placeholders (`rate_${circuit}_total`) that
//! resolve against the user's current variable selections before the query
//! is dispatched to the metrics backend. Three syntaxes are supported, each
//! handled by its own pass in fixed priority order: `${name}`, then `$name`,
//! then `{name}`. An unresolved placeholder stays verbatim in the output so
//! it is visibly unresolved rather than silently deleted.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::series::Label;

static DOLLAR_BRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern"));
static DOLLAR_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([a-zA-Z_][a-zA-Z0-9_]*)").expect("placeholder pattern"));
static BRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("placeholder pattern"));

/// Variable values selected in the dashboard, keyed by placeholder name.
///
/// A name may be present with no value (`with_unset`) to model a selection
/// that exists but is currently unset: its placeholders stay verbatim during
/// substitution, but [`validate_variables`] counts the name as provided.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: BTreeMap<String, Option<String>>,
}

impl Variables {
    /// Creates an empty variable map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable value, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Registers a name without a value, builder style.
    pub fn with_unset(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), None);
        self
    }

    /// Sets a variable value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), Some(value.into()));
    }

    /// True when the name is registered, with or without a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The substitutable value for a name, when one is set.
    fn lookup(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_deref())
    }
}

fn replace_pass(pattern: &Regex, input: &str, variables: &Variables) -> String {
    pattern
        .replace_all(input, |caps: &Captures<'_>| match variables.lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Replaces every resolvable placeholder in a template.
///
/// Passes run in priority order (`${name}`, then `$name`, then `{name}`),
/// each replacing all occurrences whose name has a value. Unmatched placeholders
/// survive unchanged, and substituting an already-resolved template again is
/// a no-op.
///
/// # Example
///
/// ```
/// use derived_metrics::{Variables, substitute_variables};
///
/// let vars = Variables::new().with("circuit", "a");
/// assert_eq!(
///     substitute_variables("rate_${circuit}_total", &vars),
///     "rate_a_total"
/// );
/// assert_eq!(substitute_variables("rate_${missing}", &vars), "rate_${missing}");
/// ```
pub fn substitute_variables(template: &str, variables: &Variables) -> String {
    let result = replace_pass(&DOLLAR_BRACE, template, variables);
    let result = replace_pass(&DOLLAR_BARE, &result, variables);
    replace_pass(&BRACE, &result, variables)
}

/// Returns every placeholder name in a template, across all three syntaxes,
/// deduplicated in first-appearance order per pass priority.
///
/// This is exactly the set of names [`substitute_variables`] will attempt to
/// resolve for the same template.
pub fn extract_variables(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    for pattern in [&DOLLAR_BRACE, &DOLLAR_BARE, &BRACE] {
        for caps in pattern.captures_iter(template) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// True when the template contains at least one placeholder.
pub fn has_variables(template: &str) -> bool {
    !extract_variables(template).is_empty()
}

/// One chart query as held in dashboard configuration: the label a formula
/// uses to reference it, plus the backend query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartQuery {
    /// The letter formulas use to reference this query's series.
    pub label: Label,
    /// The query text sent to the metrics backend.
    pub query: String,
}

/// Applies [`substitute_variables`] across an ordered collection of chart
/// queries, preserving order and labels.
pub fn substitute_queries(queries: Vec<ChartQuery>, variables: &Variables) -> Vec<ChartQuery> {
    queries
        .into_iter()
        .map(|q| ChartQuery {
            query: substitute_variables(&q.query, variables),
            ..q
        })
        .collect()
}

/// Which required placeholder names a variable map fails to provide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableCheck {
    /// True when every required name is provided.
    pub valid: bool,
    /// Required names with no entry in the variable map.
    pub missing: Vec<String>,
    /// Every placeholder name the template requires.
    pub required: Vec<String>,
}

/// Checks that a variable map provides every placeholder the template names.
///
/// A name registered without a value counts as provided; only absent names
/// are reported missing.
pub fn validate_variables(template: &str, variables: &Variables) -> VariableCheck {
    let required = extract_variables(template);
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !variables.contains(name))
        .cloned()
        .collect();

    VariableCheck {
        valid: missing.is_empty(),
        missing,
        required,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_substitute_dollar_brace_syntax() {
        let vars = Variables::new().with("circuit", "a");
        assert_eq!(
            substitute_variables("rate_${circuit}_total", &vars),
            "rate_a_total"
        );
    }

    #[test]
    fn should_substitute_bare_dollar_syntax_with_longest_match() {
        let vars = Variables::new().with("circuit", "a").with("circuit_id", "7");
        assert_eq!(
            substitute_variables("flow_$circuit_id", &vars),
            // $circuit_id matches the longer name, not $circuit plus "_id"
            "flow_7"
        );
    }

    #[test]
    fn should_substitute_brace_syntax() {
        let vars = Variables::new().with("sensor", "hk1");
        assert_eq!(substitute_variables("temp{sensor}", &vars), "temphk1");
    }

    #[test]
    fn should_leave_unmatched_placeholders_verbatim() {
        let vars = Variables::new();
        assert_eq!(
            substitute_variables("rate_${missing}", &vars),
            "rate_${missing}"
        );
        assert_eq!(substitute_variables("$missing/{missing}", &vars), "$missing/{missing}");
    }

    #[test]
    fn should_leave_unset_values_verbatim() {
        let vars = Variables::new().with_unset("circuit");
        assert_eq!(substitute_variables("x_${circuit}", &vars), "x_${circuit}");
    }

    #[test]
    fn dollar_brace_resolves_before_literal_brace() {
        // Given a template carrying both ${x} and a literal {x}
        let template = "${x}and{x}";
        let vars = Variables::new().with("x", "1");

        // When
        let result = substitute_variables(template, &vars);

        // Then both resolve, the ${x} pass first
        assert_eq!(result, "1and1");
    }

    #[test]
    fn substitution_is_idempotent_once_resolved() {
        let vars = Variables::new().with("circuit", "a");
        let resolved = substitute_variables("rate_${circuit}_total", &vars);
        assert_eq!(substitute_variables(&resolved, &vars), resolved);
    }

    #[test]
    fn should_extract_names_across_all_syntaxes() {
        let names = extract_variables("${a} $b {c} ${a}");
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn extraction_matches_what_substitution_resolves() {
        let template = "rate_${circuit}_$period{sensor}";
        let names = extract_variables(template);

        let mut vars = Variables::new();
        for name in &names {
            vars.set(name.clone(), "v");
        }

        let resolved = substitute_variables(template, &vars);
        assert!(!has_variables(&resolved));
        assert_eq!(names, vec!["circuit", "period", "sensor"]);
    }

    #[test]
    fn should_detect_placeholders() {
        assert!(has_variables("rate_${circuit}"));
        assert!(has_variables("$circuit"));
        assert!(has_variables("{circuit}"));
        assert!(!has_variables("rate_total"));
    }

    #[test]
    fn should_substitute_across_chart_queries() {
        let vars = Variables::new().with("circuit", "a");
        let queries = vec![
            ChartQuery {
                label: Label::new('A').unwrap(),
                query: "flow_${circuit}".to_string(),
            },
            ChartQuery {
                label: Label::new('B').unwrap(),
                query: "return_${circuit}".to_string(),
            },
        ];

        let substituted = substitute_queries(queries, &vars);

        assert_eq!(substituted[0].query, "flow_a");
        assert_eq!(substituted[1].query, "return_a");
        assert_eq!(substituted[0].label, Label::new('A').unwrap());
    }

    #[test]
    fn should_report_missing_variables() {
        // Given
        let template = "${circuit}/${period}";
        let vars = Variables::new().with("circuit", "a");

        // When
        let check = validate_variables(template, &vars);

        // Then
        assert!(!check.valid);
        assert_eq!(check.missing, vec!["period"]);
        assert_eq!(check.required, vec!["circuit", "period"]);
    }

    #[test]
    fn unset_names_count_as_provided() {
        let vars = Variables::new().with_unset("circuit");
        let check = validate_variables("${circuit}", &vars);
        assert!(check.valid);
        assert!(check.missing.is_empty());
    }
}
