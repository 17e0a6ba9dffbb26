//! Query-reference discovery.

use crate::series::Label;

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns the distinct labels a formula references, in first-appearance
/// order.
///
/// A reference is a standalone uppercase letter: one not adjacent to another
/// word character. Letters embedded in longer identifiers do not count.
/// Discovery order is stable so dependency lists shown to users do not
/// reorder between calls.
///
/// # Example
///
/// ```
/// use derived_metrics::{Label, extract_references};
///
/// let refs = extract_references("avg(B,A,B)");
/// let expected: Vec<Label> = ['B', 'A'].into_iter().filter_map(Label::new).collect();
/// assert_eq!(refs, expected);
/// ```
pub fn extract_references(formula: &str) -> Vec<Label> {
    let chars: Vec<char> = formula.chars().collect();
    let mut references = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        let Some(label) = Label::new(c) else { continue };

        let bound_before = i > 0 && is_word(chars[i - 1]);
        let bound_after = chars.get(i + 1).copied().is_some_and(is_word);
        if bound_before || bound_after {
            continue;
        }

        if !references.contains(&label) {
            references.push(label);
        }
    }

    references
}
