//! Aggregate-function normalization.
//!
//! `avg` and `sum` calls reduce to primitive arithmetic before parsing, so
//! the evaluator grammar stays minimal. `min` and `max` are not reducible to
//! the four operators and stay intact as evaluator built-ins. Unknown
//! function names also stay intact and surface as parse failures later.

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct RewritableCall {
    name: &'static str,
    open: usize,
    close: usize,
}

/// Matches `avg` or `sum` at position `i` as a standalone identifier
/// followed (after optional whitespace) by a balanced parenthesis group.
fn match_rewritable_call(chars: &[char], i: usize) -> Option<RewritableCall> {
    if i > 0 && is_word(chars[i - 1]) {
        return None;
    }

    let name = ["avg", "sum"].into_iter().find(|name| {
        chars[i..].len() >= name.len() && chars[i..i + name.len()].iter().copied().eq(name.chars())
    })?;

    let after_name = i + name.len();
    if chars.get(after_name).copied().is_some_and(is_word) {
        return None;
    }

    let mut open = after_name;
    while chars.get(open).copied().is_some_and(char::is_whitespace) {
        open += 1;
    }
    if chars.get(open) != Some(&'(') {
        return None;
    }

    let close = matching_paren(chars, open)?;
    Some(RewritableCall { name, open, close })
}

/// Index of the `)` closing the `(` at `open`, or `None` when unbalanced.
fn matching_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits an argument list on top-level commas only; commas inside nested
/// parentheses stay within their argument.
fn split_top_level(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in args.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn rewrite(name: &str, args: &[String]) -> String {
    let joined = args
        .iter()
        .map(|a| a.trim())
        .collect::<Vec<_>>()
        .join("+");
    match name {
        "avg" => format!("({joined})/{}", args.len()),
        _ => format!("({joined})"),
    }
}

/// Rewrites `avg` and `sum` calls into primitive arithmetic.
///
/// `avg(x1,…,xn)` becomes `(x1+…+xn)/n` and `sum(x1,…,xn)` becomes
/// `(x1+…+xn)`. Nested calls normalize innermost-first, so
/// `avg(avg(A,B),C)` becomes `((A+B)/2+C)/2`. Calls with an empty argument
/// are left verbatim for the parser to reject.
///
/// # Example
///
/// ```
/// use derived_metrics::normalize_functions;
///
/// assert_eq!(normalize_functions("avg(A,B,C)"), "(A+B+C)/3");
/// ```
pub fn normalize_functions(formula: &str) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len());
    let mut i = 0;

    while i < chars.len() {
        if let Some(call) = match_rewritable_call(&chars, i) {
            let inner: String = chars[call.open + 1..call.close].iter().collect();
            let args = split_top_level(&normalize_functions(&inner));
            if args.iter().all(|a| !a.trim().is_empty()) {
                out.push_str(&rewrite(call.name, &args));
                i = call.close + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}
