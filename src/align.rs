//! Multi-series timestamp alignment.
//!
//! Input series are sampled on independent schedules, so only
//! exact-timestamp alignment is trusted: a point exists in the derived
//! series only where every referenced label has a sample at that exact
//! timestamp. Missing samples and per-timestamp evaluation failures produce
//! gaps, never substitute values.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::Result;
use crate::expr::{Bindings, FormulaExpr};
use crate::series::{Label, Sample, SeriesSet};

/// Evaluates a formula across every timestamp present in the input series.
///
/// The formula is parsed once; structural errors (bad syntax, unknown
/// function) fail the call. Per-timestamp conditions degrade gracefully
/// instead: a timestamp where any referenced label lacks a sample, or where
/// evaluation fails (e.g. a momentary zero divisor), is skipped. The output
/// is ascending by timestamp with no duplicates, and never longer than the
/// union of input timestamps; the worst outcome is an empty series.
///
/// Input series need not be sorted; duplicate timestamps within one series
/// resolve to the first occurrence.
///
/// # Example
///
/// ```
/// use derived_metrics::{Label, Sample, SeriesSet, evaluate_series};
///
/// let set = SeriesSet::new()
///     .with_series(
///         Label::new('A').unwrap(),
///         vec![Sample::new(1, 10.0), Sample::new(2, 20.0)],
///     )
///     .with_series(
///         Label::new('B').unwrap(),
///         vec![Sample::new(1, 2.0), Sample::new(3, 6.0)],
///     );
///
/// // Timestamps 2 and 3 are skipped: the other label has no sample there.
/// let derived = evaluate_series("A/B", &set).unwrap();
/// assert_eq!(derived, vec![Sample::new(1, 5.0)]);
/// ```
pub fn evaluate_series(formula: &str, series: &SeriesSet) -> Result<Vec<Sample>> {
    let expr = FormulaExpr::parse(formula)?;

    // Exact-timestamp index per referenced label; first occurrence wins.
    let mut indexed: HashMap<Label, HashMap<i64, f64>> = HashMap::new();
    for &label in expr.labels() {
        let Some(samples) = series.get(&label) else {
            continue;
        };
        let by_timestamp = indexed.entry(label).or_default();
        for sample in samples {
            by_timestamp.entry(sample.timestamp_ms).or_insert(sample.value);
        }
    }

    // Ascending deduplicated union over all input series, referenced or not.
    let mut timestamps = BTreeSet::new();
    for (_, samples) in series.iter() {
        for sample in samples {
            timestamps.insert(sample.timestamp_ms);
        }
    }

    let mut derived = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    'timestamps: for &timestamp_ms in &timestamps {
        let mut bindings = Bindings::new();
        for &label in expr.labels() {
            match indexed.get(&label).and_then(|m| m.get(&timestamp_ms)) {
                Some(&value) => bindings.set(label, value),
                None => {
                    skipped += 1;
                    continue 'timestamps;
                }
            }
        }

        match expr.eval(&bindings) {
            Ok(value) => derived.push(Sample::new(timestamp_ms, value)),
            Err(_) => skipped += 1,
        }
    }

    debug!(
        formula,
        union = timestamps.len(),
        points = derived.len(),
        skipped,
        "derived series evaluated"
    );

    Ok(derived)
}
