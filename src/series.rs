//! Core data types for derived-metric evaluation.
//!
//! This module defines the fundamental structures of the public API: labels
//! identifying the input queries of a formula, samples carrying one
//! timestamped value, and the per-evaluation set of input series.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A label identifies one input series within a formula.
///
/// Dashboard charts name their queries with single uppercase letters, so a
/// label is exactly one ASCII letter `A`-`Z`. Formulas reference these
/// letters (`A/B`, `avg(A,B,C)`).
///
/// # Example
///
/// ```
/// use derived_metrics::Label;
///
/// let a = Label::new('A').unwrap();
/// assert_eq!(a.as_char(), 'A');
/// assert_eq!(Label::new('a'), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Label(char);

impl Label {
    /// Creates a label from a character.
    ///
    /// Returns `None` unless the character is an uppercase ASCII letter.
    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_uppercase().then_some(Self(c))
    }

    /// Returns the underlying letter.
    pub fn as_char(&self) -> char {
        self.0
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a character is not a valid series label.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("label must be a single uppercase letter A-Z, got {0:?}")]
pub struct InvalidLabel(pub char);

impl TryFrom<char> for Label {
    type Error = InvalidLabel;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Label::new(c).ok_or(InvalidLabel(c))
    }
}

impl From<Label> for char {
    fn from(label: Label) -> char {
        label.0
    }
}

/// A single data point in a time series.
///
/// The timestamp is in milliseconds since the Unix epoch (`i64`, supporting
/// pre-1970 dates) and the value is a 64-bit float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp in milliseconds since Unix epoch.
    pub timestamp_ms: i64,

    /// The sample value.
    pub value: f64,
}

impl Sample {
    /// Creates a new sample with the given timestamp and value.
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// The per-label input series for one derived-series evaluation.
///
/// The host fetches one series per chart query and hands them over keyed by
/// label. Samples need not be sorted; the engine orders timestamps itself
/// during alignment. When a series carries the same timestamp twice, the
/// first occurrence wins.
///
/// # Example
///
/// ```
/// use derived_metrics::{Label, Sample, SeriesSet};
///
/// let set = SeriesSet::new()
///     .with_series(Label::new('A').unwrap(), vec![Sample::new(1, 10.0)])
///     .with_series(Label::new('B').unwrap(), vec![Sample::new(1, 2.0)]);
///
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeriesSet {
    series: BTreeMap<Label, Vec<Sample>>,
}

impl SeriesSet {
    /// Creates an empty series set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series for the given label, builder style.
    pub fn with_series(mut self, label: Label, samples: Vec<Sample>) -> Self {
        self.insert(label, samples);
        self
    }

    /// Adds a series for the given label, replacing any previous one.
    pub fn insert(&mut self, label: Label, samples: Vec<Sample>) {
        self.series.insert(label, samples);
    }

    /// Returns the samples for a label, if present.
    pub fn get(&self, label: &Label) -> Option<&[Sample]> {
        self.series.get(label).map(|s| s.as_slice())
    }

    /// Iterates over the series in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, &[Sample])> {
        self.series.iter().map(|(label, s)| (label, s.as_slice()))
    }

    /// Number of series in the set.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True when the set holds no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_label_from_uppercase_letter() {
        let label = Label::new('A').unwrap();
        assert_eq!(label.as_char(), 'A');
        assert_eq!(label.to_string(), "A");
    }

    #[test]
    fn should_reject_non_uppercase_label() {
        assert_eq!(Label::new('a'), None);
        assert_eq!(Label::new('1'), None);
        assert_eq!(Label::new('$'), None);
        assert_eq!(Label::try_from('x'), Err(InvalidLabel('x')));
    }

    #[test]
    fn should_create_sample() {
        let sample = Sample::new(1700000000000, 42.5);
        assert_eq!(sample.timestamp_ms, 1700000000000);
        assert_eq!(sample.value, 42.5);
    }

    #[test]
    fn should_build_series_set() {
        let a = Label::new('A').unwrap();
        let b = Label::new('B').unwrap();
        let set = SeriesSet::new()
            .with_series(a, vec![Sample::new(1000, 0.5), Sample::new(2000, 0.6)])
            .with_series(b, vec![Sample::new(1000, 1.0)]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&a).unwrap().len(), 2);
        assert_eq!(set.get(&b).unwrap()[0].value, 1.0);
        assert!(set.get(&Label::new('C').unwrap()).is_none());
    }

    #[test]
    fn label_serializes_as_bare_letter() {
        let a = Label::new('A').unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"A\"");

        let parsed: Label = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(parsed, Label::new('B').unwrap());
        assert!(serde_json::from_str::<Label>("\"b\"").is_err());
    }
}
