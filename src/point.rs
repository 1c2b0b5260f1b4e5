//! Query points and weighted label distributions.
//!
//! A [`Point`] pairs an opaque feature vector with an identity and a
//! [`LabelDistribution`]: a weighted multiset over label strings. Multiple
//! simultaneous labels are allowed (e.g. for hierarchical classification).
//! The core never mutates a point during a query.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Weighted multiset over label strings.
///
/// Weights are non-negative and unnormalized; call
/// [`LabelDistribution::normalized`] for a distribution summing to 1.
/// Labels are kept in a `BTreeMap` so iteration order is deterministic,
/// which keeps tie handling reproducible across runs.
///
/// # Examples
///
/// ```
/// use clasificar::point::LabelDistribution;
///
/// let mut dist = LabelDistribution::new();
/// dist.add("cat", 3.0);
/// dist.add("dog", 1.0);
/// assert_eq!(dist.dominant_label(), Some("cat"));
/// assert!((dist.total() - 4.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelDistribution {
    weights: BTreeMap<String, f32>,
}

impl LabelDistribution {
    /// Creates an empty distribution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a distribution from `(label, weight)` pairs.
    ///
    /// Weights for repeated labels accumulate.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let mut dist = Self::new();
        for (label, weight) in pairs {
            dist.add(label, weight);
        }
        dist
    }

    /// Creates a distribution carrying a single label with weight 1.
    pub fn singleton(label: impl Into<String>) -> Self {
        Self::from_pairs([(label, 1.0)])
    }

    /// Adds `weight` to `label`. Negative weights are clamped to zero.
    pub fn add(&mut self, label: impl Into<String>, weight: f32) {
        *self.weights.entry(label.into()).or_insert(0.0) += weight.max(0.0);
    }

    /// Raw (unnormalized) weight of a label, zero if absent.
    #[must_use]
    pub fn weight_of(&self, label: &str) -> f32 {
        self.weights.get(label).copied().unwrap_or(0.0)
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.weights.values().sum()
    }

    /// True if no label carries any weight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Iterates `(label, raw weight)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.weights.iter().map(|(label, &w)| (label.as_str(), w))
    }

    /// Normalized `(label, share)` pairs summing to 1.
    ///
    /// Empty for an empty distribution or one whose total mass is zero.
    #[must_use]
    pub fn normalized(&self) -> Vec<(&str, f32)> {
        let total = self.total();
        if total <= 0.0 {
            return Vec::new();
        }
        self.weights
            .iter()
            .map(|(label, &w)| (label.as_str(), w / total))
            .collect()
    }

    /// Label with the highest weight, ties resolved by label order.
    #[must_use]
    pub fn dominant_label(&self) -> Option<&str> {
        self.weights
            .iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(label, _)| label.as_str())
    }

    /// Label with the highest weight among `labels`, or `None` if this
    /// distribution carries none of them.
    #[must_use]
    pub fn dominant_label_in(&self, labels: &BTreeSet<String>) -> Option<&str> {
        self.weights
            .iter()
            .filter(|(label, _)| labels.contains(*label))
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(label, _)| label.as_str())
    }
}

/// A query point: identity, opaque feature vector, weighted labels.
///
/// The label distribution is only consulted by prohibition models (e.g.
/// leave-one-out exclusion) and evaluation; classification itself reads
/// nothing but the features.
///
/// # Examples
///
/// ```
/// use clasificar::point::Point;
///
/// let p = Point::new("fragment_7", vec![0.2, 0.8]).with_label("cat", 1.0);
/// assert_eq!(p.id(), "fragment_7");
/// assert_eq!(p.features().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    id: String,
    features: Vec<f32>,
    labels: LabelDistribution,
}

impl Point {
    /// Creates an unlabeled point.
    pub fn new(id: impl Into<String>, features: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            features,
            labels: LabelDistribution::new(),
        }
    }

    /// Adds a label weight to the point.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>, weight: f32) -> Self {
        self.labels.add(label, weight);
        self
    }

    /// Replaces the whole label distribution.
    #[must_use]
    pub fn with_labels(mut self, labels: LabelDistribution) -> Self {
        self.labels = labels;
        self
    }

    /// Identity of the point.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Feature vector.
    #[must_use]
    pub fn features(&self) -> &[f32] {
        &self.features
    }

    /// Weighted label distribution.
    #[must_use]
    pub fn labels(&self) -> &LabelDistribution {
        &self.labels
    }
}
