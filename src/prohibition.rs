//! Prohibition models: per-query cluster exclusion.
//!
//! A [`ProhibitionModel`] turns a query point into a [`ProhibitionFilter`]
//! that marks some reference clusters as excluded for that query. The two
//! shipped models are [`NoProhibition`] (serving) and
//! [`LeaveOneOutByLabel`] (cross-validation: exclude clusters whose
//! dominant label matches the point's held-out label).

use crate::point::Point;
use crate::reference::ReferenceCluster;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-query filter over reference clusters.
///
/// Derived once per point so that per-cluster checks stay cheap inside the
/// scan loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProhibitionFilter {
    /// Nothing is excluded.
    Permissive,
    /// Clusters whose dominant label equals this label are excluded.
    ExcludeLabel(String),
}

impl ProhibitionFilter {
    /// True if `cluster` is excluded for this query.
    #[must_use]
    pub fn excludes(&self, cluster: &ReferenceCluster) -> bool {
        match self {
            ProhibitionFilter::Permissive => false,
            ProhibitionFilter::ExcludeLabel(label) => {
                cluster.dominant_label() == Some(label.as_str())
            }
        }
    }
}

/// Produces a per-query [`ProhibitionFilter`] for a point.
pub trait ProhibitionModel: Send + Sync {
    /// The filter to apply while scanning clusters for `point`.
    fn filter_for(&self, point: &Point) -> ProhibitionFilter;
}

/// Excludes nothing; the model used when serving queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoProhibition;

impl ProhibitionModel for NoProhibition {
    fn filter_for(&self, _point: &Point) -> ProhibitionFilter {
        ProhibitionFilter::Permissive
    }
}

/// Leave-one-out exclusion by label.
///
/// For each query point, the point's dominant label among the training
/// label set is held out: every cluster dominated by that label is
/// excluded. Points carrying none of the training labels get a permissive
/// filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveOneOutByLabel {
    labels: BTreeSet<String>,
}

impl LeaveOneOutByLabel {
    /// Creates the model from the set of labels seen during training.
    #[must_use]
    pub fn new(labels: BTreeSet<String>) -> Self {
        Self { labels }
    }

    /// The training label set.
    #[must_use]
    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }
}

impl ProhibitionModel for LeaveOneOutByLabel {
    fn filter_for(&self, point: &Point) -> ProhibitionFilter {
        match point.labels().dominant_label_in(&self.labels) {
            Some(label) => ProhibitionFilter::ExcludeLabel(label.to_string()),
            None => ProhibitionFilter::Permissive,
        }
    }
}
