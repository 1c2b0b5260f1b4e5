//! Labeled reference clusters.
//!
//! A [`ReferenceCluster`] is a labeled prototype (centroid or raw training
//! sample) against which new points are compared. A [`ReferenceSet`] owns
//! the clusters, assigns their ids, and derives the per-cluster priors that
//! prior-aware measures and voting policies consume.

use crate::point::LabelDistribution;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A labeled prototype: id, centroid, derived label distribution.
///
/// Created during training, treated as immutable during a query. The label
/// distribution is a weighted multiset over the labels of the members this
/// cluster represents; consumers read it normalized (summing to 1) through
/// [`ReferenceCluster::label_distribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCluster {
    id: usize,
    centroid: Vec<f32>,
    labels: LabelDistribution,
}

impl ReferenceCluster {
    /// Id, unique within the owning [`ReferenceSet`].
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Centroid feature vector.
    #[must_use]
    pub fn centroid(&self) -> &[f32] {
        &self.centroid
    }

    /// Raw label weights (unnormalized).
    #[must_use]
    pub fn labels(&self) -> &LabelDistribution {
        &self.labels
    }

    /// Normalized `(label, share)` pairs summing to 1; empty if the cluster
    /// has no labeled members yet.
    #[must_use]
    pub fn label_distribution(&self) -> Vec<(&str, f32)> {
        self.labels.normalized()
    }

    /// Label this cluster predominantly represents.
    #[must_use]
    pub fn dominant_label(&self) -> Option<&str> {
        self.labels.dominant_label()
    }
}

/// The collection of labeled reference clusters, read-only during a query.
///
/// Ids are assigned on insertion and double as indices. Cluster priors can
/// be supplied externally per cluster ([`ReferenceSet::set_prior`]); absent
/// that, priors are uniform. For the inverted-score voting policy, label
/// priors are derived from cluster population counts instead
/// ([`ReferenceSet::population_prior`]).
///
/// # Examples
///
/// ```
/// use clasificar::point::LabelDistribution;
/// use clasificar::reference::ReferenceSet;
///
/// let mut refs = ReferenceSet::new();
/// let id = refs.push(vec![1.0, 0.0], LabelDistribution::singleton("cat"));
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs.get(id).unwrap().dominant_label(), Some("cat"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSet {
    clusters: Vec<ReferenceCluster>,
    explicit_priors: BTreeMap<usize, f32>,
}

impl ReferenceSet {
    /// Creates an empty reference set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cluster and returns its id.
    pub fn push(&mut self, centroid: Vec<f32>, labels: LabelDistribution) -> usize {
        let id = self.clusters.len();
        self.clusters.push(ReferenceCluster {
            id,
            centroid,
            labels,
        });
        id
    }

    /// Number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True if the set holds no clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Looks a cluster up by id.
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&ReferenceCluster> {
        self.clusters.get(id)
    }

    /// Iterates clusters in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceCluster> {
        self.clusters.iter()
    }

    /// Supplies an external prior weight for a cluster.
    ///
    /// Returns false if the id is unknown. Negative priors are clamped to
    /// zero.
    pub fn set_prior(&mut self, id: usize, prior: f32) -> bool {
        if id >= self.clusters.len() {
            return false;
        }
        self.explicit_priors.insert(id, prior.max(0.0));
        true
    }

    /// Prior weight of a cluster: the externally supplied value if set,
    /// otherwise uniform `1 / len`.
    #[must_use]
    pub fn prior_of(&self, id: usize) -> f32 {
        if let Some(&prior) = self.explicit_priors.get(&id) {
            return prior;
        }
        if self.clusters.is_empty() {
            0.0
        } else {
            1.0 / self.clusters.len() as f32
        }
    }

    /// Population-derived prior for a cluster: the fraction of clusters in
    /// the set whose dominant label matches this cluster's dominant label.
    ///
    /// This is the multinomial-over-labels prior the inverted-score voting
    /// policy uses; it is never supplied externally.
    #[must_use]
    pub fn population_prior(&self, id: usize) -> f32 {
        let Some(cluster) = self.get(id) else {
            return 0.0;
        };
        let Some(label) = cluster.dominant_label() else {
            return 0.0;
        };
        let carriers = self
            .clusters
            .iter()
            .filter(|c| c.dominant_label() == Some(label))
            .count();
        carriers as f32 / self.clusters.len() as f32
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a ReferenceCluster;
    type IntoIter = std::slice::Iter<'a, ReferenceCluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}
