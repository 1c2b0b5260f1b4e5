//! Classifier facades: the query entry points.
//!
//! Two classifiers wrap the scan/score/vote machinery:
//! - [`NearestClusterClassifier`]: single best-match assignment with
//!   second-best tracking (`classify_single`)
//! - [`VotingClassifier`]: weighted voting across the k nearest references
//!   (`classify_by_vote`)
//!
//! Both are pure, side-effect-free reads over the reference set: queries
//! may run concurrently as long as no structural mutation is in flight.
//! Training and centroid updates happen outside this crate, before
//! queries are served.
//!
//! # Example
//!
//! ```
//! use clasificar::classifier::VotingClassifier;
//! use clasificar::measure::Euclidean;
//! use clasificar::point::{LabelDistribution, Point};
//! use clasificar::reference::ReferenceSet;
//!
//! let mut refs = ReferenceSet::new();
//! refs.push(vec![0.0, 0.0], LabelDistribution::singleton("cat"));
//! refs.push(vec![0.5, 0.5], LabelDistribution::singleton("cat"));
//! refs.push(vec![5.0, 5.0], LabelDistribution::singleton("dog"));
//!
//! let classifier = VotingClassifier::new(refs, Euclidean, 3);
//! let verdict = classifier
//!     .classify_by_vote(&Point::new("q", vec![0.2, 0.2]), None)
//!     .expect("valid configuration");
//! assert_eq!(verdict.matched().expect("confident match").label, "cat");
//! ```

use crate::error::{ClasificarError, Result};
use crate::measure::DissimilarityMeasure;
use crate::outcome::Assignment;
use crate::point::Point;
use crate::prohibition::{NoProhibition, ProhibitionModel};
use crate::reference::ReferenceSet;
use crate::scorer::MultiNeighborScorer;
use crate::selector::SingleMatchSelector;
use crate::voting::{
    select_label, ClusterMove, TieBreakConfig, VoteAggregator, VoteOutcome, VotingPolicy,
};
use std::collections::BTreeSet;

/// Pure nearest-neighbor classifier: assigns a point to its single
/// best-matching reference cluster.
#[derive(Debug, Clone)]
pub struct NearestClusterClassifier<M, P = NoProhibition> {
    references: ReferenceSet,
    measure: M,
    prohibition: P,
    unknown_threshold: f32,
}

impl<M: DissimilarityMeasure> NearestClusterClassifier<M> {
    /// Creates a classifier with no prohibition and no unknown threshold.
    #[must_use]
    pub fn new(references: ReferenceSet, measure: M) -> Self {
        Self {
            references,
            measure,
            prohibition: NoProhibition,
            unknown_threshold: f32::INFINITY,
        }
    }
}

impl<M, P> NearestClusterClassifier<M, P>
where
    M: DissimilarityMeasure,
    P: ProhibitionModel,
{
    /// Sets the unknown-distance threshold: a best score above it rejects
    /// the query as unknown.
    #[must_use]
    pub fn with_unknown_threshold(mut self, threshold: f32) -> Self {
        self.unknown_threshold = threshold;
        self
    }

    /// Installs a prohibition model (e.g. leave-one-out exclusion).
    #[must_use]
    pub fn with_prohibition<Q: ProhibitionModel>(
        self,
        prohibition: Q,
    ) -> NearestClusterClassifier<M, Q> {
        NearestClusterClassifier {
            references: self.references,
            measure: self.measure,
            prohibition,
            unknown_threshold: self.unknown_threshold,
        }
    }

    /// The reference set queries run against.
    #[must_use]
    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// Assigns `point` to the lowest-scoring admissible cluster, with the
    /// second-lowest score as a confidence margin.
    ///
    /// # Errors
    ///
    /// Fatal tier only: empty reference set, or no admissible cluster at
    /// all. "No good cluster" is the `Unknown` outcome, not an error.
    pub fn classify_single(&self, point: &Point) -> Result<Assignment<ClusterMove>> {
        validate_threshold(self.unknown_threshold)?;
        SingleMatchSelector::new(
            &self.references,
            &self.measure,
            &self.prohibition,
            self.unknown_threshold,
        )
        .best_match(point)
    }
}

/// k-NN-style classifier: weighted voting across the nearest references.
#[derive(Debug, Clone)]
pub struct VotingClassifier<M, P = NoProhibition> {
    references: ReferenceSet,
    measure: M,
    prohibition: P,
    policy: VotingPolicy,
    max_neighbors: usize,
    unknown_threshold: f32,
    tie_break: TieBreakConfig,
}

impl<M: DissimilarityMeasure> VotingClassifier<M> {
    /// Creates a direct-policy voting classifier over `max_neighbors`
    /// neighbors, with rejection deferred to the vote stage (infinite
    /// unknown threshold).
    #[must_use]
    pub fn new(references: ReferenceSet, measure: M, max_neighbors: usize) -> Self {
        Self {
            references,
            measure,
            prohibition: NoProhibition,
            policy: VotingPolicy::Direct,
            max_neighbors,
            unknown_threshold: f32::INFINITY,
            tie_break: TieBreakConfig::default(),
        }
    }
}

impl<M, P> VotingClassifier<M, P>
where
    M: DissimilarityMeasure,
    P: ProhibitionModel,
{
    /// Sets the voting policy.
    #[must_use]
    pub fn with_policy(mut self, policy: VotingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the number of neighbors counted into the vote.
    #[must_use]
    pub fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    /// Sets the unknown-distance threshold applied while scoring moves.
    #[must_use]
    pub fn with_unknown_threshold(mut self, threshold: f32) -> Self {
        self.unknown_threshold = threshold;
        self
    }

    /// Sets the vote-ratio tie threshold.
    #[must_use]
    pub fn with_vote_tie_threshold(mut self, threshold: f32) -> Self {
        self.tie_break.vote_tie_threshold = threshold;
        self
    }

    /// Sets the distance-ratio tie band edge.
    #[must_use]
    pub fn with_distance_tie_threshold(mut self, threshold: f32) -> Self {
        self.tie_break.distance_tie_threshold = threshold;
        self
    }

    /// Sets the minimum vote proportion for a winning label.
    #[must_use]
    pub fn with_min_vote_proportion(mut self, proportion: f32) -> Self {
        self.tie_break.min_vote_proportion = proportion;
        self
    }

    /// Installs a prohibition model (e.g. leave-one-out exclusion).
    #[must_use]
    pub fn with_prohibition<Q: ProhibitionModel>(self, prohibition: Q) -> VotingClassifier<M, Q> {
        VotingClassifier {
            references: self.references,
            measure: self.measure,
            prohibition,
            policy: self.policy,
            max_neighbors: self.max_neighbors,
            unknown_threshold: self.unknown_threshold,
            tie_break: self.tie_break,
        }
    }

    /// The reference set queries run against.
    #[must_use]
    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// The active voting policy.
    #[must_use]
    pub fn policy(&self) -> VotingPolicy {
        self.policy
    }

    fn validate(&self) -> Result<()> {
        if self.max_neighbors == 0 {
            return Err(ClasificarError::invalid_hyperparameter(
                "max_neighbors",
                self.max_neighbors,
                ">= 1",
            ));
        }
        validate_threshold(self.unknown_threshold)?;
        let tb = &self.tie_break;
        if !tb.vote_tie_threshold.is_finite() || tb.vote_tie_threshold <= 0.0 {
            return Err(ClasificarError::invalid_hyperparameter(
                "vote_tie_threshold",
                tb.vote_tie_threshold,
                "> 0 and finite",
            ));
        }
        if !(tb.distance_tie_threshold > 0.0 && tb.distance_tie_threshold <= 1.0) {
            return Err(ClasificarError::invalid_hyperparameter(
                "distance_tie_threshold",
                tb.distance_tie_threshold,
                "in (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&tb.min_vote_proportion) {
            return Err(ClasificarError::invalid_hyperparameter(
                "min_vote_proportion",
                tb.min_vote_proportion,
                "in [0, 1]",
            ));
        }
        Ok(())
    }

    /// Classifies `point` by weighted voting across the nearest
    /// references, optionally restricted to `candidate_labels` (typically
    /// the labels seen during training).
    ///
    /// # Errors
    ///
    /// Fatal tier only: invalid hyperparameters, empty reference set, no
    /// admissible cluster, or a broken ordering invariant. All rejection
    /// outcomes come back as `Assignment::Unknown`.
    pub fn classify_by_vote(
        &self,
        point: &Point,
        candidate_labels: Option<&BTreeSet<String>>,
    ) -> Result<Assignment<VoteOutcome>> {
        self.validate()?;

        let scorer = MultiNeighborScorer::new(
            &self.references,
            &self.measure,
            &self.prohibition,
            self.policy,
            self.unknown_threshold,
        );
        let moves = match scorer.scored_moves(point)? {
            Assignment::Matched(moves) => moves,
            Assignment::Unknown(reason) => return Ok(Assignment::Unknown(reason)),
        };

        let result = VoteAggregator::new(&self.references).aggregate(&moves, self.max_neighbors)?;
        Ok(select_label(
            &result,
            self.policy,
            &self.tie_break,
            candidate_labels,
        ))
    }
}

fn validate_threshold(threshold: f32) -> Result<()> {
    if threshold.is_nan() || threshold <= 0.0 {
        return Err(ClasificarError::invalid_hyperparameter(
            "unknown_threshold",
            threshold,
            "> 0",
        ));
    }
    Ok(())
}


#[cfg(test)]
mod tests_vote_contract;
