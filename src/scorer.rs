//! Multi-neighbor scoring.
//!
//! Scores a point against every admissible reference cluster, maps each
//! score through the active [`VotingPolicy`], keeps the moves passing the
//! unknown threshold, and orders them by ascending distance for the vote
//! aggregator.

use crate::error::{ClasificarError, Result};
use crate::measure::{score_against, DissimilarityMeasure};
use crate::outcome::{Assignment, Rejection};
use crate::point::Point;
use crate::prohibition::ProhibitionModel;
use crate::reference::ReferenceSet;
use crate::voting::{ClusterMove, VotingPolicy};

/// Scores a point against all admissible clusters, producing an
/// ascending-ordered move sequence.
#[derive(Debug, Clone, Copy)]
pub struct MultiNeighborScorer<'a, M, P> {
    references: &'a ReferenceSet,
    measure: &'a M,
    prohibition: &'a P,
    policy: VotingPolicy,
    unknown_threshold: f32,
}

impl<'a, M, P> MultiNeighborScorer<'a, M, P>
where
    M: DissimilarityMeasure,
    P: ProhibitionModel,
{
    /// Creates a scorer over `references`.
    ///
    /// An infinite `unknown_threshold` retains every move; that is the
    /// configuration used when rejection is deferred to the vote stage.
    #[must_use]
    pub fn new(
        references: &'a ReferenceSet,
        measure: &'a M,
        prohibition: &'a P,
        policy: VotingPolicy,
        unknown_threshold: f32,
    ) -> Self {
        Self {
            references,
            measure,
            prohibition,
            policy,
            unknown_threshold,
        }
    }

    /// Scores `point` against every admissible cluster and returns the
    /// surviving moves in ascending `best_distance` order. Ties at equal
    /// distance are all present, in unspecified relative order.
    ///
    /// Calling this again restarts the scan; the sequence is bounded by
    /// the reference-set size.
    ///
    /// # Errors
    ///
    /// [`ClasificarError::EmptyReferenceSet`] for an empty set;
    /// [`ClasificarError::NoClusterAvailable`] when no cluster was
    /// admissible at all. Zero moves surviving the threshold is the
    /// recoverable [`Rejection::NoCandidates`] outcome instead.
    pub fn scored_moves(&self, point: &Point) -> Result<Assignment<Vec<ClusterMove>>> {
        if self.references.is_empty() {
            return Err(ClasificarError::EmptyReferenceSet);
        }

        let filter = self.prohibition.filter_for(point);
        let mut any_admissible = false;
        let mut moves = Vec::new();

        for cluster in self.references.iter() {
            if filter.excludes(cluster) {
                continue;
            }
            let prior = self.policy.cluster_prior(self.references, cluster.id());
            let Some(score) = score_against(self.measure, point, cluster, prior) else {
                continue;
            };
            any_admissible = true;

            let mv = self.policy.make_move(cluster.id(), score);
            if mv.best_distance < self.unknown_threshold {
                moves.push(mv);
            }
        }

        if !any_admissible {
            return Err(ClasificarError::NoClusterAvailable {
                point: point.id().to_string(),
            });
        }
        if moves.is_empty() {
            return Ok(Assignment::Unknown(Rejection::NoCandidates));
        }

        moves.sort_by(|a, b| a.best_distance.total_cmp(&b.best_distance));
        Ok(Assignment::Matched(moves))
    }
}
