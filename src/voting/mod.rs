//! Vote aggregation across the k nearest reference clusters.
//!
//! This is the decision core of the crate:
//! - [`ClusterMove`]: an ephemeral, per-query comparison result
//! - [`VotingPolicy`]: what "vote weight" and "distance" mean for a match
//! - [`VoteAggregator`]: accumulates per-label vote mass and weighted
//!   distance contributions from an ascending-ordered move sequence
//! - [`select_label`]: best/second-best ranking and the tie-break cascades
//!
//! The plain k-NN cascade checks vote ratio, then distance ratio, then a
//! minimum vote proportion. The inverted-score (TACOA-style) policy uses a
//! single vote-ratio check; the asymmetry between the two is deliberate —
//! they are historically distinct published methods and are not unified.

use crate::error::{ClasificarError, Result};
use crate::outcome::{Assignment, Rejection};
use crate::reference::ReferenceSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Result of comparing one point against the reference set (or one
/// cluster of it). Created fresh for every query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMove {
    /// Id of the matched cluster.
    pub cluster: usize,
    /// Distance-like score; smaller is better.
    pub best_distance: f32,
    /// Second-lowest score seen during a full scan, if any. Used by
    /// single-match callers to assess the confidence margin.
    pub second_best_distance: Option<f32>,
    /// Vote mass this move contributes during aggregation.
    pub vote_weight: f32,
}

/// Strategy turning a raw measured score into a move's
/// `(best_distance, vote_weight)` pair. Selected once per classifier and
/// never mixed within a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingPolicy {
    /// Plain k-NN: `best_distance = score`, `vote_weight = 1`. Vote mass is
    /// driven purely by the clusters' label distributions.
    Direct,
    /// TACOA-style score inversion: the measure is score-like (bigger is
    /// better), so `vote_weight = score` and `best_distance = 1 / score`.
    InvertedScore,
}

impl VotingPolicy {
    /// Builds the move for a cluster scored at `score`.
    ///
    /// Under [`VotingPolicy::InvertedScore`] a zero raw score maps to an
    /// infinite distance and zero votes; strict threshold retention drops
    /// it even when the threshold is infinite.
    #[must_use]
    pub fn make_move(self, cluster: usize, score: f32) -> ClusterMove {
        match self {
            VotingPolicy::Direct => ClusterMove {
                cluster,
                best_distance: score,
                second_best_distance: None,
                vote_weight: 1.0,
            },
            VotingPolicy::InvertedScore => {
                let (best_distance, vote_weight) = if score > 0.0 {
                    (score.recip(), score)
                } else {
                    (f32::INFINITY, 0.0)
                };
                ClusterMove {
                    cluster,
                    best_distance,
                    second_best_distance: None,
                    vote_weight,
                }
            }
        }
    }

    /// The cluster prior this policy feeds to prior-aware measures:
    /// externally supplied (or uniform) priors for the direct policy,
    /// label-population priors for the inverted one.
    #[must_use]
    pub fn cluster_prior(self, references: &ReferenceSet, cluster: usize) -> f32 {
        match self {
            VotingPolicy::Direct => references.prior_of(cluster),
            VotingPolicy::InvertedScore => references.population_prior(cluster),
        }
    }
}

/// One label-share contribution from a consumed move.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Contribution {
    /// The label's normalized share of the contributing cluster.
    weight: f32,
    /// The move's distance.
    distance: f32,
}

/// Per-query vote accumulator: unnormalized vote mass per label plus the
/// contributions that back each label's weighted-average distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VotingResult {
    votes: BTreeMap<String, f32>,
    contributions: BTreeMap<String, Vec<Contribution>>,
    consumed: usize,
}

/// A label candidate under the ranking order: descending vote mass,
/// ascending weighted-average distance.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCandidate {
    /// The candidate label.
    pub label: String,
    /// Accumulated (unnormalized) vote mass.
    pub votes: f32,
    /// Weighted average of contributing distances.
    pub weighted_distance: f32,
}

impl VotingResult {
    /// Unnormalized vote mass of a label.
    #[must_use]
    pub fn vote_mass(&self, label: &str) -> f32 {
        self.votes.get(label).copied().unwrap_or(0.0)
    }

    /// Total vote mass across all labels.
    #[must_use]
    pub fn total_mass(&self) -> f32 {
        self.votes.values().sum()
    }

    /// Normalized vote proportion of a label, in `[0, 1]`.
    #[must_use]
    pub fn proportion(&self, label: &str) -> f32 {
        let total = self.total_mass();
        if total <= 0.0 {
            0.0
        } else {
            self.vote_mass(label) / total
        }
    }

    /// Weighted-average contributing distance of a label:
    /// `sum(weight * distance) / sum(weight)`. `None` if the label has no
    /// contributions — such a label cannot be a candidate.
    #[must_use]
    pub fn weighted_distance(&self, label: &str) -> Option<f32> {
        let contributions = self.contributions.get(label)?;
        let weight_sum: f32 = contributions.iter().map(|c| c.weight).sum();
        if weight_sum <= 0.0 {
            return None;
        }
        let weighted: f32 = contributions.iter().map(|c| c.weight * c.distance).sum();
        Some(weighted / weight_sum)
    }

    /// Number of moves consumed into this result.
    #[must_use]
    pub fn moves_consumed(&self) -> usize {
        self.consumed
    }

    /// Labels holding any vote mass, in label order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.votes.keys().map(String::as_str)
    }

    /// Candidate labels ranked primarily by descending vote mass and
    /// secondarily by ascending weighted-average distance. Restricted to
    /// `admissible` when given (e.g. only labels seen during training).
    /// Labels without positive vote mass or without contributions are not
    /// candidates.
    #[must_use]
    pub fn ranked_candidates(&self, admissible: Option<&BTreeSet<String>>) -> Vec<LabelCandidate> {
        let mut candidates: Vec<LabelCandidate> = self
            .votes
            .iter()
            .filter(|(label, &votes)| {
                votes > 0.0 && admissible.map_or(true, |set| set.contains(*label))
            })
            .filter_map(|(label, &votes)| {
                self.weighted_distance(label).map(|weighted_distance| LabelCandidate {
                    label: label.clone(),
                    votes,
                    weighted_distance,
                })
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.votes
                .total_cmp(&a.votes)
                .then(a.weighted_distance.total_cmp(&b.weighted_distance))
        });
        candidates
    }
}

/// Accumulates an ascending-ordered move sequence into a [`VotingResult`].
#[derive(Debug, Clone, Copy)]
pub struct VoteAggregator<'a> {
    references: &'a ReferenceSet,
}

impl<'a> VoteAggregator<'a> {
    /// Creates an aggregator over a reference set.
    #[must_use]
    pub fn new(references: &'a ReferenceSet) -> Self {
        Self { references }
    }

    /// Consumes up to `max_neighbors` moves in ascending-distance order.
    ///
    /// Each consumed move adds its cluster's full label distribution to the
    /// vote tally, scaled by the move's vote weight, and records one
    /// contribution per `(label, share)` pair for the label's
    /// weighted-average distance.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::OrderingViolation`] if the sequence is
    /// not non-decreasing (an internal algorithm bug), and
    /// [`ClasificarError::UnknownCluster`] if a move references an id
    /// absent from the reference set.
    pub fn aggregate(&self, moves: &[ClusterMove], max_neighbors: usize) -> Result<VotingResult> {
        let mut result = VotingResult::default();
        let mut previous = f32::NEG_INFINITY;

        for mv in moves.iter().take(max_neighbors) {
            if mv.best_distance < previous {
                return Err(ClasificarError::OrderingViolation {
                    previous,
                    current: mv.best_distance,
                });
            }
            previous = mv.best_distance;

            let cluster = self
                .references
                .get(mv.cluster)
                .ok_or(ClasificarError::UnknownCluster { id: mv.cluster })?;

            for (label, share) in cluster.label_distribution() {
                *result.votes.entry(label.to_string()).or_insert(0.0) += share * mv.vote_weight;
                result
                    .contributions
                    .entry(label.to_string())
                    .or_default()
                    .push(Contribution {
                        weight: share,
                        distance: mv.best_distance,
                    });
            }
            result.consumed += 1;
        }

        Ok(result)
    }
}

/// Tie-break thresholds for label selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TieBreakConfig {
    /// Vote-ratio threshold: a second/best vote ratio at or above this
    /// means the votes are too close to call on their own.
    pub vote_tie_threshold: f32,
    /// Distance-ratio band edge in `(0, 1]`: a second/best weighted
    /// distance ratio strictly inside
    /// `(distance_tie_threshold, 1 / distance_tie_threshold)` means the
    /// candidates are indistinguishable.
    pub distance_tie_threshold: f32,
    /// Minimum normalized vote proportion for the winning label.
    pub min_vote_proportion: f32,
}

impl Default for TieBreakConfig {
    fn default() -> Self {
        Self {
            vote_tie_threshold: 0.8,
            distance_tie_threshold: 0.95,
            min_vote_proportion: 0.0,
        }
    }
}

/// The vote-stage verdict for a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteOutcome {
    /// Winning label.
    pub label: String,
    /// Unnormalized vote mass of the winner.
    pub votes: f32,
    /// Winner's vote mass normalized by the total, in `[0, 1]`.
    pub proportion: f32,
    /// Winner's weighted-average contributing distance.
    pub weighted_distance: f32,
    /// Second-best label, if one existed.
    pub runner_up: Option<String>,
}

/// Selects the best label from an aggregated vote, applying the policy's
/// tie-break cascade.
///
/// Direct (plain k-NN) cascade:
/// 1. vote ratio below `vote_tie_threshold`: accept the top label;
/// 2. otherwise, equal weighted distances or a distance ratio strictly
///    inside the tie band reject the query as indistinguishable;
/// 3. otherwise the candidate with the smaller weighted distance wins;
/// 4. a winner whose vote proportion is below `min_vote_proportion` is
///    rejected regardless.
///
/// Inverted-score cascade: a single vote-ratio check; exceeding
/// `vote_tie_threshold` rejects, otherwise the top label wins
/// unconditionally.
#[must_use]
pub fn select_label(
    result: &VotingResult,
    policy: VotingPolicy,
    config: &TieBreakConfig,
    admissible: Option<&BTreeSet<String>>,
) -> Assignment<VoteOutcome> {
    let ranked = result.ranked_candidates(admissible);
    let Some(best) = ranked.first() else {
        return Assignment::Unknown(Rejection::NoCandidates);
    };
    let second = ranked.get(1);

    match policy {
        VotingPolicy::InvertedScore => {
            if let Some(second) = second {
                let vote_ratio = second.votes / best.votes;
                if vote_ratio > config.vote_tie_threshold {
                    debug!(
                        best = best.label.as_str(),
                        second = second.label.as_str(),
                        vote_ratio,
                        "vote ratio above threshold, rejecting as unknown"
                    );
                    return Assignment::Unknown(Rejection::Indistinguishable);
                }
            }
            Assignment::Matched(outcome_for(best, second, result))
        }
        VotingPolicy::Direct => {
            let mut winner = best;
            let mut runner_up = second;
            if let Some(second) = second {
                let vote_ratio = second.votes / best.votes;
                if vote_ratio >= config.vote_tie_threshold {
                    // Votes are too close to call; fall back to distances.
                    // Exactly equal distances are always a tie, covering the
                    // 0/0 case where the ratio is NaN and the band check
                    // alone would pass the query through.
                    let distance_ratio = second.weighted_distance / best.weighted_distance;
                    let min_ratio = config.distance_tie_threshold;
                    let max_ratio = config.distance_tie_threshold.recip();
                    if second.weighted_distance == best.weighted_distance
                        || (distance_ratio > min_ratio && distance_ratio < max_ratio)
                    {
                        debug!(
                            best = best.label.as_str(),
                            second = second.label.as_str(),
                            vote_ratio,
                            distance_ratio,
                            "distance ratio inside tie band, rejecting as unknown"
                        );
                        return Assignment::Unknown(Rejection::Indistinguishable);
                    }
                    if second.weighted_distance < best.weighted_distance {
                        winner = second;
                        runner_up = Some(best);
                    }
                }
            }
            let outcome = outcome_for(winner, runner_up, result);
            if outcome.proportion < config.min_vote_proportion {
                debug!(
                    label = outcome.label.as_str(),
                    proportion = outcome.proportion,
                    "vote proportion below minimum, rejecting as unknown"
                );
                return Assignment::Unknown(Rejection::BelowMinimumProportion);
            }
            Assignment::Matched(outcome)
        }
    }
}

fn outcome_for(
    winner: &LabelCandidate,
    runner_up: Option<&LabelCandidate>,
    result: &VotingResult,
) -> VoteOutcome {
    VoteOutcome {
        label: winner.label.clone(),
        votes: winner.votes,
        proportion: result.proportion(&winner.label),
        weighted_distance: winner.weighted_distance,
        runner_up: runner_up.map(|c| c.label.clone()),
    }
}
