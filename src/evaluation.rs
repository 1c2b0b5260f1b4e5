//! Batch evaluation of held-out points.
//!
//! Evaluating many labeled points is embarrassingly parallel: each query
//! is an independent read over the reference set, so workers classify
//! points concurrently and their per-worker tallies are merged afterward
//! without ordering requirements.
//!
//! Leave-one-out evaluation is this same entry point run against a
//! classifier carrying a
//! [`LeaveOneOutByLabel`](crate::prohibition::LeaveOneOutByLabel)
//! prohibition.

use crate::classifier::VotingClassifier;
use crate::error::{ClasificarError, Result};
use crate::measure::DissimilarityMeasure;
use crate::outcome::Assignment;
use crate::point::Point;
use crate::prohibition::ProhibitionModel;
use crate::voting::VoteOutcome;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-true-label tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelTally {
    /// Points carrying this true label.
    pub total: usize,
    /// Of those, points assigned this exact label.
    pub correct: usize,
    /// Of those, points rejected as unknown.
    pub unknown: usize,
}

/// Aggregated outcome counts over a batch of labeled points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    assigned: usize,
    correct: usize,
    unknown: usize,
    per_label: BTreeMap<String, LabelTally>,
}

impl EvaluationReport {
    /// Points that received a label (right or wrong).
    #[must_use]
    pub fn assigned(&self) -> usize {
        self.assigned
    }

    /// Points assigned their true label.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Points rejected as unknown.
    #[must_use]
    pub fn unknown(&self) -> usize {
        self.unknown
    }

    /// Total points evaluated.
    #[must_use]
    pub fn total(&self) -> usize {
        self.assigned + self.unknown
    }

    /// Fraction of assigned points that were assigned correctly.
    /// Zero when nothing was assigned.
    #[must_use]
    pub fn accuracy(&self) -> f32 {
        if self.assigned == 0 {
            0.0
        } else {
            self.correct as f32 / self.assigned as f32
        }
    }

    /// Fraction of all points rejected as unknown.
    #[must_use]
    pub fn unknown_rate(&self) -> f32 {
        if self.total() == 0 {
            0.0
        } else {
            self.unknown as f32 / self.total() as f32
        }
    }

    /// Per-true-label tallies in label order.
    pub fn per_label(&self) -> impl Iterator<Item = (&str, &LabelTally)> {
        self.per_label.iter().map(|(label, t)| (label.as_str(), t))
    }

    /// Folds another report into this one. Merging is commutative, so
    /// per-worker partials can arrive in any order.
    pub fn merge(&mut self, other: &EvaluationReport) {
        self.assigned += other.assigned;
        self.correct += other.correct;
        self.unknown += other.unknown;
        for (label, tally) in &other.per_label {
            let entry = self.per_label.entry(label.clone()).or_default();
            entry.total += tally.total;
            entry.correct += tally.correct;
            entry.unknown += tally.unknown;
        }
    }

    fn record(&mut self, truth: &str, verdict: &Assignment<VoteOutcome>) {
        let tally = self.per_label.entry(truth.to_string()).or_default();
        tally.total += 1;
        match verdict {
            Assignment::Matched(outcome) => {
                self.assigned += 1;
                if outcome.label == truth {
                    self.correct += 1;
                    tally.correct += 1;
                }
            }
            Assignment::Unknown(_) => {
                self.unknown += 1;
                tally.unknown += 1;
            }
        }
    }
}

/// Evaluates `classifier` over a batch of labeled points in parallel.
///
/// Each point's true label is its dominant label among `candidates`; the
/// same candidate set restricts the labels the vote may assign.
///
/// # Errors
///
/// Propagates fatal classification errors, and rejects points carrying no
/// label from the candidate set as a configuration error.
pub fn evaluate<M, P>(
    classifier: &VotingClassifier<M, P>,
    points: &[Point],
    candidates: &BTreeSet<String>,
) -> Result<EvaluationReport>
where
    M: DissimilarityMeasure,
    P: ProhibitionModel,
{
    points
        .par_iter()
        .map(|point| -> Result<EvaluationReport> {
            let truth = point.labels().dominant_label_in(candidates).ok_or_else(|| {
                ClasificarError::Other(format!(
                    "point '{}' carries no label from the candidate set",
                    point.id()
                ))
            })?;
            let verdict = classifier.classify_by_vote(point, Some(candidates))?;
            let mut partial = EvaluationReport::default();
            partial.record(truth, &verdict);
            Ok(partial)
        })
        .try_reduce(EvaluationReport::default, |mut merged, partial| {
            merged.merge(&partial);
            Ok(merged)
        })
}
