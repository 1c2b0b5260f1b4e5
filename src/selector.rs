//! Single best-match selection.
//!
//! Scans the reference set once and returns the lowest- and
//! second-lowest-scoring admissible clusters for a point, or a structured
//! rejection when the best score is not good enough.

use crate::error::{ClasificarError, Result};
use crate::measure::{score_against, DissimilarityMeasure};
use crate::outcome::{Assignment, Rejection};
use crate::point::Point;
use crate::prohibition::ProhibitionModel;
use crate::reference::ReferenceSet;
use crate::voting::ClusterMove;

/// Linear best/second-best scan over a reference set.
///
/// Borrowed per query; holds no mutable state, so concurrent queries over
/// the same reference set are safe.
#[derive(Debug, Clone, Copy)]
pub struct SingleMatchSelector<'a, M, P> {
    references: &'a ReferenceSet,
    measure: &'a M,
    prohibition: &'a P,
    unknown_threshold: f32,
}

impl<'a, M, P> SingleMatchSelector<'a, M, P>
where
    M: DissimilarityMeasure,
    P: ProhibitionModel,
{
    /// Creates a selector over `references`.
    #[must_use]
    pub fn new(
        references: &'a ReferenceSet,
        measure: &'a M,
        prohibition: &'a P,
        unknown_threshold: f32,
    ) -> Self {
        Self {
            references,
            measure,
            prohibition,
            unknown_threshold,
        }
    }

    /// Returns the single lowest-scoring admissible cluster for `point`,
    /// with the second-lowest score as a confidence margin.
    ///
    /// Equal scores update the running best, so the last cluster scanned
    /// wins an exact tie. Clusters whose measure evaluation fails are
    /// skipped with a warning. A best score above the unknown threshold is
    /// the expected [`Rejection::DistanceAboveThreshold`] outcome.
    ///
    /// # Errors
    ///
    /// [`ClasificarError::EmptyReferenceSet`] for an empty set, and
    /// [`ClasificarError::NoClusterAvailable`] when every cluster was
    /// prohibited or failed — both configuration errors, not unknowns.
    pub fn best_match(&self, point: &Point) -> Result<Assignment<ClusterMove>> {
        if self.references.is_empty() {
            return Err(ClasificarError::EmptyReferenceSet);
        }

        let filter = self.prohibition.filter_for(point);
        let mut best: Option<(usize, f32)> = None;
        let mut second_best = f32::INFINITY;

        for cluster in self.references.iter() {
            if filter.excludes(cluster) {
                continue;
            }
            let prior = self.references.prior_of(cluster.id());
            let Some(score) = score_against(self.measure, point, cluster, prior) else {
                continue;
            };

            match best {
                None => best = Some((cluster.id(), score)),
                Some((_, best_score)) if score <= best_score => {
                    second_best = best_score;
                    best = Some((cluster.id(), score));
                }
                Some(_) if score < second_best => second_best = score,
                Some(_) => {}
            }
        }

        let Some((cluster, best_distance)) = best else {
            return Err(ClasificarError::NoClusterAvailable {
                point: point.id().to_string(),
            });
        };

        if best_distance > self.unknown_threshold {
            return Ok(Assignment::Unknown(Rejection::DistanceAboveThreshold));
        }

        Ok(Assignment::Matched(ClusterMove {
            cluster,
            best_distance,
            second_best_distance: second_best.is_finite().then_some(second_best),
            vote_weight: 1.0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Euclidean;
    use crate::point::LabelDistribution;
    use crate::prohibition::{LeaveOneOutByLabel, NoProhibition};
    use std::collections::BTreeSet;

    fn cat_dog_refs() -> ReferenceSet {
        let mut refs = ReferenceSet::new();
        refs.push(vec![1.0, 0.0], LabelDistribution::singleton("cat")); // id 0
        refs.push(vec![5.0, 0.0], LabelDistribution::singleton("dog")); // id 1
        refs
    }

    #[test]
    fn test_best_and_second_best() {
        let refs = cat_dog_refs();
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &NoProhibition, 10.0);
        let point = Point::new("p", vec![0.0, 0.0]);

        let mv = selector.best_match(&point).unwrap().matched().unwrap();
        assert_eq!(mv.cluster, 0);
        assert!((mv.best_distance - 1.0).abs() < 1e-6);
        assert!((mv.second_best_distance.unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_above_threshold() {
        let refs = cat_dog_refs();
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &NoProhibition, 0.5);
        let point = Point::new("p", vec![0.0, 0.0]);

        let verdict = selector.best_match(&point).unwrap();
        assert_eq!(verdict.rejection(), Some(Rejection::DistanceAboveThreshold));
    }

    #[test]
    fn test_empty_reference_set_is_fatal() {
        let refs = ReferenceSet::new();
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &NoProhibition, 10.0);
        let point = Point::new("p", vec![0.0, 0.0]);

        let err = selector.best_match(&point).unwrap_err();
        assert!(matches!(err, ClasificarError::EmptyReferenceSet));
    }

    #[test]
    fn test_all_prohibited_is_fatal() {
        let mut refs = ReferenceSet::new();
        refs.push(vec![1.0, 0.0], LabelDistribution::singleton("cat"));
        let labels: BTreeSet<String> = ["cat".to_string()].into_iter().collect();
        let loo = LeaveOneOutByLabel::new(labels);
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &loo, 10.0);
        let point = Point::new("p", vec![0.0, 0.0]).with_label("cat", 1.0);

        let err = selector.best_match(&point).unwrap_err();
        assert!(matches!(err, ClasificarError::NoClusterAvailable { .. }));
    }

    #[test]
    fn test_prohibited_cluster_skipped_not_fatal() {
        let refs = cat_dog_refs();
        let labels: BTreeSet<String> = ["cat", "dog"].iter().map(ToString::to_string).collect();
        let loo = LeaveOneOutByLabel::new(labels);
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &loo, 10.0);
        // the nearer cat cluster is held out, so dog wins
        let point = Point::new("p", vec![0.0, 0.0]).with_label("cat", 1.0);

        let mv = selector.best_match(&point).unwrap().matched().unwrap();
        assert_eq!(mv.cluster, 1);
        assert_eq!(mv.second_best_distance, None);
    }

    #[test]
    fn test_failed_measure_skipped_locally() {
        let mut refs = ReferenceSet::new();
        // wrong dimensionality: this cluster always fails the measure
        refs.push(vec![0.0], LabelDistribution::singleton("cat")); // id 0
        refs.push(vec![3.0, 4.0], LabelDistribution::singleton("dog")); // id 1
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &NoProhibition, 10.0);
        let point = Point::new("p", vec![0.0, 0.0]);

        let mv = selector.best_match(&point).unwrap().matched().unwrap();
        assert_eq!(mv.cluster, 1);
        assert!((mv.best_distance - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_measures_failing_is_fatal() {
        let mut refs = ReferenceSet::new();
        refs.push(vec![0.0], LabelDistribution::singleton("cat"));
        refs.push(vec![1.0], LabelDistribution::singleton("dog"));
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &NoProhibition, 10.0);
        // 3-feature point against 1-feature centroids: every evaluation fails
        let point = Point::new("p", vec![0.0, 0.0, 0.0]);

        let err = selector.best_match(&point).unwrap_err();
        assert!(matches!(err, ClasificarError::NoClusterAvailable { .. }));
    }

    #[test]
    fn test_equal_scores_last_scanned_wins() {
        let mut refs = ReferenceSet::new();
        refs.push(vec![2.0, 0.0], LabelDistribution::singleton("cat")); // id 0
        refs.push(vec![-2.0, 0.0], LabelDistribution::singleton("dog")); // id 1
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &NoProhibition, 10.0);
        let point = Point::new("p", vec![0.0, 0.0]);

        let mv = selector.best_match(&point).unwrap().matched().unwrap();
        assert_eq!(mv.cluster, 1);
        assert!((mv.second_best_distance.unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let refs = cat_dog_refs();
        // best distance is exactly 1.0; "exceeds" means strictly greater
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &NoProhibition, 1.0);
        let point = Point::new("p", vec![0.0, 0.0]);

        assert!(selector.best_match(&point).unwrap().is_matched());
    }
}
