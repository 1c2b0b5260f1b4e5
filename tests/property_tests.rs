//! Property-based tests using proptest.
//!
//! These tests verify invariants of the selection, scoring, and voting
//! pipeline over randomly generated reference sets and query points.

use clasificar::prelude::*;
use clasificar::scorer::MultiNeighborScorer;
use clasificar::selector::SingleMatchSelector;
use clasificar::voting::{VoteAggregator, VotingPolicy};
use proptest::prelude::*;
use std::collections::BTreeSet;

const DIM: usize = 3;
const LABELS: [&str; 3] = ["ant", "bee", "cow"];

// Strategy for generating feature vectors
fn features_strategy() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-50.0f32..50.0, DIM)
}

// Strategy for generating a non-empty labeled reference set
fn reference_set_strategy() -> impl Strategy<Value = ReferenceSet> {
    proptest::collection::vec((features_strategy(), 0usize..LABELS.len()), 1..12).prop_map(
        |clusters| {
            let mut refs = ReferenceSet::new();
            for (centroid, label_idx) in clusters {
                refs.push(centroid, LabelDistribution::singleton(LABELS[label_idx]));
            }
            refs
        },
    )
}

fn query(features: Vec<f32>) -> Point {
    Point::new("query", features)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn scored_moves_are_non_decreasing(refs in reference_set_strategy(), features in features_strategy()) {
        let prohibition = NoProhibition;
        let scorer = MultiNeighborScorer::new(
            &refs, &Euclidean, &prohibition, VotingPolicy::Direct, f32::INFINITY,
        );
        if let Assignment::Matched(moves) = scorer.scored_moves(&query(features)).unwrap() {
            for pair in moves.windows(2) {
                prop_assert!(pair[0].best_distance <= pair[1].best_distance);
            }
        }
    }

    #[test]
    fn best_match_is_minimal_over_all_clusters(refs in reference_set_strategy(), features in features_strategy()) {
        let prohibition = NoProhibition;
        let point = query(features);
        let selector = SingleMatchSelector::new(&refs, &Euclidean, &prohibition, f32::INFINITY);
        let best = match selector.best_match(&point).unwrap() {
            Assignment::Matched(mv) => mv,
            Assignment::Unknown(reason) => return Err(TestCaseError::fail(format!("{reason:?}"))),
        };
        for cluster in &refs {
            let d = Euclidean.distance(&point, cluster.centroid()).unwrap();
            prop_assert!(best.best_distance <= d + 1e-4);
        }
    }

    #[test]
    fn vote_mass_is_conserved(refs in reference_set_strategy(), features in features_strategy()) {
        let prohibition = NoProhibition;
        let scorer = MultiNeighborScorer::new(
            &refs, &Euclidean, &prohibition, VotingPolicy::Direct, f32::INFINITY,
        );
        if let Assignment::Matched(moves) = scorer.scored_moves(&query(features)).unwrap() {
            let result = VoteAggregator::new(&refs).aggregate(&moves, moves.len()).unwrap();
            let expected: f32 = moves.iter().map(|mv| mv.vote_weight).sum();
            prop_assert!((result.total_mass() - expected).abs() < 1e-3);
            prop_assert_eq!(result.moves_consumed(), moves.len());
        }
    }

    #[test]
    fn vote_classification_is_deterministic(refs in reference_set_strategy(), features in features_strategy(), k in 1usize..5) {
        let classifier = VotingClassifier::new(refs, Euclidean, k);
        let point = query(features);
        let first = classifier.classify_by_vote(&point, None).unwrap();
        let second = classifier.classify_by_vote(&point, None).unwrap();
        match (&first, &second) {
            (Assignment::Matched(a), Assignment::Matched(b)) => {
                prop_assert_eq!(&a.label, &b.label);
                prop_assert!((a.votes - b.votes).abs() < 1e-6);
            }
            (Assignment::Unknown(a), Assignment::Unknown(b)) => prop_assert_eq!(a, b),
            _ => return Err(TestCaseError::fail("verdict changed between identical queries")),
        }
    }

    #[test]
    fn winner_proportion_is_a_fraction(refs in reference_set_strategy(), features in features_strategy(), k in 1usize..5) {
        let classifier = VotingClassifier::new(refs, Euclidean, k);
        if let Assignment::Matched(outcome) = classifier.classify_by_vote(&query(features), None).unwrap() {
            prop_assert!(outcome.proportion >= 0.0);
            prop_assert!(outcome.proportion <= 1.0);
            prop_assert!(outcome.votes >= 0.0);
            prop_assert!(outcome.weighted_distance >= 0.0);
        }
    }

    #[test]
    fn candidate_restriction_is_respected(refs in reference_set_strategy(), features in features_strategy()) {
        let candidates: BTreeSet<String> = ["ant".to_string(), "bee".to_string()].into();
        let classifier = VotingClassifier::new(refs, Euclidean, 3);
        if let Assignment::Matched(outcome) = classifier.classify_by_vote(&query(features), Some(&candidates)).unwrap() {
            prop_assert!(candidates.contains(&outcome.label));
        }
    }

    #[test]
    fn evaluation_counts_sum_to_total(refs in reference_set_strategy(), batch in proptest::collection::vec((features_strategy(), 0usize..LABELS.len()), 0..8)) {
        let candidates: BTreeSet<String> = LABELS.iter().map(ToString::to_string).collect();
        let classifier = VotingClassifier::new(refs, Euclidean, 3).with_unknown_threshold(40.0);
        let points: Vec<Point> = batch
            .into_iter()
            .enumerate()
            .map(|(i, (features, label_idx))| {
                Point::new(format!("p{i}"), features).with_label(LABELS[label_idx], 1.0)
            })
            .collect();
        let report = evaluate(&classifier, &points, &candidates).unwrap();
        prop_assert_eq!(report.total(), points.len());
        prop_assert_eq!(report.assigned() + report.unknown(), points.len());
        prop_assert!(report.correct() <= report.assigned());
    }
}
