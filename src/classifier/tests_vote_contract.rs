// =========================================================================
// FALSIFY-VOTE: voting-classifier contract tests
//
// Each test tries to falsify one published-contract property of the
// nearest-neighbor voting cascade. Names state the property under attack.
//
// References:
//   - Cover & Hart (1967) "Nearest Neighbor Pattern Classification"
//   - Diaz et al. (2009) "TACOA: taxonomic classification of environmental
//     genomic fragments using a kernelized nearest neighbor approach"
// =========================================================================

use super::*;
use crate::measure::Euclidean;
use crate::point::LabelDistribution;
use crate::scorer::MultiNeighborScorer;
use crate::voting::VoteAggregator;

fn grid_refs() -> ReferenceSet {
    let mut refs = ReferenceSet::new();
    refs.push(vec![0.0, 0.0], LabelDistribution::singleton("cat"));
    refs.push(vec![0.5, 0.5], LabelDistribution::singleton("cat"));
    refs.push(vec![1.0, 0.0], LabelDistribution::singleton("cat"));
    refs.push(vec![5.0, 5.0], LabelDistribution::singleton("dog"));
    refs.push(vec![5.5, 5.5], LabelDistribution::singleton("dog"));
    refs.push(vec![6.0, 5.0], LabelDistribution::singleton("dog"));
    refs
}

/// FALSIFY-VOTE-001: winning proportion is always in [0, 1]
#[test]
fn falsify_vote_001_proportion_in_unit_interval() {
    let classifier = VotingClassifier::new(grid_refs(), Euclidean, 4);
    for features in [vec![0.1, 0.1], vec![3.0, 3.0], vec![5.7, 5.4]] {
        let verdict = classifier
            .classify_by_vote(&Point::new("q", features), None)
            .expect("classify");
        if let Some(outcome) = verdict.matched() {
            assert!(
                (0.0..=1.0).contains(&outcome.proportion),
                "FALSIFIED VOTE-001: proportion {} outside [0, 1]",
                outcome.proportion
            );
        }
    }
}

/// FALSIFY-VOTE-002: classification is deterministic on an immutable set
#[test]
fn falsify_vote_002_deterministic() {
    let classifier = VotingClassifier::new(grid_refs(), Euclidean, 3);
    let point = Point::new("q", vec![2.8, 2.8]);

    let first = classifier.classify_by_vote(&point, None).expect("classify 1");
    let second = classifier.classify_by_vote(&point, None).expect("classify 2");
    assert_eq!(
        first, second,
        "FALSIFIED VOTE-002: verdicts differ on the same input"
    );
}

/// FALSIFY-VOTE-003: k >= survivors consumes every surviving move once
#[test]
fn falsify_vote_003_consumes_all_survivors() {
    let refs = grid_refs();
    let scorer = MultiNeighborScorer::new(
        &refs,
        &Euclidean,
        &crate::prohibition::NoProhibition,
        VotingPolicy::Direct,
        f32::INFINITY,
    );
    let moves = scorer
        .scored_moves(&Point::new("q", vec![1.0, 1.0]))
        .expect("score")
        .matched()
        .expect("survivors");

    let result = VoteAggregator::new(&refs)
        .aggregate(&moves, moves.len() + 10)
        .expect("aggregate");
    assert_eq!(
        result.moves_consumed(),
        moves.len(),
        "FALSIFIED VOTE-003: {} consumed for {} survivors",
        result.moves_consumed(),
        moves.len()
    );
}

/// FALSIFY-VOTE-004: pre-normalization vote mass equals the weight sum
#[test]
fn falsify_vote_004_vote_mass_conservation() {
    let refs = grid_refs();
    let scorer = MultiNeighborScorer::new(
        &refs,
        &Euclidean,
        &crate::prohibition::NoProhibition,
        VotingPolicy::Direct,
        f32::INFINITY,
    );
    let moves = scorer
        .scored_moves(&Point::new("q", vec![2.0, 2.0]))
        .expect("score")
        .matched()
        .expect("survivors");

    let result = VoteAggregator::new(&refs)
        .aggregate(&moves, moves.len())
        .expect("aggregate");
    let weight_sum: f32 = moves.iter().map(|m| m.vote_weight).sum();
    assert!(
        (result.total_mass() - weight_sum).abs() < 1e-5,
        "FALSIFIED VOTE-004: mass {} != weight sum {}",
        result.total_mass(),
        weight_sum
    );
}

/// FALSIFY-VOTE-005: classify_single returns a minimal-score cluster
#[test]
fn falsify_vote_005_single_match_is_minimal() {
    let refs = grid_refs();
    let classifier = NearestClusterClassifier::new(refs.clone(), Euclidean);
    let point = Point::new("q", vec![4.0, 4.2]);

    let mv = classifier
        .classify_single(&point)
        .expect("classify")
        .matched()
        .expect("match");
    for cluster in refs.iter() {
        let d = Euclidean
            .distance(&point, cluster.centroid())
            .expect("distance");
        assert!(
            mv.best_distance <= d + 1e-6,
            "FALSIFIED VOTE-005: cluster {} at {} beats reported best {}",
            cluster.id(),
            d,
            mv.best_distance
        );
    }
}

/// FALSIFY-VOTE-006: well-separated groups classify correctly
#[test]
fn falsify_vote_006_separable_data() {
    let classifier = VotingClassifier::new(grid_refs(), Euclidean, 3);

    let cat = classifier
        .classify_by_vote(&Point::new("q1", vec![0.3, 0.3]), None)
        .expect("classify");
    let dog = classifier
        .classify_by_vote(&Point::new("q2", vec![5.6, 5.3]), None)
        .expect("classify");
    assert_eq!(
        cat.matched().expect("confident").label,
        "cat",
        "FALSIFIED VOTE-006: cat-side query mislabeled"
    );
    assert_eq!(
        dog.matched().expect("confident").label,
        "dog",
        "FALSIFIED VOTE-006: dog-side query mislabeled"
    );
}
