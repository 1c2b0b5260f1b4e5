//! Clasificar: supervised nearest-neighbor and voting classification in pure Rust.
//!
//! Clasificar assigns labels to query points by comparing them against a
//! set of labeled reference clusters. Queries return either the single
//! nearest admissible cluster or a label elected by a weighted vote over
//! the nearest clusters, with an explicit `Unknown` outcome for points
//! the reference set cannot account for.
//!
//! # Quick Start
//!
//! ```
//! use clasificar::prelude::*;
//!
//! let mut references = ReferenceSet::new();
//! references.push(vec![0.0, 0.0], LabelDistribution::singleton("cat"));
//! references.push(vec![0.5, 0.5], LabelDistribution::singleton("cat"));
//! references.push(vec![5.0, 5.0], LabelDistribution::singleton("dog"));
//!
//! let classifier = VotingClassifier::new(references, Euclidean, 2)
//!     .with_unknown_threshold(3.0);
//!
//! let point = Point::new("query", vec![0.2, 0.1]);
//! let verdict = classifier.classify_by_vote(&point, None).unwrap();
//! match verdict {
//!     Assignment::Matched(outcome) => assert_eq!(outcome.label, "cat"),
//!     Assignment::Unknown(reason) => panic!("rejected: {reason:?}"),
//! }
//! ```
//!
//! # Modules
//!
//! - [`point`]: Query points and weighted label distributions
//! - [`reference`]: Labeled reference clusters and cluster priors
//! - [`measure`]: Dissimilarity measures (Euclidean, Manhattan, Minkowski)
//! - [`prohibition`]: Per-query cluster exclusion (leave-one-out holdout)
//! - [`selector`]: Best and second-best single-cluster selection
//! - [`scorer`]: Threshold-filtered multi-neighbor scoring
//! - [`voting`]: Vote aggregation, tie-breaking, and voting policies
//! - [`classifier`]: Owned classifier facades over the query components
//! - [`evaluation`]: Parallel batch evaluation of labeled points
//! - [`outcome`]: The `Matched` / `Unknown` assignment model
//! - [`error`]: Fatal error type shared across the crate

pub mod classifier;
pub mod error;
pub mod evaluation;
pub mod measure;
pub mod outcome;
pub mod point;
pub mod prelude;
pub mod prohibition;
pub mod reference;
pub mod scorer;
pub mod selector;
pub mod voting;

pub use error::{ClasificarError, Result};
pub use outcome::{Assignment, Rejection};
pub use point::{LabelDistribution, Point};
pub use reference::{ReferenceCluster, ReferenceSet};
