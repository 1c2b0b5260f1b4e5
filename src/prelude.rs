//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use clasificar::prelude::*;
//! ```

pub use crate::classifier::{NearestClusterClassifier, VotingClassifier};
pub use crate::error::{ClasificarError, Result};
pub use crate::evaluation::{evaluate, EvaluationReport};
pub use crate::measure::{DissimilarityMeasure, Euclidean, Manhattan, Minkowski};
pub use crate::outcome::{Assignment, Rejection};
pub use crate::point::{LabelDistribution, Point};
pub use crate::prohibition::{LeaveOneOutByLabel, NoProhibition, ProhibitionFilter, ProhibitionModel};
pub use crate::reference::{ReferenceCluster, ReferenceSet};
pub use crate::voting::{TieBreakConfig, VoteOutcome, VotingPolicy};
