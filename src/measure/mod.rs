//! Pluggable dissimilarity measures.
//!
//! A [`DissimilarityMeasure`] computes a non-negative score between a point
//! and a cluster centroid; smaller means more similar for distance-like
//! measures. Prior-aware measures additionally fold a per-cluster prior
//! weight into the score ([`DissimilarityMeasure::prior_distance`]).
//!
//! Three concrete measures ship with the crate:
//! - [`Euclidean`]: `sqrt(sum((x_i - y_i)^2))`
//! - [`Manhattan`]: `sum(|x_i - y_i|)`
//! - [`Minkowski`]: `(sum(|x_i - y_i|^p))^(1/p)`
//!
//! Probabilistic and score-like measures (e.g. the kernel scores consumed by
//! the inverted-score voting policy) are implemented by callers against the
//! same trait.

use crate::error::{ClasificarError, Result};
use crate::point::Point;
use crate::reference::ReferenceCluster;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Computes a non-negative dissimilarity score between a point and a
/// cluster centroid.
///
/// A measure may fail for a single cluster (incompatible representations,
/// numerically invalid inputs); callers recover locally by skipping that
/// cluster and continuing the scan.
pub trait DissimilarityMeasure: Send + Sync {
    /// Score between `point` and `centroid`. Must be finite and `>= 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the representations are incompatible or the
    /// computation is numerically invalid for this pair.
    fn distance(&self, point: &Point, centroid: &[f32]) -> Result<f32>;

    /// Prior-aware variant: folds the cluster's prior weight into the
    /// score. The default ignores the prior.
    ///
    /// # Errors
    ///
    /// Same contract as [`DissimilarityMeasure::distance`].
    fn prior_distance(&self, point: &Point, centroid: &[f32], prior: f32) -> Result<f32> {
        let _ = prior;
        self.distance(point, centroid)
    }

    /// True if this measure consumes cluster priors. Callers only route
    /// priors to measures that ask for them.
    fn prior_aware(&self) -> bool {
        false
    }
}

fn check_dims(point: &Point, centroid: &[f32]) -> Result<()> {
    if point.features().len() != centroid.len() {
        return Err(ClasificarError::IncompatibleRepresentation {
            point_dim: point.features().len(),
            centroid_dim: centroid.len(),
        });
    }
    Ok(())
}

/// Euclidean distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Euclidean;

impl DissimilarityMeasure for Euclidean {
    fn distance(&self, point: &Point, centroid: &[f32]) -> Result<f32> {
        check_dims(point, centroid)?;
        let sum: f32 = point
            .features()
            .iter()
            .zip(centroid)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Ok(sum.sqrt())
    }
}

/// Manhattan distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manhattan;

impl DissimilarityMeasure for Manhattan {
    fn distance(&self, point: &Point, centroid: &[f32]) -> Result<f32> {
        check_dims(point, centroid)?;
        Ok(point
            .features()
            .iter()
            .zip(centroid)
            .map(|(a, b)| (a - b).abs())
            .sum())
    }
}

/// Minkowski distance with parameter `p`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minkowski {
    /// Order of the norm; must be `>= 1`.
    pub p: f32,
}

impl Minkowski {
    /// Creates a Minkowski measure of order `p`.
    #[must_use]
    pub fn new(p: f32) -> Self {
        Self { p }
    }
}

impl DissimilarityMeasure for Minkowski {
    fn distance(&self, point: &Point, centroid: &[f32]) -> Result<f32> {
        if !self.p.is_finite() || self.p < 1.0 {
            return Err(ClasificarError::invalid_hyperparameter(
                "p", self.p, ">= 1",
            ));
        }
        check_dims(point, centroid)?;
        let sum: f32 = point
            .features()
            .iter()
            .zip(centroid)
            .map(|(a, b)| (a - b).abs().powf(self.p))
            .sum();
        Ok(sum.powf(1.0 / self.p))
    }
}

/// Scores `point` against `cluster`, routing the prior to prior-aware
/// measures. Returns `None` (after a warning) when the measure fails or
/// yields an invalid score; the caller skips the cluster and continues.
pub(crate) fn score_against<M: DissimilarityMeasure>(
    measure: &M,
    point: &Point,
    cluster: &ReferenceCluster,
    prior: f32,
) -> Option<f32> {
    let scored = if measure.prior_aware() {
        measure.prior_distance(point, cluster.centroid(), prior)
    } else {
        measure.distance(point, cluster.centroid())
    };
    match scored {
        Ok(score) if score.is_finite() && score >= 0.0 => Some(score),
        Ok(score) => {
            warn!(
                point = point.id(),
                cluster = cluster.id(),
                score,
                "measure produced an invalid score, skipping cluster"
            );
            None
        }
        Err(err) => {
            warn!(
                point = point.id(),
                cluster = cluster.id(),
                error = %err,
                "measure failed, skipping cluster"
            );
            None
        }
    }
}
