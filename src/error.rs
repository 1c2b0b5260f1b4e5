//! Error types for clasificar operations.
//!
//! Only fatal conditions live here: configuration mistakes and internal
//! algorithm bugs. The expected "unknown classification" outcome is not an
//! error and is modeled by [`crate::outcome::Assignment`] instead.

use std::fmt;

/// Main error type for clasificar operations.
///
/// All variants indicate a programming or configuration error: an empty
/// reference set, a query for which no cluster was admissible at all, a
/// broken ordering invariant, or an invalid hyperparameter. Callers should
/// propagate these, not count them as classification outcomes.
///
/// # Examples
///
/// ```
/// use clasificar::error::ClasificarError;
///
/// let err = ClasificarError::EmptyReferenceSet;
/// assert!(err.to_string().contains("empty"));
/// ```
#[derive(Debug)]
pub enum ClasificarError {
    /// The reference set holds no clusters at all.
    EmptyReferenceSet,

    /// Every cluster was prohibited or failed its measure evaluation,
    /// leaving no admissible candidate for the point.
    NoClusterAvailable {
        /// Identity of the query point
        point: String,
    },

    /// A sequence of scored moves was not in ascending distance order.
    /// This is an internal algorithm bug, not a data problem.
    OrderingViolation {
        /// Distance of the previously consumed move
        previous: f32,
        /// Offending distance that went backwards
        current: f32,
    },

    /// Point and centroid representations cannot be compared.
    IncompatibleRepresentation {
        /// Dimensionality of the point
        point_dim: usize,
        /// Dimensionality of the centroid
        centroid_dim: usize,
    },

    /// A vote referenced a cluster id absent from the reference set.
    UnknownCluster {
        /// The missing cluster id
        id: usize,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for ClasificarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClasificarError::EmptyReferenceSet => {
                write!(f, "Reference set is empty: nothing to classify against")
            }
            ClasificarError::NoClusterAvailable { point } => {
                write!(f, "No admissible cluster for point '{point}': every cluster was prohibited or failed")
            }
            ClasificarError::OrderingViolation { previous, current } => {
                write!(
                    f,
                    "Ascending-order invariant violated: {current} follows {previous}"
                )
            }
            ClasificarError::IncompatibleRepresentation {
                point_dim,
                centroid_dim,
            } => {
                write!(
                    f,
                    "Incompatible representations: point has {point_dim} features, centroid has {centroid_dim}"
                )
            }
            ClasificarError::UnknownCluster { id } => {
                write!(f, "Cluster id {id} is not in the reference set")
            }
            ClasificarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            ClasificarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ClasificarError {}

impl From<&str> for ClasificarError {
    fn from(msg: &str) -> Self {
        ClasificarError::Other(msg.to_string())
    }
}

impl From<String> for ClasificarError {
    fn from(msg: String) -> Self {
        ClasificarError::Other(msg)
    }
}

impl ClasificarError {
    /// Create an invalid-hyperparameter error with descriptive context.
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, ClasificarError>;
