//! Tagged classification outcomes.
//!
//! "Unknown" is an expected, frequent result of a query, not an error, so
//! it is carried in the success channel: query entry points return
//! `Result<Assignment<T>>`, where the `Err` side is reserved for the fatal
//! tier ([`crate::error::ClasificarError`]).

use serde::{Deserialize, Serialize};

/// Why a query was rejected as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// The best score exceeded the unknown-distance threshold.
    DistanceAboveThreshold,
    /// Zero candidates survived threshold filtering.
    NoCandidates,
    /// The tie-break cascade could not separate the top two labels.
    Indistinguishable,
    /// The winning label's vote proportion fell below the minimum.
    BelowMinimumProportion,
}

/// Outcome of a classification query: a match, or a structured unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Assignment<T> {
    /// A confident match.
    Matched(T),
    /// No good match; the reason says which check rejected the query.
    Unknown(Rejection),
}

impl<T> Assignment<T> {
    /// True for [`Assignment::Matched`].
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Assignment::Matched(_))
    }

    /// True for [`Assignment::Unknown`].
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Assignment::Unknown(_))
    }

    /// The match, if any.
    pub fn matched(self) -> Option<T> {
        match self {
            Assignment::Matched(value) => Some(value),
            Assignment::Unknown(_) => None,
        }
    }

    /// The rejection reason, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Assignment::Matched(_) => None,
            Assignment::Unknown(reason) => Some(*reason),
        }
    }

    /// Maps the matched value, keeping the rejection as-is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Assignment<U> {
        match self {
            Assignment::Matched(value) => Assignment::Matched(f(value)),
            Assignment::Unknown(reason) => Assignment::Unknown(reason),
        }
    }
}
