//! Error types for the timeline engine.
//!
//! Structural edit conflicts (colliding shifts, freezing a keyed frame,
//! deleting frame 0, degenerate scales) are policies and never surface here.

use crate::ids::{AnimatorId, Millis, TargetId};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TimelineError {
    /// A mutating call named a shape outside the timeline's subtree.
    #[error("Unknown target {target} for timeline owned by {owner}")]
    UnknownTarget { owner: TargetId, target: TargetId },

    /// Engine call referenced an animator that does not exist.
    #[error("Animator not found: {id}")]
    AnimatorNotFound { id: AnimatorId },

    /// Persisted key frames were not strictly increasing.
    #[error("Key frame times must be strictly increasing: {time} follows {previous}")]
    NonIncreasingTimes { previous: Millis, time: Millis },

    /// Persisted key frame bound the same channel twice.
    #[error("Duplicate key value for {target}.{key} at {time} ms")]
    DuplicateKeyValue {
        time: Millis,
        target: TargetId,
        key: String,
    },

    /// Persisted timeline lacked the base frame at time 0.
    #[error("Timeline is missing the base key frame at time 0")]
    MissingBaseFrame,

    /// Persisted key frame other than frame 0 carried no key values.
    #[error("Key frame at {time} ms is empty")]
    EmptyKeyFrame { time: Millis },

    /// Persisted value could not be decoded.
    #[error("Invalid value for {key} at {time} ms: {reason}")]
    InvalidValue {
        time: Millis,
        key: String,
        reason: String,
    },

    /// JSON syntax or shape error.
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl TimelineError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownTarget { .. } | Self::AnimatorNotFound { .. } => "reference",
            Self::NonIncreasingTimes { .. }
            | Self::DuplicateKeyValue { .. }
            | Self::MissingBaseFrame
            | Self::EmptyKeyFrame { .. }
            | Self::InvalidValue { .. } => "malformed",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let e = TimelineError::UnknownTarget {
            owner: TargetId(1),
            target: TargetId(9),
        };
        assert_eq!(e.category(), "reference");
        assert_eq!(e.to_string(), "Unknown target shape#9 for timeline owned by shape#1");
        assert_eq!(TimelineError::MissingBaseFrame.category(), "malformed");
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let converted: TimelineError = err.into();
        assert_eq!(converted.category(), "serialization");
    }
}
