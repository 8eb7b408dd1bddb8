// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all kernel failures.
///
/// None of these are retried: the recursion is deterministic, so an
/// identical input reproduces an identical failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JumpLqError {
    /// Structural mismatch among the inputs, detected before any computation.
    #[error("invalid dimensions for {what}: expected {expected}, found {found}")]
    InvalidDimensions {
        what: String,
        expected: String,
        found: String,
    },

    /// Result storage could not be reserved.
    #[error("allocation failure: could not reserve {elements} result elements")]
    AllocationFailure { elements: usize },

    /// A pseudo-inverse or produced gain was unusable at (stage, mode).
    #[error("numerical degeneracy at stage {stage}, mode {mode}: {reason}")]
    NumericalDegeneracy {
        stage: usize,
        mode: usize,
        reason: String,
    },

    /// Cancellation flag observed at the checkpoint before `stage`.
    #[error("recursion cancelled before stage {stage}")]
    Cancelled { stage: usize },

    /// Invalid input values (non-finite entries, improper transition rows).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl JumpLqError {
    /// Shorthand for [`JumpLqError::InvalidDimensions`].
    pub fn dims(
        what: impl Into<String>,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidDimensions {
            what: what.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// True for failures raised before the recursion touched any buffer.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. } | Self::Validation(_) | Self::Config(_)
        )
    }
}

pub type JumpLqResult<T> = Result<T, JumpLqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_message_names_mismatch() {
        let err = JumpLqError::dims("R[1]", "2x2", "3x3");
        assert_eq!(
            err.to_string(),
            "invalid dimensions for R[1]: expected 2x2, found 3x3"
        );
        assert!(err.is_precondition());
    }

    #[test]
    fn test_degeneracy_carries_location() {
        let err = JumpLqError::NumericalDegeneracy {
            stage: 4,
            mode: 1,
            reason: "svd did not converge".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("stage 4"), "{msg}");
        assert!(msg.contains("mode 1"), "{msg}");
        assert!(!err.is_precondition());
    }
}
