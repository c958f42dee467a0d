//! Coordinator error type

use super::DualWriteReport;
use crate::models::ValidationError;

/// Failure of a dual write.
///
/// `PartialFailure` and `TotalFailure` both carry the full report; they are
/// split so callers cannot mistake divergence for a clean failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoordinatorError {
    /// Input rejected before any store was touched
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Exactly one store applied the mutation; the stores now disagree
    #[error("{} applied to one store only ({})", .0.operation, .0)]
    PartialFailure(DualWriteReport),

    /// No store applied the mutation
    #[error("{} applied to no store ({})", .0.operation, .0)]
    TotalFailure(DualWriteReport),
}

impl CoordinatorError {
    pub fn report(&self) -> Option<&DualWriteReport> {
        match self {
            Self::Validation(_) => None,
            Self::PartialFailure(r) | Self::TotalFailure(r) => Some(r),
        }
    }
}
