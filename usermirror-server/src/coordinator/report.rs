//! Dual-write outcome reporting
//!
//! A dual write never collapses to a boolean. Each side's result is kept,
//! and the pair is classified into one of four outcomes.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::{Operation, StoreRole};

/// Result of one side of a dual write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideResult {
    /// The store applied the mutation
    Applied,
    /// The store call failed; the store may or may not have applied it
    /// if the failure was a timeout or cancellation
    Failed(StoreError),
    /// The call was never made (short-circuit policy)
    Skipped,
}

impl SideResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Failed(_) => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl From<Result<(), StoreError>> for SideResult {
    fn from(result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(e) => Self::Failed(e),
        }
    }
}

/// Classification of a dual write by which sides failed.
///
/// A skipped side counts as "not failed", so `*_only_failed` does not imply
/// the other side applied. Use `DualWriteReport::applied_stores` for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DualOutcome {
    BothOk,
    LocalOnlyFailed,
    PeerOnlyFailed,
    BothFailed,
}

impl DualOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BothOk => "both_ok",
            Self::LocalOnlyFailed => "local_only_failed",
            Self::PeerOnlyFailed => "peer_only_failed",
            Self::BothFailed => "both_failed",
        }
    }
}

/// Per-store results of one dual write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualWriteReport {
    pub operation: Operation,
    pub operation_id: Uuid,
    pub local: SideResult,
    pub peer: SideResult,
}

impl DualWriteReport {
    pub fn outcome(&self) -> DualOutcome {
        match (self.local.is_failed(), self.peer.is_failed()) {
            (false, false) => DualOutcome::BothOk,
            (true, false) => DualOutcome::LocalOnlyFailed,
            (false, true) => DualOutcome::PeerOnlyFailed,
            (true, true) => DualOutcome::BothFailed,
        }
    }

    pub fn sides(&self) -> [(StoreRole, &SideResult); 2] {
        [(StoreRole::Local, &self.local), (StoreRole::Peer, &self.peer)]
    }

    pub fn applied_count(&self) -> usize {
        self.sides().iter().filter(|(_, s)| s.is_applied()).count()
    }

    /// Exactly one store applied the mutation: the stores now disagree.
    pub fn is_partial(&self) -> bool {
        self.applied_count() == 1
    }

    pub fn failed_stores(&self) -> Vec<StoreRole> {
        self.stores_where(SideResult::is_failed)
    }

    pub fn applied_stores(&self) -> Vec<StoreRole> {
        self.stores_where(SideResult::is_applied)
    }

    fn stores_where(&self, pred: impl Fn(&SideResult) -> bool) -> Vec<StoreRole> {
        self.sides()
            .into_iter()
            .filter(|(_, s)| pred(*s))
            .map(|(role, _)| role)
            .collect()
    }

    /// Emit one log line summarizing the outcome.
    pub(crate) fn log(&self) {
        let outcome = self.outcome().as_str();
        match self.applied_count() {
            2 => tracing::info!(outcome, "applied to both stores"),
            1 => tracing::warn!(outcome, failed = %self, "stores diverged"),
            _ => tracing::error!(outcome, failed = %self, "applied to no store"),
        }
    }
}

impl fmt::Display for DualWriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.operation)?;
        for (role, side) in self.sides() {
            match side {
                SideResult::Failed(e) => write!(f, " {}=failed({})", role, e)?,
                other => write!(f, " {}={}", role, other.status())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(local: SideResult, peer: SideResult) -> DualWriteReport {
        DualWriteReport {
            operation: Operation::Register,
            operation_id: Uuid::nil(),
            local,
            peer,
        }
    }

    fn failed(role: StoreRole) -> SideResult {
        SideResult::Failed(StoreError::Statement {
            role,
            detail: "boom".into(),
        })
    }

    #[test]
    fn classifies_all_four_outcomes() {
        use SideResult::Applied;

        assert_eq!(report(Applied, Applied).outcome(), DualOutcome::BothOk);
        assert_eq!(
            report(failed(StoreRole::Local), Applied).outcome(),
            DualOutcome::LocalOnlyFailed
        );
        assert_eq!(
            report(Applied, failed(StoreRole::Peer)).outcome(),
            DualOutcome::PeerOnlyFailed
        );
        assert_eq!(
            report(failed(StoreRole::Local), failed(StoreRole::Peer)).outcome(),
            DualOutcome::BothFailed
        );
    }

    #[test]
    fn skipped_peer_is_not_partial() {
        let r = report(failed(StoreRole::Local), SideResult::Skipped);
        assert_eq!(r.outcome(), DualOutcome::LocalOnlyFailed);
        assert!(!r.is_partial());
        assert_eq!(r.applied_count(), 0);
        assert_eq!(r.failed_stores(), vec![StoreRole::Local]);
    }

    #[test]
    fn one_applied_side_is_partial() {
        let r = report(SideResult::Applied, failed(StoreRole::Peer));
        assert!(r.is_partial());
        assert_eq!(r.failed_stores(), vec![StoreRole::Peer]);
    }

    #[test]
    fn display_names_failed_store() {
        let r = report(SideResult::Applied, failed(StoreRole::Peer));
        assert_eq!(
            r.to_string(),
            "register: local=applied peer=failed(peer store statement failed: boom)"
        );
    }
}
