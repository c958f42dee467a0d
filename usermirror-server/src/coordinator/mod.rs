//! Dual-write coordinator
//!
//! Applies one logical mutation to the local and peer stores and combines
//! the two outcomes. There is no shared transaction: a side that succeeds
//! is never rolled back when the other fails. Divergence is reported, not
//! hidden.
//!
//! # Policies
//!
//! - `AttemptBoth` (default): local then peer, peer attempted even if local failed
//! - `ShortCircuit`: peer pinged first and nothing written if it is
//!   unreachable; then local then peer, peer skipped if local failed
//! - `Parallel`: both calls in flight at once, both results collected
//!
//! In every policy each store call is bounded by the store timeout and can
//! be cancelled through a `CancellationToken`.

pub mod call;
pub mod error;
pub mod report;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ConfigError;
use crate::db::{StoreError, Stores, UserStore};
use crate::models::{Mutation, Username};

pub use call::bounded_call;
pub use error::CoordinatorError;
pub use report::{DualOutcome, DualWriteReport, SideResult};

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// How the two store calls of a dual write are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    #[default]
    AttemptBoth,
    ShortCircuit,
    Parallel,
}

impl DispatchPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AttemptBoth => "attempt_both",
            Self::ShortCircuit => "short_circuit",
            Self::Parallel => "parallel",
        }
    }
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "attempt_both" => Ok(Self::AttemptBoth),
            "short_circuit" => Ok(Self::ShortCircuit),
            "parallel" => Ok(Self::Parallel),
            other => Err(format!(
                "unknown policy '{}' (expected attempt_both, short_circuit or parallel)",
                other
            )),
        }
    }
}

/// Coordinator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub policy: DispatchPolicy,
    pub store_timeout_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            policy: DispatchPolicy::default(),
            store_timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
        }
    }
}

impl CoordinatorConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                section: "coordinator",
                field: "store_timeout_secs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Replays mutations against both stores.
pub struct DualWriteCoordinator {
    stores: Stores,
    policy: DispatchPolicy,
    store_timeout: Duration,
}

impl DualWriteCoordinator {
    pub fn new(stores: Stores, config: &CoordinatorConfig) -> Self {
        Self::with_timeout(stores, config.policy, config.store_timeout())
    }

    pub fn with_timeout(stores: Stores, policy: DispatchPolicy, store_timeout: Duration) -> Self {
        Self {
            stores,
            policy,
            store_timeout,
        }
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Insert `username` into both stores.
    ///
    /// Fails with `Validation` before touching any store if the name is empty.
    pub async fn register(&self, username: &str) -> Result<DualWriteReport, CoordinatorError> {
        self.register_with_cancel(username, &CancellationToken::new())
            .await
    }

    pub async fn register_with_cancel(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<DualWriteReport, CoordinatorError> {
        let name = Username::new(username)?;
        self.apply(Mutation::Register(name), cancel).await
    }

    /// Delete every username from both stores.
    pub async fn clear(&self) -> Result<DualWriteReport, CoordinatorError> {
        self.clear_with_cancel(&CancellationToken::new()).await
    }

    pub async fn clear_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<DualWriteReport, CoordinatorError> {
        self.apply(Mutation::Clear, cancel).await
    }

    /// Apply `mutation` to both stores under the configured policy.
    ///
    /// Returns `Ok` only when both stores applied it.
    pub async fn apply(
        &self,
        mutation: Mutation,
        cancel: &CancellationToken,
    ) -> Result<DualWriteReport, CoordinatorError> {
        let operation = mutation.operation();
        let operation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dual_write",
            operation = operation.as_str(),
            %operation_id,
            policy = self.policy.as_str(),
        );

        async {
            let local_store = self.stores.local.as_ref();
            let peer_store = self.stores.peer.as_ref();

            let (local, peer) = match self.policy {
                DispatchPolicy::AttemptBoth => {
                    let local = self.invoke(local_store, &mutation, cancel).await;
                    let peer = self.invoke(peer_store, &mutation, cancel).await;
                    (local, peer)
                }
                DispatchPolicy::ShortCircuit => {
                    // Peer must be reachable before local is touched
                    if let Err(e) = self.reach(peer_store, cancel).await {
                        tracing::debug!(which_store = "local", "skipped, peer unreachable");
                        (SideResult::Skipped, SideResult::Failed(e))
                    } else {
                        let local = self.invoke(local_store, &mutation, cancel).await;
                        let peer = if local.is_applied() {
                            self.invoke(peer_store, &mutation, cancel).await
                        } else {
                            tracing::debug!(which_store = "peer", "skipped after local failure");
                            SideResult::Skipped
                        };
                        (local, peer)
                    }
                }
                DispatchPolicy::Parallel => tokio::join!(
                    self.invoke(local_store, &mutation, cancel),
                    self.invoke(peer_store, &mutation, cancel),
                ),
            };

            let report = DualWriteReport {
                operation,
                operation_id,
                local,
                peer,
            };
            report.log();

            match report.applied_count() {
                2 => Ok(report),
                1 => Err(CoordinatorError::PartialFailure(report)),
                _ => Err(CoordinatorError::TotalFailure(report)),
            }
        }
        .instrument(span)
        .await
    }

    async fn reach(
        &self,
        store: &dyn UserStore,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let role = store.role();
        let result = bounded_call(role, self.store_timeout, cancel, store.ping()).await;
        if let Err(e) = &result {
            tracing::warn!(which_store = %role, kind = e.kind(), error = %e, "store unreachable");
        }
        result
    }

    async fn invoke(
        &self,
        store: &dyn UserStore,
        mutation: &Mutation,
        cancel: &CancellationToken,
    ) -> SideResult {
        let role = store.role();
        let call = async {
            match mutation {
                Mutation::Register(name) => store.insert_username(name).await,
                Mutation::Clear => store.delete_all_usernames().await,
            }
        };

        let result = bounded_call(role, self.store_timeout, cancel, call).await;
        match &result {
            Ok(()) => tracing::debug!(which_store = %role, "store applied mutation"),
            Err(e) => tracing::warn!(
                which_store = %role,
                kind = e.kind(),
                error = %e,
                "store call failed"
            ),
        }
        SideResult::from(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::MemoryStore;
    use crate::models::{StoreRole, ValidationError};

    struct Fixture {
        local: Arc<MemoryStore>,
        peer: Arc<MemoryStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                local: Arc::new(MemoryStore::with_defaults(StoreRole::Local)),
                peer: Arc::new(MemoryStore::with_defaults(StoreRole::Peer)),
            }
        }

        fn coordinator(&self, policy: DispatchPolicy) -> DualWriteCoordinator {
            let stores = Stores::new(self.local.clone(), self.peer.clone());
            DualWriteCoordinator::with_timeout(stores, policy, Duration::from_secs(2))
        }

        async fn contents(&self) -> (Vec<String>, Vec<String>) {
            (
                self.local.list_usernames().await.unwrap(),
                self.peer.list_usernames().await.unwrap(),
            )
        }
    }

    #[tokio::test]
    async fn register_applies_to_both_stores() {
        let fx = Fixture::new();
        let report = fx
            .coordinator(DispatchPolicy::AttemptBoth)
            .register("alice")
            .await
            .unwrap();

        assert_eq!(report.outcome(), DualOutcome::BothOk);
        assert_eq!(fx.contents().await, (vec!["alice".into()], vec!["alice".into()]));
    }

    #[tokio::test]
    async fn empty_username_touches_no_store() {
        let fx = Fixture::new();
        fx.local.set_unreachable(true).await;

        let err = fx
            .coordinator(DispatchPolicy::AttemptBoth)
            .register("")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoordinatorError::Validation(ValidationError::Empty { field: "username" })
        ));
        assert!(err.report().is_none());
        fx.local.set_unreachable(false).await;
        assert_eq!(fx.contents().await, (vec![], vec![]));
    }

    #[tokio::test]
    async fn attempt_both_reaches_peer_after_local_failure() {
        let fx = Fixture::new();
        fx.local.fail_next(1).await;

        let err = fx
            .coordinator(DispatchPolicy::AttemptBoth)
            .register("bob")
            .await
            .unwrap_err();

        let CoordinatorError::PartialFailure(report) = err else {
            panic!("expected partial failure");
        };
        assert_eq!(report.outcome(), DualOutcome::LocalOnlyFailed);
        assert!(report.peer.is_applied());
        assert_eq!(fx.contents().await, (vec![], vec!["bob".into()]));
    }

    #[tokio::test]
    async fn short_circuit_skips_peer_after_local_failure() {
        let fx = Fixture::new();
        fx.local.fail_next(1).await;

        let err = fx
            .coordinator(DispatchPolicy::ShortCircuit)
            .register("bob")
            .await
            .unwrap_err();

        let CoordinatorError::TotalFailure(report) = err else {
            panic!("expected total failure");
        };
        assert_eq!(report.peer, SideResult::Skipped);
        assert_eq!(report.failed_stores(), vec![StoreRole::Local]);
        assert_eq!(fx.contents().await, (vec![], vec![]));
    }

    #[tokio::test]
    async fn short_circuit_writes_nothing_when_peer_unreachable() {
        let fx = Fixture::new();
        fx.peer.set_unreachable(true).await;

        let err = fx
            .coordinator(DispatchPolicy::ShortCircuit)
            .register("carol")
            .await
            .unwrap_err();

        let CoordinatorError::TotalFailure(report) = err else {
            panic!("expected total failure");
        };
        assert_eq!(report.local, SideResult::Skipped);
        assert_eq!(report.failed_stores(), vec![StoreRole::Peer]);
        assert!(report.applied_stores().is_empty());
        assert_eq!(fx.local.list_usernames().await.unwrap(), Vec::<String>::new());
        assert_eq!(fx.local.pool_status().in_use, 0);
    }

    #[tokio::test]
    async fn short_circuit_reports_divergence_when_peer_statement_fails() {
        let fx = Fixture::new();
        fx.peer.fail_next(1).await;

        let err = fx
            .coordinator(DispatchPolicy::ShortCircuit)
            .register("carol")
            .await
            .unwrap_err();

        let CoordinatorError::PartialFailure(report) = err else {
            panic!("expected partial failure");
        };
        assert_eq!(report.outcome(), DualOutcome::PeerOnlyFailed);
        assert_eq!(fx.contents().await, (vec!["carol".into()], vec![]));
    }

    #[tokio::test]
    async fn both_failing_is_total_failure() {
        let fx = Fixture::new();
        fx.local.fail_next(1).await;
        fx.peer.fail_next(1).await;

        let err = fx
            .coordinator(DispatchPolicy::Parallel)
            .clear()
            .await
            .unwrap_err();

        let CoordinatorError::TotalFailure(report) = err else {
            panic!("expected total failure");
        };
        assert_eq!(report.outcome(), DualOutcome::BothFailed);
        assert_eq!(report.failed_stores(), StoreRole::ALL.to_vec());
    }

    #[tokio::test]
    async fn clear_empties_both_stores() {
        let fx = Fixture::new();
        let coordinator = fx.coordinator(DispatchPolicy::AttemptBoth);
        coordinator.register("a").await.unwrap();
        coordinator.register("b").await.unwrap();

        coordinator.clear().await.unwrap();
        assert_eq!(fx.contents().await, (vec![], vec![]));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_peer_times_out() {
        let fx = Fixture::new();
        fx.peer.set_latency(Duration::from_secs(30)).await;

        let err = fx
            .coordinator(DispatchPolicy::AttemptBoth)
            .register("dave")
            .await
            .unwrap_err();

        let report = err.report().unwrap();
        assert!(report.is_partial());
        assert_eq!(
            report.peer.error(),
            Some(&StoreError::Timeout {
                role: StoreRole::Peer,
                after: Duration::from_secs(2)
            })
        );
        assert_eq!(fx.peer.pool_status().in_use, 0);
    }

    #[tokio::test]
    async fn operation_ids_are_unique() {
        let fx = Fixture::new();
        let coordinator = fx.coordinator(DispatchPolicy::AttemptBoth);

        let a = coordinator.register("a").await.unwrap();
        let b = coordinator.register("b").await.unwrap();
        assert_ne!(a.operation_id, b.operation_id);
    }

    #[test]
    fn policy_parses_both_spellings() {
        assert_eq!("attempt_both".parse::<DispatchPolicy>(), Ok(DispatchPolicy::AttemptBoth));
        assert_eq!("short-circuit".parse::<DispatchPolicy>(), Ok(DispatchPolicy::ShortCircuit));
        assert_eq!("parallel".parse::<DispatchPolicy>(), Ok(DispatchPolicy::Parallel));
        assert!("two_phase".parse::<DispatchPolicy>().is_err());
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let config = CoordinatorConfig {
            store_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(CoordinatorConfig::default().validate().is_ok());
    }
}
