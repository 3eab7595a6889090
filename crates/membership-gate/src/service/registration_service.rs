//! Registration Service
//!
//! Combines the gate's "maybe present" signal with the store's exact
//! uniqueness guarantee:
//!
//! ```text
//!                 probably_contains(k)?
//!                 /                  \
//!              false                 true
//!               |                     |
//!               |               lookup_by_key(k)
//!               |                /          \
//!               |            found        absent
//!               |              |             |
//!               |          Conflict          |
//!               |          (Lookup)          |
//!                \                          /
//!                 insert_unique(k, payload)
//!                 /          |            \
//!               Ok      DuplicateKey     other
//!                |           |              |
//!     record_insertion(k)  Conflict     Err(Store)
//!     FastPath /           (race)
//!     FalsePositivePath
//! ```
//!
//! Both branches share one tail, so `record_insertion` runs exactly once per
//! committed insert and never otherwise.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{FilterConfig, GateConfig, MembershipGate, NormalizedKey};
use crate::error::{GateError, StoreError};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::ports::{
    ConflictSource, InsertOutcome, InsertResult, MembershipCheck, RegistrationApi, UniqueKeyStore,
};

/// Which branch of the protocol reached the insert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InsertBranch {
    /// Filter said definitely absent
    FastPath,
    /// Filter said maybe, lookup found nothing
    Reconciliation,
}

impl InsertBranch {
    fn success(self) -> InsertOutcome {
        match self {
            InsertBranch::FastPath => InsertOutcome::FastPath,
            InsertBranch::Reconciliation => InsertOutcome::FalsePositivePath,
        }
    }

    fn race(self) -> ConflictSource {
        match self {
            InsertBranch::FastPath => ConflictSource::FastPathRace,
            InsertBranch::Reconciliation => ConflictSource::ReconciliationRace,
        }
    }
}

/// Registration service implementation
///
/// Implements the `RegistrationApi` port over an injected store.
pub struct RegistrationService<S: UniqueKeyStore> {
    /// Authoritative store (driven port)
    store: Arc<S>,
    /// Shared pre-filter
    gate: Arc<MembershipGate>,
    metrics: Arc<Metrics>,
    /// Serializes rebuilds so only one journal is active at a time
    rebuild_lock: Mutex<()>,
}

impl<S: UniqueKeyStore> RegistrationService<S> {
    /// Build the gate from the store's current contents.
    pub async fn initialize(store: Arc<S>, config: GateConfig) -> Result<Self, GateError> {
        Self::initialize_with_metrics(store, config, Arc::new(Metrics::new())).await
    }

    /// Like [`initialize`](Self::initialize), sharing an existing metrics collector.
    pub async fn initialize_with_metrics(
        store: Arc<S>,
        config: GateConfig,
        metrics: Arc<Metrics>,
    ) -> Result<Self, GateError> {
        config.validate()?;

        let started = Instant::now();
        let total = store.count().await?;
        let keys = store.enumerate_all_keys().await?;
        let gate = MembershipGate::build(&keys, total, config)?;
        metrics.record_rebuild(started.elapsed());

        Ok(Self::with_gate(store, Arc::new(gate), metrics))
    }

    /// Wire a service around an already-built gate.
    pub fn with_gate(store: Arc<S>, gate: Arc<MembershipGate>, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            gate,
            metrics,
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn gate(&self) -> &Arc<MembershipGate> {
        &self.gate
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Filter-only membership check.
    pub fn check_membership(&self, raw_key: &str) -> MembershipCheck {
        let key = NormalizedKey::new(raw_key);
        let maybe_present = self.gate.probably_contains(&key);
        self.metrics.record_membership_check(maybe_present);
        MembershipCheck { key, maybe_present }
    }

    /// Run the reconciled insert for `raw_key`.
    ///
    /// At most one lookup and one insert reach the store per call.
    pub async fn try_insert(
        &self,
        raw_key: &str,
        payload: S::Payload,
    ) -> Result<InsertResult<S::Record>, GateError> {
        let key = NormalizedKey::new(raw_key);

        let branch = if self.gate.probably_contains(&key) {
            let existing = self
                .store
                .lookup_by_key(&key)
                .await
                .map_err(|e| self.store_failure(&key, e))?;

            if existing.is_some() {
                debug!(key = %key, "Duplicate confirmed by lookup");
                return Ok(self.conflict(key, ConflictSource::Lookup));
            }
            InsertBranch::Reconciliation
        } else {
            InsertBranch::FastPath
        };

        self.insert_and_record(key, payload, branch).await
    }

    /// Shared tail of both branches: insert, record on success, report.
    async fn insert_and_record(
        &self,
        key: NormalizedKey,
        payload: S::Payload,
        branch: InsertBranch,
    ) -> Result<InsertResult<S::Record>, GateError> {
        match self.store.insert_unique(&key, payload).await {
            Ok(record) => {
                self.gate.record_insertion(&key);
                let outcome = branch.success();
                self.metrics.record_insert(outcome);
                debug!(key = %key, ?outcome, "Inserted");
                Ok(InsertResult {
                    key,
                    outcome,
                    record: Some(record),
                })
            }
            Err(StoreError::DuplicateKey { .. }) => {
                if branch == InsertBranch::FastPath {
                    // The filter said absent, so a write bypassed the gate
                    // or landed after the filter was built.
                    warn!(key = %key, "Filter reported absent but store holds the key");
                } else {
                    debug!(key = %key, "Key registered between lookup and insert");
                }
                Ok(self.conflict(key, branch.race()))
            }
            Err(e) => Err(self.store_failure(&key, e)),
        }
    }

    fn conflict(&self, key: NormalizedKey, detected_by: ConflictSource) -> InsertResult<S::Record> {
        let outcome = InsertOutcome::Conflict { detected_by };
        self.metrics.record_insert(outcome);
        InsertResult {
            key,
            outcome,
            record: None,
        }
    }

    fn store_failure(&self, key: &NormalizedKey, error: StoreError) -> GateError {
        self.metrics.record_store_error();
        warn!(key = %key, error = %error, "Store call failed");
        GateError::Store(error)
    }

    /// Snapshot of the live filter configuration.
    pub fn current_filter_stats(&self) -> FilterConfig {
        self.gate.stats()
    }

    /// Rebuild the gate from a fresh store enumeration.
    ///
    /// Insertions recorded while the store is read are replayed into the new
    /// filter. On failure the live filter stays in place.
    pub async fn rebuild_from_store(&self) -> Result<FilterConfig, GateError> {
        let _serial = self.rebuild_lock.lock().await;
        let started = Instant::now();

        let journal = self.gate.start_rebuild();
        let total = self.store.count().await.map_err(|e| {
            self.metrics.record_store_error();
            GateError::Store(e)
        })?;
        let keys = self.store.enumerate_all_keys().await.map_err(|e| {
            self.metrics.record_store_error();
            GateError::Store(e)
        })?;
        let stats = journal.finish(&keys, total, self.gate.sizing().target_fpp)?;

        self.metrics.record_rebuild(started.elapsed());
        Ok(stats)
    }

    /// Rebuild only if the item counter has reached the saturation point.
    pub async fn rebuild_if_saturated(&self) -> Result<Option<FilterConfig>, GateError> {
        if !self.gate.needs_rebuild() {
            return Ok(None);
        }

        let before = self.gate.stats();
        info!(
            current_items = before.current_items,
            expected_capacity = before.expected_capacity,
            "Filter saturated, rebuilding"
        );
        self.rebuild_from_store().await.map(Some)
    }
}

#[async_trait]
impl<S: UniqueKeyStore + 'static> RegistrationApi for RegistrationService<S> {
    type Payload = S::Payload;
    type Record = S::Record;

    fn check_membership(&self, raw_key: &str) -> MembershipCheck {
        RegistrationService::check_membership(self, raw_key)
    }

    async fn try_insert(
        &self,
        raw_key: &str,
        payload: S::Payload,
    ) -> Result<InsertResult<S::Record>, GateError> {
        RegistrationService::try_insert(self, raw_key, payload).await
    }

    fn current_filter_stats(&self) -> FilterConfig {
        RegistrationService::current_filter_stats(self)
    }

    async fn rebuild(&self) -> Result<FilterConfig, GateError> {
        self.rebuild_from_store().await
    }
}
