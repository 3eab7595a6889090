//! Inbound Ports (Driving Ports)
//!
//! The API the enclosing request layer uses: membership checks, the
//! reconciled insert, and read-only filter statistics.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{FilterConfig, NormalizedKey};
use crate::error::GateError;

/// Result of a membership check
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipCheck {
    /// The key after normalization
    pub key: NormalizedKey,
    /// `false` means definitely absent
    pub maybe_present: bool,
}

/// Which step detected a duplicate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictSource {
    /// Filter said maybe, the store lookup confirmed the key
    Lookup,
    /// Filter said absent, yet the store rejected the insert as duplicate
    FastPathRace,
    /// Lookup found nothing, but the insert still hit a duplicate
    ReconciliationRace,
}

/// How a reconciled insert ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "via")]
pub enum InsertOutcome {
    /// Filter said absent; inserted directly
    FastPath,
    /// Filter said maybe, lookup overturned it; inserted
    FalsePositivePath,
    /// The key is already registered
    Conflict { detected_by: ConflictSource },
}

impl InsertOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InsertOutcome::FastPath | InsertOutcome::FalsePositivePath)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, InsertOutcome::Conflict { .. })
    }
}

/// Result of a reconciled insert
#[derive(Clone, Debug)]
pub struct InsertResult<R> {
    /// The key after normalization
    pub key: NormalizedKey,
    pub outcome: InsertOutcome,
    /// The committed record, present on success only
    pub record: Option<R>,
}

/// Primary registration API (Driving Port)
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    type Payload: Send;
    type Record: Send;

    /// Filter-only membership check; never touches the store.
    fn check_membership(&self, raw_key: &str) -> MembershipCheck;

    /// Run the reconciled insert protocol for `raw_key`.
    ///
    /// A duplicate key is reported as [`InsertOutcome::Conflict`], never as
    /// an error. Other store failures are returned unmodified.
    async fn try_insert(
        &self,
        raw_key: &str,
        payload: Self::Payload,
    ) -> Result<InsertResult<Self::Record>, GateError>;

    /// Snapshot of the live filter configuration.
    fn current_filter_stats(&self) -> FilterConfig;

    /// Rebuild the filter from a fresh store enumeration.
    async fn rebuild(&self) -> Result<FilterConfig, GateError>;
}
