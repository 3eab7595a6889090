//! Metrics hooks for gate operations
//!
//! In-process counters for membership checks, insert paths, conflicts and
//! rebuilds. Nothing is exported; callers read a [`MetricsSnapshot`].
//!
//! ## Usage
//!
//! ```ignore
//! use membership_gate::metrics::Metrics;
//!
//! let metrics = Metrics::new();
//! metrics.record_membership_check(true);
//! metrics.record_insert(InsertOutcome::FastPath);
//! let snapshot = metrics.snapshot();
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::ports::{ConflictSource, InsertOutcome};

/// Metrics collector for gate operations
///
/// Thread-safe counters for monitoring how often the filter saves a store
/// round trip and how often it misleads.
#[derive(Default)]
pub struct Metrics {
    /// Total filter-only membership checks
    pub membership_checks: AtomicU64,
    /// Membership checks answered "maybe present"
    pub membership_hits: AtomicU64,
    /// Inserts that skipped the lookup
    pub fast_path_inserts: AtomicU64,
    /// Inserts after the lookup overturned a filter hit
    pub false_positive_inserts: AtomicU64,
    /// Duplicates confirmed by the lookup
    pub conflicts_confirmed: AtomicU64,
    /// Duplicates reported by the store's unique insert
    pub conflicts_raced: AtomicU64,
    /// Store failures propagated to the caller
    pub store_errors: AtomicU64,
    /// Completed rebuilds
    pub rebuilds: AtomicU64,
    /// Cumulative rebuild time in milliseconds
    pub rebuild_time_ms: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_membership_check(&self, maybe_present: bool) {
        self.membership_checks.fetch_add(1, Ordering::Relaxed);
        if maybe_present {
            self.membership_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record the outcome of one reconciled insert
    pub fn record_insert(&self, outcome: InsertOutcome) {
        let counter = match outcome {
            InsertOutcome::FastPath => &self.fast_path_inserts,
            InsertOutcome::FalsePositivePath => &self.false_positive_inserts,
            InsertOutcome::Conflict {
                detected_by: ConflictSource::Lookup,
            } => &self.conflicts_confirmed,
            InsertOutcome::Conflict { .. } => &self.conflicts_raced,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebuild(&self, duration: Duration) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        self.rebuild_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            membership_checks: self.membership_checks.load(Ordering::Relaxed),
            membership_hits: self.membership_hits.load(Ordering::Relaxed),
            fast_path_inserts: self.fast_path_inserts.load(Ordering::Relaxed),
            false_positive_inserts: self.false_positive_inserts.load(Ordering::Relaxed),
            conflicts_confirmed: self.conflicts_confirmed.load(Ordering::Relaxed),
            conflicts_raced: self.conflicts_raced.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            avg_rebuild_ms: self.avg_rebuild_time_ms(),
        }
    }

    pub fn avg_rebuild_time_ms(&self) -> u64 {
        let total = self.rebuild_time_ms.load(Ordering::Relaxed);
        let count = self.rebuilds.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Share of filter-positive inserts that turned out to be false positives.
    ///
    /// Filter-positive inserts are those that went through a lookup: either
    /// the lookup confirmed a duplicate or the key was inserted after all.
    pub fn observed_false_positive_ratio(&self) -> f64 {
        let false_positives = self.false_positive_inserts.load(Ordering::Relaxed);
        let confirmed = self.conflicts_confirmed.load(Ordering::Relaxed);
        let total = false_positives + confirmed;
        if total > 0 {
            false_positives as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn successful_inserts(&self) -> u64 {
        self.fast_path_inserts.load(Ordering::Relaxed)
            + self.false_positive_inserts.load(Ordering::Relaxed)
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub membership_checks: u64,
    pub membership_hits: u64,
    pub fast_path_inserts: u64,
    pub false_positive_inserts: u64,
    pub conflicts_confirmed: u64,
    pub conflicts_raced: u64,
    pub store_errors: u64,
    pub rebuilds: u64,
    pub avg_rebuild_ms: u64,
}
