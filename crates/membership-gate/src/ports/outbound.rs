//! Outbound Ports (Driven Ports)
//!
//! The authoritative store the gate sits in front of. Its unique insert
//! is atomic at the store's own concurrency boundary and reports a
//! duplicate key distinctly from every other failure.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::NormalizedKey;
use crate::error::StoreError;

/// Durable keyed records with an atomic unique insert (Driven Port)
#[async_trait]
pub trait UniqueKeyStore: Send + Sync {
    /// Data supplied with a new record (everything except the key)
    type Payload: Send + Sync;
    /// A committed record
    type Record: Clone + Debug + Send + Sync;

    /// Every key currently stored. Used only at startup and rebuild.
    async fn enumerate_all_keys(&self) -> Result<Vec<String>, StoreError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Authoritative existence lookup.
    async fn lookup_by_key(&self, key: &NormalizedKey)
        -> Result<Option<Self::Record>, StoreError>;

    /// Insert a record unless the key already exists.
    ///
    /// Must fail with [`StoreError::DuplicateKey`] when the key is taken.
    async fn insert_unique(
        &self,
        key: &NormalizedKey,
        payload: Self::Payload,
    ) -> Result<Self::Record, StoreError>;
}
