//! In-memory user store
//!
//! A process-local stand-in for the durable user table: records keyed by
//! normalized email, with the check-and-insert done under one write lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::domain::NormalizedKey;
use crate::error::StoreError;
use crate::ports::UniqueKeyStore;

/// Sample users loaded by [`InMemoryUserStore::seed_if_empty`] as (name, email).
pub const SAMPLE_USERS: [(&str, &str); 6] = [
    ("Ada Lovelace", "ada@example.com"),
    ("Linus Torvalds", "linus@example.com"),
    ("Grace Hopper", "grace@example.com"),
    ("Satoshi Nakamoto", "satoshi@example.com"),
    ("Neeraj Butola", "neeraj@example.com"),
    ("Alan Turing", "alan@example.com"),
];

/// A registered user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    /// Normalized email, the unique key
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Default)]
struct UserTable {
    users: HashMap<String, UserRecord>,
    /// Last assigned id; ids start at 1
    last_id: u64,
}

impl UserTable {
    fn insert(&mut self, key: &NormalizedKey, name: String, now: DateTime<Utc>) -> Option<UserRecord> {
        if self.users.contains_key(key.as_str()) {
            return None;
        }
        self.last_id += 1;
        let record = UserRecord {
            id: self.last_id,
            email: key.as_str().to_string(),
            name,
            created_at: now,
        };
        self.users.insert(record.email.clone(), record.clone());
        Some(record)
    }
}

/// In-memory user store keyed by normalized email.
#[derive(Default)]
pub struct InMemoryUserStore {
    table: RwLock<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the sample users if the store is empty.
    ///
    /// Returns the number of users inserted.
    pub fn seed_if_empty(&self) -> usize {
        let mut table = self.table.write();
        if !table.users.is_empty() {
            return 0;
        }

        let now = Utc::now();
        let inserted = SAMPLE_USERS
            .iter()
            .filter_map(|(name, email)| {
                table.insert(&NormalizedKey::new(email), name.to_string(), now)
            })
            .count();

        info!(inserted, "Seeded empty user store with sample users");
        inserted
    }

    pub fn len(&self) -> usize {
        self.table.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records stored under `key` (0 or 1).
    pub fn records_for(&self, key: &NormalizedKey) -> usize {
        usize::from(self.table.read().users.contains_key(key.as_str()))
    }
}

#[async_trait]
impl UniqueKeyStore for InMemoryUserStore {
    type Payload = NewUser;
    type Record = UserRecord;

    async fn enumerate_all_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.table.read().users.keys().cloned().collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.len())
    }

    async fn lookup_by_key(&self, key: &NormalizedKey) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.table.read().users.get(key.as_str()).cloned())
    }

    async fn insert_unique(
        &self,
        key: &NormalizedKey,
        payload: NewUser,
    ) -> Result<UserRecord, StoreError> {
        self.table
            .write()
            .insert(key, payload.name, Utc::now())
            .ok_or_else(|| StoreError::DuplicateKey {
                key: key.as_str().to_string(),
            })
    }
}
