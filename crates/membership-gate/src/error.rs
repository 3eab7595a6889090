//! Error types for the membership gate

use thiserror::Error;

/// Errors surfaced by the gate and the registration service
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors reported by the authoritative store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate key: {key}")]
    DuplicateKey { key: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout")]
    Timeout,

    #[error("Query error: {0}")]
    Query(String),
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}
