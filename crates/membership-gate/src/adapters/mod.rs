//! Adapters Layer (Driven Adapters)
//!
//! Implementations of the store port.
//!
//! ## Adapters
//!
//! - `InMemoryUserStore` - Process-local user table with an atomic unique insert

pub mod memory_store;

pub use memory_store::{InMemoryUserStore, NewUser, UserRecord, SAMPLE_USERS};
