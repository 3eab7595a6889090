//! # Membership Gate
//!
//! Probabilistic pre-filter in front of a unique-key store. A Bloom filter
//! answers "definitely absent" or "maybe present" for a normalized key; the
//! store stays the only authority on uniqueness.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `compute_dimensions`: bit count and hash count from capacity and FPP
//!   - `BloomFilter`: bit array with double hashing over MurmurHash3
//!   - `MembershipGate`: live (filter, config) pair behind one lock, with
//!     atomic rebuild-and-swap
//!   - `GateConfig` / `GateConfigBuilder`: sizing settings with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `RegistrationApi`: Driving port (inbound API)
//!   - `UniqueKeyStore`: Driven port (authoritative store)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `RegistrationService`: reconciled insert over a `UniqueKeyStore`
//!
//! - **Adapters Layer** (`adapters/`): Concrete stores
//!   - `InMemoryUserStore`: process-local user table keyed by email
//!
//! ## Guarantees
//!
//! - No false negatives: once `record_insertion(k)` returns, the gate
//!   reports `k` as maybe present until the next rebuild, and the rebuild
//!   includes every key the store enumerates.
//! - No duplicate writes: uniqueness is decided by the store's unique
//!   insert, never by the filter.
//!
//! ## Usage Example
//!
//! ```ignore
//! use membership_gate::{GateConfig, InMemoryUserStore, NewUser, RegistrationService};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryUserStore::new());
//! store.seed_if_empty();
//!
//! let service = RegistrationService::initialize(store, GateConfig::default()).await?;
//!
//! let result = service.try_insert("New@X.com", NewUser::new("New User")).await?;
//! assert!(result.outcome.is_success());
//! assert!(service.check_membership("new@x.com").maybe_present);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{InMemoryUserStore, NewUser, UserRecord, SAMPLE_USERS};
pub use domain::{
    compute_dimensions, BloomFilter, FilterConfig, FilterDimensions, GateConfig,
    GateConfigBuilder, MembershipGate, NormalizedKey,
};
pub use error::{GateError, StoreError};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{
    ConflictSource, InsertOutcome, InsertResult, MembershipCheck, RegistrationApi, UniqueKeyStore,
};
pub use service::RegistrationService;
