//! Domain Layer - Pure gate logic
//!
//! This layer contains:
//! - Key normalization
//! - Sizing policy (filter dimensions)
//! - Hash functions
//! - The membership filter
//! - Gate configuration and snapshots
//! - The shared membership gate
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod bloom_filter;
pub mod config;
pub mod gate;
pub mod hash_functions;
pub mod key;
pub mod parameters;

pub use bloom_filter::BloomFilter;
pub use config::{FilterConfig, GateConfig, GateConfigBuilder};
pub use gate::{MembershipGate, RebuildJournal};
pub use key::NormalizedKey;
pub use parameters::{calculate_fpr, compute_dimensions, FilterDimensions, BIT_ALIGNMENT};
