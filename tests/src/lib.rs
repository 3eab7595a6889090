//! # Membership Gate Test Suite
//!
//! Unified test crate for cross-crate behaviour.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── flows.rs         # Registration flows over the in-memory store
//! │   └── concurrency.rs   # Multi-threaded insert and rebuild races
//! └── benches/
//!     └── gate_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gate-tests
//! cargo test -p gate-tests integration::concurrency::
//!
//! # Benchmarks
//! cargo bench -p gate-tests
//! ```

pub mod integration;
