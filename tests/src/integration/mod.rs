//! Integration tests across the gate, the service and the runtime.

pub mod concurrency;
pub mod flows;
