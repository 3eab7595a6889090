//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for the request layer
//! - Driven Ports (outbound) - The authoritative store

pub mod inbound;
pub mod outbound;

pub use inbound::{ConflictSource, InsertOutcome, InsertResult, MembershipCheck, RegistrationApi};
pub use outbound::UniqueKeyStore;
