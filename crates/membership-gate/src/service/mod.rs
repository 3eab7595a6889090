//! Service Layer
//!
//! Hosts the reconciled insert: the gate check, the authoritative store
//! calls, and the filter update on success.

pub mod registration_service;

pub use registration_service::RegistrationService;
