//! Infrastructure layer for external integrations.
//!
//! Implements the [`crate::domain::repositories::KeyValueStore`] contract.
//!
//! # Modules
//!
//! - [`store`] - Redis and in-memory store implementations

pub mod store;
