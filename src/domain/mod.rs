//! Domain layer containing the core data model and the store contract.
//!
//! # Architecture
//!
//! - [`entities`] - Short links and quota snapshots
//! - [`repositories`] - The [`repositories::KeyValueStore`] trait every record lives behind
//! - [`keys`] - Storage key layout shared by services and the admin CLI
//!
//! # Design Principles
//!
//! - Service instances hold no authoritative state; the store is the single
//!   source of truth, so any number of instances can serve the same data
//! - Store implementations live in `crate::infrastructure::store`
//! - Business rules live in [`crate::application::services`]

pub mod entities;
pub mod keys;
pub mod repositories;
