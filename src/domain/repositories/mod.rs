//! Store contract for the domain layer.
//!
//! Every record the service owns (short links, quota windows, the resolution
//! counter) lives behind [`KeyValueStore`]. Implementations live in
//! `crate::infrastructure::store`; a `mockall` mock is generated for unit tests.

pub mod kv_store;

pub use kv_store::{KeyValueStore, StoreError, StoreResult};

#[cfg(test)]
pub use kv_store::MockKeyValueStore;
