//! Core domain entities.
//!
//! - [`ShortLink`] - A code → target mapping with its lifetime
//! - [`QuotaCheck`] / [`QuotaStatus`] - Snapshots of a client's quota window
//!
//! Entities are plain data; the records themselves only ever exist in the store.

pub mod quota;
pub mod short_link;

pub use quota::{QuotaCheck, QuotaStatus};
pub use short_link::{LinkDetails, ShortLink};
