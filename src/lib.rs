//! # RediLink
//!
//! A URL shortener with per-client quotas, built with Axum over an expiring
//! key-value store (Redis, or an in-process store for development).
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities, key layout and the store contract
//! - **Application Layer** ([`application`]) - Code registry, quota tracking and analytics
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-memory stores
//! - **API Layer** ([`api`]) - REST handlers, DTOs and middleware
//!
//! ## Features
//!
//! - Random or custom short codes with per-link expiry
//! - Per-client quota with a 30-minute refill window
//! - Hostname denylist
//! - Best-effort resolution counting
//!
//! ## Quick Start
//!
//! ```bash
//! export API_QUOTA=10
//! export DOMAIN="localhost:3000"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AnalyticsService, LinkService, QuotaService};
    pub use crate::domain::entities::{LinkDetails, QuotaCheck, QuotaStatus, ShortLink};
    pub use crate::domain::repositories::KeyValueStore;
    pub use crate::error::AppError;
    pub use crate::infrastructure::store::{InMemoryStore, RedisStore};
    pub use crate::state::AppState;
}
