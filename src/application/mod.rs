//! Application layer services implementing business logic.
//!
//! Services own the key layout and the store-facing rules; HTTP handlers and the
//! admin CLI only call into them.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short code allocation and resolution
//! - [`services::quota_service::QuotaService`] - Per-client request budgets
//! - [`services::analytics_service::AnalyticsService`] - Resolution counting

pub mod services;
