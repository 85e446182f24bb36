//! Utility functions for code generation, URL processing, and request handling.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_normalizer`] - URL normalization and validation
//! - [`denylist`] - Hostname denylist matching
//! - [`client_ip`] - Client identifier extraction from requests

pub mod client_ip;
pub mod code_generator;
pub mod denylist;
pub mod url_normalizer;
