//! Short code generation and validation utilities.

use crate::error::AppError;
use serde_json::json;
use uuid::Uuid;

/// Length of generated short codes.
pub const GENERATED_CODE_LENGTH: usize = 6;

/// Longest custom code accepted.
pub const MAX_CUSTOM_CODE_LENGTH: usize = 50;

/// Codes that would be shadowed by fixed routes.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Generates a random short code from the first characters of a UUIDv4.
///
/// The result is six lowercase hex characters. Collisions are rare enough that
/// callers only need to retry on an occupied key.
pub fn generate_code() -> String {
    let mut code = Uuid::new_v4().simple().to_string();
    code.truncate(GENERATED_CODE_LENGTH);
    code
}

/// Validates a user-provided custom short code.
///
/// Custom codes are otherwise opaque and used verbatim (case-sensitive).
///
/// # Rules
///
/// - At most 50 characters
/// - No `/`, `?`, `#`, `%` or whitespace (the code must come back unchanged as a
///   single decoded path segment)
/// - Not a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.chars().count() > MAX_CUSTOM_CODE_LENGTH {
        return Err(AppError::bad_request(
            "Custom short code is too long",
            json!({ "max_length": MAX_CUSTOM_CODE_LENGTH }),
        ));
    }

    if code
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
    {
        return Err(AppError::bad_request(
            "Custom short code contains invalid characters",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This short code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
