//! Password policy for new passwords.
//!
//! Passwords travel base64-encoded in request bodies; the policy applies
//! to the decoded text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use pss_core::error::AppError;

/// Minimum password length in characters.
pub const MIN_LENGTH: usize = 9;
/// Maximum password length in characters.
pub const MAX_LENGTH: usize = 63;

/// Password acceptance rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordPolicy;

impl PasswordPolicy {
    /// Decodes a base64 password and validates the result.
    pub fn decode_and_validate(encoded: &str) -> Result<String, AppError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AppError::validation("Password must be valid base64"))?;
        let password = String::from_utf8(bytes)
            .map_err(|_| AppError::validation("Password must be valid UTF-8"))?;
        Self::validate(&password)?;
        Ok(password)
    }

    /// Validates a plaintext password.
    pub fn validate(password: &str) -> Result<(), AppError> {
        let len = password.chars().count();
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&len) {
            return Err(AppError::validation(format!(
                "Password must be between {MIN_LENGTH} and {MAX_LENGTH} characters long"
            )));
        }

        if !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::validation(
                "Password must contain at least one letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        Ok(())
    }
}
