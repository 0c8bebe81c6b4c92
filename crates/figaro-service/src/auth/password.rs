use crate::error::{ServiceError, ServiceResult};

/// Prefix of hashes produced by PHP's `password_hash`.
const PHP_BCRYPT_PREFIX: &str = "$2y$";
const BCRYPT_PREFIX: &str = "$2b$";

/// ## Summary
/// Hashes a password with bcrypt at the default cost.
///
/// ## Errors
/// Returns an error if bcrypt rejects the input.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

/// ## Summary
/// Hashes a password with bcrypt at the given cost. Always emits `$2b$`.
///
/// ## Errors
/// Returns an error if the cost is out of range.
pub fn hash_password_with_cost(password: &str, cost: u32) -> ServiceResult<String> {
    bcrypt::hash(password, cost).map_err(|err| {
        tracing::error!(error = %err, "Failed to hash password");
        ServiceError::InvariantViolation("password hashing failed")
    })
}

/// ## Summary
/// Verifies a password against a stored bcrypt hash.
///
/// A `$2y$` hash that does not verify as-is is retried once with the
/// marker rewritten to `$2b$`. Malformed or empty hashes yield `false`.
#[must_use]
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    if matches!(bcrypt::verify(password, password_hash), Ok(true)) {
        return true;
    }

    password_hash
        .strip_prefix(PHP_BCRYPT_PREFIX)
        .is_some_and(|rest| {
            tracing::trace!("Retrying verification with the $2b$ marker");
            matches!(
                bcrypt::verify(password, &format!("{BCRYPT_PREFIX}{rest}")),
                Ok(true)
            )
        })
}
