use figaro_core::constants::SUPERUSER_PERMISSION;

use super::identity::Identity;

/// ## Summary
/// Whether `identity` may exercise `capability`.
///
/// No identity is always denied. `ADMIN` grants everything; otherwise the
/// capability must be present verbatim.
#[must_use]
pub fn has_access(identity: Option<&Identity>, capability: &str) -> bool {
    let Some(identity) = identity else {
        return false;
    };

    identity
        .permissions
        .iter()
        .any(|p| p == SUPERUSER_PERMISSION || p == capability)
}
