//! Password and QR-code login.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use figaro_db::store::UserStore;

use super::identity::Identity;
use super::password::verify_password;
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Authenticates a username and password.
///
/// ## Errors
/// Returns `InvalidCredentials` for an unknown user or a wrong password,
/// and store errors as-is.
#[tracing::instrument(skip(users, password))]
pub async fn login_with_password(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> ServiceResult<Identity> {
    match check_password(users, username, password).await {
        Err(ServiceError::UserNotFound) => {
            tracing::debug!("Login for unknown user");
            Err(ServiceError::InvalidCredentials)
        }
        other => other,
    }
}

async fn check_password(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> ServiceResult<Identity> {
    let user = users
        .find_user_by_username(username)
        .await?
        .ok_or(ServiceError::UserNotFound)?;

    if !verify_password(&user.password_hash, password) {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(ServiceError::InvalidCredentials);
    }

    Identity::load(users, user).await
}

/// Credentials carried by a login QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCredentials {
    pub username: String,
    pub password: String,
}

/// The hex SHA-256 digest a QR payload carries for `username:password`.
#[must_use]
pub fn qr_digest(username: &str, password: &str) -> String {
    hex::encode(Sha256::digest(format!("{username}:{password}").as_bytes()))
}

/// Builds the payload printed on a login QR code.
#[must_use]
pub fn encode_qr_payload(username: &str, password: &str) -> String {
    format!(
        "{username}:{}:{}",
        STANDARD.encode(password.as_bytes()),
        qr_digest(username, password)
    )
}

/// ## Summary
/// Parses `username:base64(password):hex(sha256(username:password))`.
///
/// ## Errors
/// Returns `InvalidCredentials` if the payload is malformed or the digest
/// does not match.
pub fn decode_qr_payload(payload: &str) -> ServiceResult<QrCredentials> {
    let parts: Vec<&str> = payload.trim().split(':').collect();
    let [username, encoded, digest] = parts.as_slice() else {
        return Err(ServiceError::InvalidCredentials);
    };

    let password = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or(ServiceError::InvalidCredentials)?;

    if qr_digest(username, &password) != *digest {
        return Err(ServiceError::InvalidCredentials);
    }

    Ok(QrCredentials {
        username: (*username).to_string(),
        password,
    })
}

/// ## Summary
/// Authenticates the contents of a login QR code.
///
/// ## Errors
/// Returns `InvalidCredentials` for a malformed or tampered payload, or
/// whatever password login returns.
#[tracing::instrument(skip_all)]
pub async fn login_with_qr(users: &dyn UserStore, payload: &str) -> ServiceResult<Identity> {
    let credentials = decode_qr_payload(payload).inspect_err(|_err| {
        tracing::debug!("Rejected QR payload");
    })?;
    login_with_password(users, &credentials.username, &credentials.password).await
}
