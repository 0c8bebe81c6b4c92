//! Token material drawn from the OS CSPRNG.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// `len` random bytes as lowercase hex.
#[must_use]
pub fn random_hex(len: usize) -> String {
    hex::encode(random_bytes(len))
}

/// `len` random bytes as URL-safe base64 without padding.
#[must_use]
pub fn random_url_safe(len: usize) -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(len))
}
