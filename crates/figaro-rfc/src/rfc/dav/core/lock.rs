//! LOCK request and active lock types.

use super::depth::Depth;

/// Lock scope requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockScope {
    Exclusive,
    Shared,
}

/// The owner element of a lock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOwner {
    Href(String),
    Text(String),
}

/// A parsed `D:lockinfo` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockInfo {
    pub scope: LockScope,
    pub owner: Option<LockOwner>,
}

/// A `Timeout` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Seconds(u64),
    Infinite,
}

impl Timeout {
    /// Parses the first usable entry of a `Timeout` header.
    ///
    /// `Timeout: Infinite, Second-4100000000` yields `Infinite`.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        value.split(',').find_map(|entry| {
            let entry = entry.trim();
            if entry.eq_ignore_ascii_case("infinite") {
                return Some(Self::Infinite);
            }
            let (prefix, seconds) = entry.split_at_checked(7)?;
            if prefix.eq_ignore_ascii_case("second-") {
                seconds.parse().ok().map(Self::Seconds)
            } else {
                None
            }
        })
    }
}

/// A granted lock, ready for `D:lockdiscovery` rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLock {
    /// `opaquelocktoken:` URI.
    pub token: String,
    /// Href of the locked resource.
    pub root: String,
    pub depth: Depth,
    pub owner: Option<LockOwner>,
    /// Remaining seconds before expiry.
    pub timeout_secs: u64,
}
