//! WebDAV write locks.
//!
//! Exclusive write locks only, kept in memory. Each gateway root owns one
//! [`LockTable`]; the [`LockRegistry`] hands them out by canonical root path.
//! Expired locks are dropped whenever a table is touched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use figaro_rfc::rfc::dav::core::{ActiveLock, Depth, LockOwner, Timeout};
use salvo::http::StatusCode;
use thiserror::Error;

use super::path::DavPath;

pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 3600;
pub const MAX_LOCK_TIMEOUT_SECS: u64 = 7 * 24 * 3600;

const LOCK_TOKEN_SCHEME: &str = "opaquelocktoken:";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// A new lock overlaps an existing one.
    #[error("Conflicting lock")]
    Conflict,

    /// The resource is locked and no covering token was submitted.
    #[error("Resource locked")]
    Locked,

    /// The submitted token does not exist or does not cover the resource.
    #[error("Lock token not held")]
    NotHeld,
}

impl LockError {
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::Conflict | Self::Locked => StatusCode::LOCKED,
            Self::NotHeld => StatusCode::CONFLICT,
        }
    }
}

/// Seconds a lock lasts for a requested timeout.
#[must_use]
pub fn effective_timeout_secs(timeout: Option<Timeout>) -> u64 {
    match timeout {
        None => DEFAULT_LOCK_TIMEOUT_SECS,
        Some(Timeout::Infinite) => MAX_LOCK_TIMEOUT_SECS,
        Some(Timeout::Seconds(secs)) => secs.clamp(1, MAX_LOCK_TIMEOUT_SECS),
    }
}

#[derive(Debug, Clone)]
pub struct LockRequest {
    pub path: DavPath,
    pub depth: Depth,
    pub owner: Option<LockOwner>,
    pub timeout: Option<Timeout>,
}

/// A lock held in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedLock {
    pub token: String,
    pub path: DavPath,
    pub depth: Depth,
    pub owner: Option<LockOwner>,
    pub expires_at: DateTime<Utc>,
}

impl GrantedLock {
    /// Whether this lock applies to `path`.
    #[must_use]
    pub fn covers(&self, path: &DavPath) -> bool {
        *path == self.path || (self.depth == Depth::Infinity && path.starts_with(&self.path))
    }

    /// Renders the lock for `D:lockdiscovery`, with `root_href` as lock root.
    #[must_use]
    pub fn to_active_lock(&self, root_href: String, now: DateTime<Utc>) -> ActiveLock {
        let remaining = (self.expires_at - now).num_seconds().max(0);
        ActiveLock {
            token: self.token.clone(),
            root: root_href,
            depth: self.depth,
            owner: self.owner.clone(),
            timeout_secs: u64::try_from(remaining).unwrap_or_default(),
        }
    }
}

fn expiry(now: DateTime<Utc>, timeout: Option<Timeout>) -> DateTime<Utc> {
    let secs = i64::try_from(effective_timeout_secs(timeout)).unwrap_or(i64::MAX);
    now + Duration::seconds(secs)
}

/// Locks of one gateway root.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: Mutex<Vec<GrantedLock>>,
}

impl LockTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self, now: DateTime<Utc>) -> MutexGuard<'_, Vec<GrantedLock>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|lock| lock.expires_at > now);
        locks
    }

    /// ## Summary
    /// Grants a new exclusive lock.
    ///
    /// ## Errors
    /// Returns `Conflict` if an active lock covers the path, or the request
    /// has depth infinity and an active lock sits below the path.
    pub fn lock(&self, request: LockRequest, now: DateTime<Utc>) -> Result<GrantedLock, LockError> {
        let mut locks = self.live(now);
        let conflict = locks.iter().any(|held| {
            held.covers(&request.path)
                || (request.depth == Depth::Infinity && held.path.starts_with(&request.path))
        });
        if conflict {
            return Err(LockError::Conflict);
        }

        let granted = GrantedLock {
            token: format!("{LOCK_TOKEN_SCHEME}{}", uuid::Uuid::new_v4()),
            path: request.path,
            depth: request.depth,
            owner: request.owner,
            expires_at: expiry(now, request.timeout),
        };
        locks.push(granted.clone());
        Ok(granted)
    }

    /// ## Summary
    /// Renews the first of `tokens` that holds a lock covering `path`.
    ///
    /// ## Errors
    /// Returns `NotHeld` if none does.
    pub fn refresh(
        &self,
        tokens: &[String],
        path: &DavPath,
        timeout: Option<Timeout>,
        now: DateTime<Utc>,
    ) -> Result<GrantedLock, LockError> {
        let mut locks = self.live(now);
        let held = locks
            .iter_mut()
            .find(|held| tokens.contains(&held.token) && held.covers(path))
            .ok_or(LockError::NotHeld)?;
        held.expires_at = expiry(now, timeout);
        Ok(held.clone())
    }

    /// ## Summary
    /// Releases the lock identified by `token`.
    ///
    /// ## Errors
    /// Returns `NotHeld` if the token is unknown or its lock does not cover
    /// `path`.
    pub fn unlock(&self, token: &str, path: &DavPath, now: DateTime<Utc>) -> Result<(), LockError> {
        let mut locks = self.live(now);
        let index = locks
            .iter()
            .position(|held| held.token == token && held.covers(path))
            .ok_or(LockError::NotHeld)?;
        locks.remove(index);
        Ok(())
    }

    /// ## Summary
    /// Checks that a write to `path` may proceed with the submitted tokens.
    /// With `with_descendants`, locks below `path` count as well.
    ///
    /// ## Errors
    /// Returns `Locked` if an applicable lock's token was not submitted.
    pub fn check_write(
        &self,
        path: &DavPath,
        tokens: &[String],
        with_descendants: bool,
        now: DateTime<Utc>,
    ) -> Result<(), LockError> {
        let locks = self.live(now);
        let blocked = locks.iter().any(|held| {
            let applies = held.covers(path) || (with_descendants && held.path.starts_with(path));
            applies && !tokens.contains(&held.token)
        });
        if blocked {
            Err(LockError::Locked)
        } else {
            Ok(())
        }
    }

    /// Active locks covering `path`.
    #[must_use]
    pub fn discover(&self, path: &DavPath, now: DateTime<Utc>) -> Vec<GrantedLock> {
        self.live(now)
            .iter()
            .filter(|held| held.covers(path))
            .cloned()
            .collect()
    }

    /// Drops every lock rooted at or below `path`.
    pub fn release_tree(&self, path: &DavPath) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|held| !held.path.starts_with(path));
    }
}

/// Lock tables keyed by canonical root path.
#[derive(Debug, Default)]
pub struct LockRegistry {
    tables: Mutex<HashMap<PathBuf, Arc<LockTable>>>,
}

impl LockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table_for(&self, root: &Path) -> Arc<LockTable> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(tables.entry(root.to_path_buf()).or_default())
    }
}
