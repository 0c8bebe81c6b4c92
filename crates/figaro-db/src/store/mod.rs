//! Store traits consumed by the service layer, with a `PostgreSQL`
//! implementation and an optional in-memory one.

#[cfg(feature = "memory")]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DbResult;
use crate::model::center::Center;
use crate::model::credential::BearerRecord;
use crate::model::shared_folder::{SharedFolder, SharedFolderDraft, SharedFolderWithCenter};
use crate::model::user::{User, UserDraft};

/// Upper bound on username candidates tried while provisioning.
pub const MAX_PROVISION_ATTEMPTS: usize = 16;

/// Accounts and centers.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: i32) -> DbResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>>;

    /// Permission strings of a user. Duplicates are returned as stored.
    async fn permissions_for(&self, user_id: i32) -> DbResult<Vec<String>>;

    async fn create_user(&self, draft: &UserDraft, permissions: &[String]) -> DbResult<User>;

    /// ## Summary
    /// Returns the user owning `email`, creating it in one transaction when
    /// absent. The username is the email's local part, suffixed `1`, `2`, …
    /// on collision. The password hash is left empty.
    async fn provision_user(
        &self,
        email: &str,
        display_name: &str,
        permissions: &[String],
    ) -> DbResult<User>;

    /// Deletes a user together with its sessions, tokens and permissions.
    async fn delete_user(&self, id: i32) -> DbResult<()>;

    /// Replaces a user's default center. Unknown users are a no-op.
    async fn set_default_center(&self, user_id: i32, center_id: i32, now: DateTime<Utc>) -> DbResult<()>;

    async fn create_center(&self, name: &str) -> DbResult<Center>;
    async fn find_center(&self, id: i32) -> DbResult<Option<Center>>;

    /// All centers, by name.
    async fn list_centers(&self) -> DbResult<Vec<Center>>;
}

/// One table of opaque bearer credentials.
#[async_trait]
pub trait BearerStore<R: BearerRecord>: Send + Sync {
    async fn insert(&self, record: R) -> DbResult<R>;

    /// The record holding `token`, if active and unexpired at `now`.
    async fn find_usable(&self, token: &str, now: DateTime<Utc>) -> DbResult<Option<R>>;

    /// Records activity on the active record holding `token`.
    async fn touch(&self, token: &str, now: DateTime<Utc>) -> DbResult<()>;

    /// Deactivates a record, scoped to `owner` when given. Unknown ids are a no-op.
    async fn deactivate(&self, id: &str, owner: Option<i32>) -> DbResult<()>;

    /// Deactivates all of a user's records except `exempt_id`.
    async fn deactivate_all_except(&self, user_id: i32, exempt_id: &str) -> DbResult<()>;

    /// Usable records of a user, most recent activity first.
    async fn list_usable(&self, user_id: i32, now: DateTime<Utc>) -> DbResult<Vec<R>>;
}

/// Shared folder catalog.
#[async_trait]
pub trait SharedFolderStore: Send + Sync {
    /// Active folders visible to a center, global first then newest first.
    async fn list_visible_folders(
        &self,
        center_id: Option<i32>,
    ) -> DbResult<Vec<SharedFolderWithCenter>>;

    /// The active folder called `name`; a center-scoped folder beats a
    /// global one with the same name.
    async fn find_visible_folder(
        &self,
        name: &str,
        center_id: Option<i32>,
    ) -> DbResult<Option<SharedFolder>>;

    async fn find_folder(&self, id: i32) -> DbResult<Option<SharedFolder>>;

    /// Whether an active folder already stores its files at `local_path`.
    async fn local_path_in_use(&self, local_path: &str) -> DbResult<bool>;

    async fn create_folder(&self, draft: &SharedFolderDraft) -> DbResult<SharedFolder>;
    async fn deactivate_folder(&self, id: i32, now: DateTime<Utc>) -> DbResult<()>;
}

/// The part of an email before `@`, or `user` when that is empty.
#[must_use]
pub fn email_local_part(email: &str) -> &str {
    let local = email.split('@').next().unwrap_or_default();
    if local.is_empty() { "user" } else { local }
}

/// The first candidate username not present in `taken`.
#[must_use]
pub fn free_username<S: AsRef<str>>(base: &str, taken: &[S]) -> String {
    let is_taken = |candidate: &str| taken.iter().any(|t| t.as_ref() == candidate);
    if !is_taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
