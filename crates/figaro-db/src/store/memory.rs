//! In-process store with the same observable behavior as [`PgStore`].
//!
//! [`PgStore`]: super::postgres::PgStore

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{BearerStore, SharedFolderStore, UserStore, email_local_part, free_username};
use crate::error::{DbError, DbResult};
use crate::model::center::Center;
use crate::model::credential::BearerRecord;
use crate::model::session::UserSession;
use crate::model::shared_folder::{SharedFolder, SharedFolderDraft, SharedFolderWithCenter};
use crate::model::user::{User, UserDraft};
use crate::model::webdav_token::WebDavToken;

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i32,
    users: Vec<User>,
    permissions: Vec<(i32, String)>,
    centers: Vec<Center>,
    sessions: Vec<UserSession>,
    webdav_tokens: Vec<WebDavToken>,
    folders: Vec<SharedFolder>,
}

impl MemoryState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Maps a credential type to its table in [`MemoryState`].
trait MemoryTable: BearerRecord {
    fn table(state: &mut MemoryState) -> &mut Vec<Self>;
}

impl MemoryTable for UserSession {
    fn table(state: &mut MemoryState) -> &mut Vec<Self> {
        &mut state.sessions
    }
}

impl MemoryTable for WebDavToken {
    fn table(state: &mut MemoryState) -> &mut Vec<Self> {
        &mut state.webdav_tokens
    }
}

/// Store kept entirely in memory. State is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_user(state: &mut MemoryState, draft: &UserDraft, permissions: &[String]) -> DbResult<User> {
        if state.users.iter().any(|u| u.username == draft.username) {
            return Err(DbError::unique_violation("users_username_key"));
        }
        if let Some(email) = &draft.email
            && state.users.iter().any(|u| u.email.as_ref() == Some(email))
        {
            return Err(DbError::unique_violation("users_email_key"));
        }

        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            username: draft.username.clone(),
            email: draft.email.clone(),
            password_hash: draft.password_hash.clone(),
            display_name: draft.display_name.clone(),
            default_center_id: draft.default_center_id,
            force_default_center: draft.force_default_center,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        state
            .permissions
            .extend(permissions.iter().map(|p| (user.id, p.clone())));
        Ok(user)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, id: i32) -> DbResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn permissions_for(&self, user_id: i32) -> DbResult<Vec<String>> {
        Ok(self
            .lock()
            .permissions
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, permission)| permission.clone())
            .collect())
    }

    async fn create_user(&self, draft: &UserDraft, permissions: &[String]) -> DbResult<User> {
        Self::insert_user(&mut self.lock(), draft, permissions)
    }

    async fn provision_user(
        &self,
        email: &str,
        display_name: &str,
        permissions: &[String],
    ) -> DbResult<User> {
        let mut state = self.lock();
        if let Some(existing) = state.users.iter().find(|u| u.email.as_deref() == Some(email)) {
            return Ok(existing.clone());
        }

        let base = email_local_part(email);
        let taken: Vec<&str> = state.users.iter().map(|u| u.username.as_str()).collect();
        let draft = UserDraft {
            username: free_username(base, &taken),
            email: Some(email.to_string()),
            password_hash: String::new(),
            display_name: display_name.to_string(),
            default_center_id: None,
            force_default_center: false,
        };
        Self::insert_user(&mut state, &draft, permissions)
    }

    async fn delete_user(&self, id: i32) -> DbResult<()> {
        let mut state = self.lock();
        state.users.retain(|u| u.id != id);
        state.permissions.retain(|(owner, _)| *owner != id);
        state.sessions.retain(|s| s.user_id != id);
        state.webdav_tokens.retain(|t| t.user_id != id);
        Ok(())
    }

    async fn set_default_center(&self, user_id: i32, center_id: i32, now: DateTime<Utc>) -> DbResult<()> {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.default_center_id = Some(center_id);
            user.updated_at = now;
        }
        Ok(())
    }

    async fn create_center(&self, name: &str) -> DbResult<Center> {
        let mut state = self.lock();
        if state.centers.iter().any(|c| c.name == name) {
            return Err(DbError::unique_violation("centers_name_key"));
        }
        let center = Center {
            id: state.next_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.centers.push(center.clone());
        Ok(center)
    }

    async fn find_center(&self, id: i32) -> DbResult<Option<Center>> {
        Ok(self.lock().centers.iter().find(|c| c.id == id).cloned())
    }

    async fn list_centers(&self) -> DbResult<Vec<Center>> {
        let mut centers = self.lock().centers.clone();
        centers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(centers)
    }
}

impl MemoryStore {
    fn insert_record<R: MemoryTable>(&self, record: R) -> DbResult<R> {
        let mut state = self.lock();
        let table = R::table(&mut state);
        if table
            .iter()
            .any(|r| r.id() == record.id() || r.token() == record.token())
        {
            return Err(DbError::unique_violation("credential_key"));
        }
        table.push(record.clone());
        Ok(record)
    }

    fn find_usable_record<R: MemoryTable>(&self, token: &str, now: DateTime<Utc>) -> Option<R> {
        let mut state = self.lock();
        R::table(&mut state)
            .iter()
            .find(|r| r.token() == token && r.is_usable_at(now))
            .cloned()
    }

    fn touch_record<R: MemoryTable>(&self, token: &str, now: DateTime<Utc>) {
        let mut state = self.lock();
        R::table(&mut state)
            .iter_mut()
            .filter(|r| r.token() == token && r.is_active())
            .for_each(|r| r.record_use(now));
    }

    fn deactivate_record<R: MemoryTable>(&self, id: &str, owner: Option<i32>) {
        let mut state = self.lock();
        R::table(&mut state)
            .iter_mut()
            .filter(|r| r.id() == id && owner.is_none_or(|owner| r.user_id() == owner))
            .for_each(BearerRecord::deactivate);
    }

    fn deactivate_records_except<R: MemoryTable>(&self, user_id: i32, exempt_id: &str) {
        let mut state = self.lock();
        R::table(&mut state)
            .iter_mut()
            .filter(|r| r.user_id() == user_id && r.id() != exempt_id)
            .for_each(BearerRecord::deactivate);
    }

    fn usable_records<R: MemoryTable>(&self, user_id: i32, now: DateTime<Utc>) -> Vec<R> {
        let mut state = self.lock();
        let mut records: Vec<R> = R::table(&mut state)
            .iter()
            .filter(|r| r.user_id() == user_id && r.is_usable_at(now))
            .cloned()
            .collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.last_activity()));
        records
    }
}

macro_rules! memory_bearer_store {
    ($record:ty) => {
        #[async_trait]
        impl BearerStore<$record> for MemoryStore {
            async fn insert(&self, record: $record) -> DbResult<$record> {
                self.insert_record(record)
            }

            async fn find_usable(
                &self,
                token: &str,
                now: DateTime<Utc>,
            ) -> DbResult<Option<$record>> {
                Ok(self.find_usable_record(token, now))
            }

            async fn touch(&self, token: &str, now: DateTime<Utc>) -> DbResult<()> {
                self.touch_record::<$record>(token, now);
                Ok(())
            }

            async fn deactivate(&self, id: &str, owner: Option<i32>) -> DbResult<()> {
                self.deactivate_record::<$record>(id, owner);
                Ok(())
            }

            async fn deactivate_all_except(&self, user_id: i32, exempt_id: &str) -> DbResult<()> {
                self.deactivate_records_except::<$record>(user_id, exempt_id);
                Ok(())
            }

            async fn list_usable(&self, user_id: i32, now: DateTime<Utc>) -> DbResult<Vec<$record>> {
                Ok(self.usable_records(user_id, now))
            }
        }
    };
}

memory_bearer_store!(UserSession);
memory_bearer_store!(WebDavToken);

#[async_trait]
impl SharedFolderStore for MemoryStore {
    async fn list_visible_folders(
        &self,
        center_id: Option<i32>,
    ) -> DbResult<Vec<SharedFolderWithCenter>> {
        let state = self.lock();
        let mut rows: Vec<SharedFolderWithCenter> = state
            .folders
            .iter()
            .filter(|f| f.is_active && (f.center_id.is_none() || f.center_id == center_id))
            .map(|f| SharedFolderWithCenter {
                folder: f.clone(),
                center_name: f.center_id.and_then(|id| {
                    state
                        .centers
                        .iter()
                        .find(|c| c.id == id)
                        .map(|c| c.name.clone())
                }),
            })
            .collect();
        rows.sort_by_key(|row| {
            (
                !row.folder.is_global(),
                std::cmp::Reverse(row.folder.created_at),
                std::cmp::Reverse(row.folder.id),
            )
        });
        Ok(rows)
    }

    async fn find_visible_folder(
        &self,
        name: &str,
        center_id: Option<i32>,
    ) -> DbResult<Option<SharedFolder>> {
        let state = self.lock();
        let visible = |f: &&SharedFolder| {
            f.is_active && f.name == name && (f.center_id.is_none() || f.center_id == center_id)
        };
        let scoped = state
            .folders
            .iter()
            .filter(visible)
            .filter(|f| !f.is_global())
            .max_by_key(|f| f.id);
        let global = state
            .folders
            .iter()
            .filter(visible)
            .filter(|f| f.is_global())
            .max_by_key(|f| f.id);
        Ok(scoped.or(global).cloned())
    }

    async fn find_folder(&self, id: i32) -> DbResult<Option<SharedFolder>> {
        Ok(self.lock().folders.iter().find(|f| f.id == id).cloned())
    }

    async fn local_path_in_use(&self, local_path: &str) -> DbResult<bool> {
        Ok(self
            .lock()
            .folders
            .iter()
            .any(|f| f.is_active && f.local_path.as_deref() == Some(local_path)))
    }

    async fn create_folder(&self, draft: &SharedFolderDraft) -> DbResult<SharedFolder> {
        let mut state = self.lock();
        let now = Utc::now();
        let folder = SharedFolder {
            id: state.next_id(),
            center_id: draft.center_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            folder_type: draft.folder_type,
            local_path: draft.local_path.clone(),
            cloud_url: draft.cloud_url.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.folders.push(folder.clone());
        Ok(folder)
    }

    async fn deactivate_folder(&self, id: i32, now: DateTime<Utc>) -> DbResult<()> {
        let mut state = self.lock();
        if let Some(folder) = state.folders.iter_mut().find(|f| f.id == id) {
            folder.is_active = false;
            folder.updated_at = now;
        }
        Ok(())
    }
}
