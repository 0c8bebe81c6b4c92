//! Store implementation over a `DbProvider`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use super::{
    BearerStore, MAX_PROVISION_ATTEMPTS, SharedFolderStore, UserStore, email_local_part,
    free_username,
};
use crate::db::DbProvider;
use crate::db::query::{center, session, shared_folder, user, webdav_token};
use crate::db::transaction::with_transaction;
use crate::error::{DbError, DbResult};
use crate::model::center::Center;
use crate::model::session::UserSession;
use crate::model::shared_folder::{SharedFolder, SharedFolderDraft, SharedFolderWithCenter};
use crate::model::user::{NewUser, User, UserDraft};
use crate::model::webdav_token::WebDavToken;

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore<P> {
    provider: P,
}

impl<P: DbProvider> PgStore<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: DbProvider> UserStore for PgStore<P> {
    async fn find_user_by_id(&self, id: i32) -> DbResult<Option<User>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(user::by_id(id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(user::by_username(username)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(user::by_email(email)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn permissions_for(&self, user_id: i32) -> DbResult<Vec<String>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(user::permissions_for(user_id).load(&mut conn).await?)
    }

    #[tracing::instrument(skip(self, draft, permissions), fields(username = %draft.username))]
    async fn create_user(&self, draft: &UserDraft, permissions: &[String]) -> DbResult<User> {
        let mut conn = self.provider.get_connection().await?;
        let new_user = draft.as_insertable();
        with_transaction(&mut conn, |tx| {
            async move {
                let created = user::insert_user(tx, &new_user).await?;
                user::insert_permissions(tx, created.id, permissions).await?;
                Ok(created)
            }
            .scope_boxed()
        })
        .await
    }

    #[tracing::instrument(skip(self, email, display_name, permissions))]
    async fn provision_user(
        &self,
        email: &str,
        display_name: &str,
        permissions: &[String],
    ) -> DbResult<User> {
        let base = email_local_part(email);

        for attempt in 0..MAX_PROVISION_ATTEMPTS {
            let mut conn = self.provider.get_connection().await?;
            let outcome = with_transaction(&mut conn, |tx| {
                async move {
                    if let Some(existing) = user::by_email(email)
                        .select(User::as_select())
                        .first(tx)
                        .await
                        .optional()?
                    {
                        return Ok(existing);
                    }

                    let taken: Vec<String> = user::usernames_with_prefix(base).load(tx).await?;
                    let username = free_username(base, &taken);

                    let created = user::insert_user(
                        tx,
                        &NewUser {
                            username: &username,
                            email: Some(email),
                            password_hash: "",
                            display_name,
                            default_center_id: None,
                            force_default_center: false,
                        },
                    )
                    .await?;
                    user::insert_permissions(tx, created.id, permissions).await?;

                    tracing::info!(user_id = created.id, username = %created.username, "Provisioned user");
                    Ok(created)
                }
                .scope_boxed()
            })
            .await;

            match outcome {
                Err(e) if e.is_unique_violation() => {
                    tracing::debug!(attempt, "Username taken concurrently, retrying");
                }
                other => return other,
            }
        }

        Err(DbError::UsernameExhausted(base.to_string()))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, id: i32) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        user::delete_user(&mut conn, id).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, now))]
    async fn set_default_center(&self, user_id: i32, center_id: i32, now: DateTime<Utc>) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        user::set_default_center(&mut conn, user_id, center_id, now).await?;
        Ok(())
    }

    async fn create_center(&self, name: &str) -> DbResult<Center> {
        let mut conn = self.provider.get_connection().await?;
        Ok(center::insert_center(&mut conn, name).await?)
    }

    async fn find_center(&self, id: i32) -> DbResult<Option<Center>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(center::by_id(id)
            .select(Center::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn list_centers(&self) -> DbResult<Vec<Center>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(center::all_by_name()
            .select(Center::as_select())
            .load(&mut conn)
            .await?)
    }
}

#[async_trait]
impl<P: DbProvider> BearerStore<UserSession> for PgStore<P> {
    async fn insert(&self, record: UserSession) -> DbResult<UserSession> {
        let mut conn = self.provider.get_connection().await?;
        Ok(session::insert_session(&mut conn, &record).await?)
    }

    async fn find_usable(&self, token: &str, now: DateTime<Utc>) -> DbResult<Option<UserSession>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(session::usable_by_token(token, now)
            .select(UserSession::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn touch(&self, token: &str, now: DateTime<Utc>) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        session::touch(&mut conn, token, now).await?;
        Ok(())
    }

    async fn deactivate(&self, id: &str, owner: Option<i32>) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        session::deactivate(&mut conn, id, owner).await?;
        Ok(())
    }

    async fn deactivate_all_except(&self, user_id: i32, exempt_id: &str) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        session::deactivate_all_except(&mut conn, user_id, exempt_id).await?;
        Ok(())
    }

    async fn list_usable(&self, user_id: i32, now: DateTime<Utc>) -> DbResult<Vec<UserSession>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(session::usable_for_user(user_id, now)
            .select(UserSession::as_select())
            .load(&mut conn)
            .await?)
    }
}

#[async_trait]
impl<P: DbProvider> BearerStore<WebDavToken> for PgStore<P> {
    async fn insert(&self, record: WebDavToken) -> DbResult<WebDavToken> {
        let mut conn = self.provider.get_connection().await?;
        Ok(webdav_token::insert_token(&mut conn, &record).await?)
    }

    async fn find_usable(&self, token: &str, now: DateTime<Utc>) -> DbResult<Option<WebDavToken>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(webdav_token::usable_by_token(token, now)
            .select(WebDavToken::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn touch(&self, token: &str, now: DateTime<Utc>) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        webdav_token::touch(&mut conn, token, now).await?;
        Ok(())
    }

    async fn deactivate(&self, id: &str, owner: Option<i32>) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        webdav_token::deactivate(&mut conn, id, owner).await?;
        Ok(())
    }

    async fn deactivate_all_except(&self, user_id: i32, exempt_id: &str) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        webdav_token::deactivate_all_except(&mut conn, user_id, exempt_id).await?;
        Ok(())
    }

    async fn list_usable(&self, user_id: i32, now: DateTime<Utc>) -> DbResult<Vec<WebDavToken>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(webdav_token::usable_for_user(user_id, now)
            .select(WebDavToken::as_select())
            .load(&mut conn)
            .await?)
    }
}

#[async_trait]
impl<P: DbProvider> SharedFolderStore for PgStore<P> {
    async fn list_visible_folders(
        &self,
        center_id: Option<i32>,
    ) -> DbResult<Vec<SharedFolderWithCenter>> {
        let mut conn = self.provider.get_connection().await?;
        let rows = shared_folder::load_listing(&mut conn, center_id).await?;
        Ok(rows
            .into_iter()
            .map(|(folder, center_name)| SharedFolderWithCenter {
                folder,
                center_name,
            })
            .collect())
    }

    async fn find_visible_folder(
        &self,
        name: &str,
        center_id: Option<i32>,
    ) -> DbResult<Option<SharedFolder>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(shared_folder::visible_by_name(name, center_id)
            .select(SharedFolder::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn find_folder(&self, id: i32) -> DbResult<Option<SharedFolder>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(shared_folder::by_id(id)
            .select(SharedFolder::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn local_path_in_use(&self, local_path: &str) -> DbResult<bool> {
        let mut conn = self.provider.get_connection().await?;
        let held_by = shared_folder::active_at_path(local_path)
            .select(SharedFolder::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(held_by.is_some())
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_folder(&self, draft: &SharedFolderDraft) -> DbResult<SharedFolder> {
        let mut conn = self.provider.get_connection().await?;
        Ok(shared_folder::insert_folder(&mut conn, &draft.as_insertable()).await?)
    }

    async fn deactivate_folder(&self, id: i32, now: DateTime<Utc>) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        shared_folder::deactivate(&mut conn, id, now).await?;
        Ok(())
    }
}
