use figaro_db::model::user::User;
use figaro_db::store::UserStore;

use crate::error::{ServiceError, ServiceResult};

/// An authenticated user and its permission set, built per request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Identity {
    pub user: User,
    pub permissions: Vec<String>,
}

impl Identity {
    #[must_use]
    pub fn new(user: User, permissions: Vec<String>) -> Self {
        Self { user, permissions }
    }

    /// ## Summary
    /// Loads the permission set of `user` from the store.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    pub async fn load(users: &dyn UserStore, user: User) -> ServiceResult<Self> {
        let permissions = users.permissions_for(user.id).await?;
        Ok(Self::new(user, permissions))
    }

    /// ## Summary
    /// Loads the user with `user_id` and its permission set.
    ///
    /// ## Errors
    /// Returns `UserNotFound` if no such user exists.
    pub async fn load_by_id(users: &dyn UserStore, user_id: i32) -> ServiceResult<Self> {
        let user = users
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;
        Self::load(users, user).await
    }

    #[must_use]
    pub fn user_id(&self) -> i32 {
        self.user.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// The center this identity's folder lookups are scoped to.
    #[must_use]
    pub fn center_id(&self) -> Option<i32> {
        self.user.default_center_id
    }
}
