use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A portal account.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, serde::Serialize)]
#[diesel(table_name = schema::users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    /// Empty for accounts that only sign in through OAuth.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub default_center_id: Option<i32>,
    pub force_default_center: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub default_center_id: Option<i32>,
    pub force_default_center: bool,
}

/// Owned form of [`NewUser`] accepted by the stores.
#[derive(Debug, Clone, Default)]
pub struct UserDraft {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub display_name: String,
    pub default_center_id: Option<i32>,
    /// Pins the user to `default_center_id`.
    pub force_default_center: bool,
}

impl UserDraft {
    #[must_use]
    pub fn as_insertable(&self) -> NewUser<'_> {
        NewUser {
            username: &self.username,
            email: self.email.as_deref(),
            password_hash: &self.password_hash,
            display_name: &self.display_name,
            default_center_id: self.default_center_id,
            force_default_center: self.force_default_center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::user_permissions)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(User, foreign_key = user_id))]
pub struct UserPermission {
    pub id: i32,
    pub user_id: i32,
    pub permission: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::user_permissions)]
pub struct NewUserPermission<'a> {
    pub user_id: i32,
    pub permission: &'a str,
}
