//! User and permission queries.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{user_permissions, users};
use crate::model::user::{NewUser, NewUserPermission, User};

/// ## Summary
/// Returns a query to select all users.
#[must_use]
pub fn all() -> users::BoxedQuery<'static, diesel::pg::Pg> {
    users::table.into_boxed()
}

#[must_use]
pub fn by_id(id: i32) -> users::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(users::id.eq(id))
}

#[must_use]
pub fn by_username(username: &str) -> users::BoxedQuery<'_, diesel::pg::Pg> {
    all().filter(users::username.eq(username))
}

#[must_use]
pub fn by_email(email: &str) -> users::BoxedQuery<'_, diesel::pg::Pg> {
    all().filter(users::email.eq(email))
}

/// ## Summary
/// Returns a query selecting usernames that equal `base` or extend it.
///
/// Used to pick a free numeric suffix when provisioning.
#[must_use]
pub fn usernames_with_prefix(
    base: &str,
) -> users::BoxedQuery<'static, diesel::pg::Pg, diesel::sql_types::Text> {
    let escaped = base
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    users::table
        .filter(users::username.like(format!("{escaped}%")))
        .select(users::username)
        .into_boxed()
}

/// ## Summary
/// Returns a query for a user's permission strings, in insertion order.
#[must_use]
pub fn permissions_for(
    user_id: i32,
) -> user_permissions::BoxedQuery<'static, diesel::pg::Pg, diesel::sql_types::Text> {
    user_permissions::table
        .filter(user_permissions::user_id.eq(user_id))
        .order(user_permissions::id.asc())
        .select(user_permissions::permission)
        .into_boxed()
}

/// ## Summary
/// Inserts a user and returns the stored row.
///
/// ## Errors
/// Returns a database error if the insert fails, including unique violations
/// on username or email.
pub async fn insert_user(
    conn: &mut DbConnection<'_>,
    new_user: &NewUser<'_>,
) -> diesel::QueryResult<User> {
    diesel::insert_into(users::table)
        .values(new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Grants permissions to a user.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_permissions<S: AsRef<str> + Sync>(
    conn: &mut DbConnection<'_>,
    user_id: i32,
    permissions: &[S],
) -> diesel::QueryResult<usize> {
    if permissions.is_empty() {
        return Ok(0);
    }

    let rows: Vec<NewUserPermission<'_>> = permissions
        .iter()
        .map(|permission| NewUserPermission {
            user_id,
            permission: permission.as_ref(),
        })
        .collect();

    diesel::insert_into(user_permissions::table)
        .values(&rows)
        .execute(conn)
        .await
}

/// ## Summary
/// Deletes a user. Sessions, tokens and permissions go with it.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_user(conn: &mut DbConnection<'_>, id: i32) -> diesel::QueryResult<usize> {
    diesel::delete(users::table.filter(users::id.eq(id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Points a user at a new default center.
///
/// ## Errors
/// Returns a database error if the update fails, including an unknown center.
pub async fn set_default_center(
    conn: &mut DbConnection<'_>,
    user_id: i32,
    center_id: i32,
    now: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<usize> {
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::default_center_id.eq(Some(center_id)),
            users::updated_at.eq(now),
        ))
        .execute(conn)
        .await
}
