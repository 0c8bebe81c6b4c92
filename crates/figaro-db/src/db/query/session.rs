//! Session queries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::user_sessions;
use crate::model::session::UserSession;

/// ## Summary
/// Returns a query for the session holding `token`, if active and unexpired.
#[must_use]
pub fn usable_by_token(
    token: &str,
    now: DateTime<Utc>,
) -> user_sessions::BoxedQuery<'_, diesel::pg::Pg> {
    user_sessions::table
        .filter(user_sessions::token.eq(token))
        .filter(user_sessions::is_active.eq(true))
        .filter(user_sessions::expires_at.gt(now))
        .into_boxed()
}

/// ## Summary
/// Returns a query for a user's usable sessions, most recently active first.
#[must_use]
pub fn usable_for_user(
    user_id: i32,
    now: DateTime<Utc>,
) -> user_sessions::BoxedQuery<'static, diesel::pg::Pg> {
    user_sessions::table
        .filter(user_sessions::user_id.eq(user_id))
        .filter(user_sessions::is_active.eq(true))
        .filter(user_sessions::expires_at.gt(now))
        .order(user_sessions::updated_at.desc())
        .into_boxed()
}

/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_session(
    conn: &mut DbConnection<'_>,
    session: &UserSession,
) -> diesel::QueryResult<UserSession> {
    diesel::insert_into(user_sessions::table)
        .values(session)
        .returning(UserSession::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Bumps `updated_at` on the active session holding `token`.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn touch(
    conn: &mut DbConnection<'_>,
    token: &str,
    now: DateTime<Utc>,
) -> diesel::QueryResult<usize> {
    diesel::update(
        user_sessions::table
            .filter(user_sessions::token.eq(token))
            .filter(user_sessions::is_active.eq(true)),
    )
    .set(user_sessions::updated_at.eq(now))
    .execute(conn)
    .await
}

/// ## Summary
/// Deactivates a session, restricted to `owner` when given.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn deactivate(
    conn: &mut DbConnection<'_>,
    id: &str,
    owner: Option<i32>,
) -> diesel::QueryResult<usize> {
    match owner {
        Some(owner) => {
            diesel::update(
                user_sessions::table
                    .filter(user_sessions::id.eq(id))
                    .filter(user_sessions::user_id.eq(owner)),
            )
            .set(user_sessions::is_active.eq(false))
            .execute(conn)
            .await
        }
        None => {
            diesel::update(user_sessions::table.filter(user_sessions::id.eq(id)))
                .set(user_sessions::is_active.eq(false))
                .execute(conn)
                .await
        }
    }
}

/// ## Summary
/// Deactivates every session of `user_id` except `exempt_id`, in one statement.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn deactivate_all_except(
    conn: &mut DbConnection<'_>,
    user_id: i32,
    exempt_id: &str,
) -> diesel::QueryResult<usize> {
    diesel::update(
        user_sessions::table
            .filter(user_sessions::user_id.eq(user_id))
            .filter(user_sessions::id.ne(exempt_id)),
    )
    .set(user_sessions::is_active.eq(false))
    .execute(conn)
    .await
}
