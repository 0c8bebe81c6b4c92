//! WebDAV token queries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::webdav_tokens;
use crate::model::webdav_token::WebDavToken;

#[must_use]
pub fn usable_by_token(
    token: &str,
    now: DateTime<Utc>,
) -> webdav_tokens::BoxedQuery<'_, diesel::pg::Pg> {
    webdav_tokens::table
        .filter(webdav_tokens::token.eq(token))
        .filter(webdav_tokens::is_active.eq(true))
        .filter(webdav_tokens::expires_at.gt(now))
        .into_boxed()
}

/// ## Summary
/// Returns a query for a user's usable tokens, most recently used first.
/// Never-used tokens sort by creation time.
#[must_use]
pub fn usable_for_user(
    user_id: i32,
    now: DateTime<Utc>,
) -> webdav_tokens::BoxedQuery<'static, diesel::pg::Pg> {
    webdav_tokens::table
        .filter(webdav_tokens::user_id.eq(user_id))
        .filter(webdav_tokens::is_active.eq(true))
        .filter(webdav_tokens::expires_at.gt(now))
        .order((
            diesel::dsl::sql::<diesel::sql_types::Timestamptz>(
                "COALESCE(webdav_tokens.last_used_at, webdav_tokens.created_at)",
            )
            .desc(),
            webdav_tokens::created_at.desc(),
        ))
        .into_boxed()
}

/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_token(
    conn: &mut DbConnection<'_>,
    token: &WebDavToken,
) -> diesel::QueryResult<WebDavToken> {
    diesel::insert_into(webdav_tokens::table)
        .values(token)
        .returning(WebDavToken::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Records the last use of an active token.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn touch(
    conn: &mut DbConnection<'_>,
    token: &str,
    now: DateTime<Utc>,
) -> diesel::QueryResult<usize> {
    diesel::update(
        webdav_tokens::table
            .filter(webdav_tokens::token.eq(token))
            .filter(webdav_tokens::is_active.eq(true)),
    )
    .set(webdav_tokens::last_used_at.eq(Some(now)))
    .execute(conn)
    .await
}

/// ## Summary
/// Deactivates a token, restricted to `owner` when given.
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
                webdav_tokens::table
                    .filter(webdav_tokens::id.eq(id))
                    .filter(webdav_tokens::user_id.eq(owner)),
            )
            .set(webdav_tokens::is_active.eq(false))
            .execute(conn)
            .await
        }
        None => {
            diesel::update(webdav_tokens::table.filter(webdav_tokens::id.eq(id)))
                .set(webdav_tokens::is_active.eq(false))
                .execute(conn)
                .await
        }
    }
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn deactivate_all_except(
    conn: &mut DbConnection<'_>,
    user_id: i32,
    exempt_id: &str,
) -> diesel::QueryResult<usize> {
    diesel::update(
        webdav_tokens::table
            .filter(webdav_tokens::user_id.eq(user_id))
            .filter(webdav_tokens::id.ne(exempt_id)),
    )
    .set(webdav_tokens::is_active.eq(false))
    .execute(conn)
    .await
}
