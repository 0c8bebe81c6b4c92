//! Center queries.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::centers;
use crate::model::center::{Center, NewCenter};

/// ## Summary
/// Returns a query to find a center by ID.
#[must_use]
pub fn by_id(id: i32) -> centers::BoxedQuery<'static, diesel::pg::Pg> {
    centers::table.filter(centers::id.eq(id)).into_boxed()
}

/// ## Summary
/// Returns a query for every center, ordered by name.
#[must_use]
pub fn all_by_name() -> centers::BoxedQuery<'static, diesel::pg::Pg> {
    centers::table
        .order((centers::name.asc(), centers::id.asc()))
        .into_boxed()
}

/// ## Summary
/// Inserts a center and returns the stored row.
///
/// ## Errors
/// Returns a database error if the insert fails, including a duplicate name.
pub async fn insert_center(
    conn: &mut DbConnection<'_>,
    name: &str,
) -> diesel::QueryResult<Center> {
    diesel::insert_into(centers::table)
        .values(NewCenter { name })
        .returning(Center::as_returning())
        .get_result(conn)
        .await
}
