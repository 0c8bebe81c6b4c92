//! Shared folder queries.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{centers, shared_folders};
use crate::model::shared_folder::{NewSharedFolder, SharedFolder};

/// ## Summary
/// Returns a query for active folders visible to a center: its own plus the
/// global ones. With no center only global folders are visible.
#[must_use]
pub fn visible_to(center_id: Option<i32>) -> shared_folders::BoxedQuery<'static, diesel::pg::Pg> {
    let query = shared_folders::table
        .filter(shared_folders::is_active.eq(true))
        .into_boxed();

    match center_id {
        Some(center_id) => query.filter(
            shared_folders::center_id
                .is_null()
                .or(shared_folders::center_id.eq(center_id)),
        ),
        None => query.filter(shared_folders::center_id.is_null()),
    }
}

/// ## Summary
/// Returns a query for the visible folder called `name`. Center-scoped rows
/// sort ahead of global ones, so `first` picks the center's folder.
#[must_use]
pub fn visible_by_name(
    name: &str,
    center_id: Option<i32>,
) -> shared_folders::BoxedQuery<'_, diesel::pg::Pg> {
    visible_to(center_id)
        .filter(shared_folders::name.eq(name))
        .order((
            shared_folders::center_id.is_null().asc(),
            shared_folders::id.desc(),
        ))
}

/// ## Summary
/// Loads visible folders with their center names, global first and then
/// newest first.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn load_listing(
    conn: &mut DbConnection<'_>,
    center_id: Option<i32>,
) -> diesel::QueryResult<Vec<(SharedFolder, Option<String>)>> {
    let query = shared_folders::table
        .left_join(centers::table)
        .filter(shared_folders::is_active.eq(true))
        .order((
            shared_folders::center_id.is_null().desc(),
            shared_folders::created_at.desc(),
            shared_folders::id.desc(),
        ))
        .select((SharedFolder::as_select(), centers::name.nullable()))
        .into_boxed();

    let query = match center_id {
        Some(center_id) => query.filter(
            shared_folders::center_id
                .is_null()
                .or(shared_folders::center_id.eq(center_id)),
        ),
        None => query.filter(shared_folders::center_id.is_null()),
    };

    query.load(conn).await
}

#[must_use]
pub fn by_id(id: i32) -> shared_folders::BoxedQuery<'static, diesel::pg::Pg> {
    shared_folders::table
        .filter(shared_folders::id.eq(id))
        .into_boxed()
}

/// ## Summary
/// Returns a query for active folders stored at `local_path`.
#[must_use]
pub fn active_at_path(local_path: &str) -> shared_folders::BoxedQuery<'_, diesel::pg::Pg> {
    shared_folders::table
        .filter(shared_folders::is_active.eq(true))
        .filter(shared_folders::local_path.eq(local_path))
        .into_boxed()
}

/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_folder(
    conn: &mut DbConnection<'_>,
    folder: &NewSharedFolder<'_>,
) -> diesel::QueryResult<SharedFolder> {
    diesel::insert_into(shared_folders::table)
        .values(folder)
        .returning(SharedFolder::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Soft-deletes a folder. The directory on disk is left alone.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn deactivate(
    conn: &mut DbConnection<'_>,
    id: i32,
    now: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<usize> {
    diesel::update(shared_folders::table.filter(shared_folders::id.eq(id)))
        .set((
            shared_folders::is_active.eq(false),
            shared_folders::updated_at.eq(now),
        ))
        .execute(conn)
        .await
}
