//! Embedded schema migrations.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{DbError, DbResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// ## Summary
/// Applies pending migrations over a blocking connection.
///
/// Callers on an async runtime wrap this in `spawn_blocking`.
///
/// ## Errors
/// Returns an error if the connection cannot be established or a
/// migration fails.
#[tracing::instrument(skip(database_url))]
pub fn run_pending_migrations(database_url: &str) -> DbResult<usize> {
    let mut conn = PgConnection::establish(database_url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::MigrationError(e.to_string()))?;

    tracing::info!(count = applied.len(), "Applied pending migrations");
    Ok(applied.len())
}
