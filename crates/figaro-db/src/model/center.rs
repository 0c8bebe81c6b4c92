use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// An educational center.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, serde::Serialize)]
#[diesel(table_name = schema::centers)]
#[diesel(check_for_backend(Pg))]
pub struct Center {
    pub id: i32,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::centers)]
pub struct NewCenter<'a> {
    pub name: &'a str,
}
