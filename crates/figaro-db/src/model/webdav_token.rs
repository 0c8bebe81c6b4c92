use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use crate::model::credential::BearerRecord;

/// A long-lived token presented as the Basic-auth password of WebDAV clients.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Queryable,
    Selectable,
    Identifiable,
    Insertable,
    serde::Serialize,
)]
#[diesel(table_name = schema::webdav_tokens)]
#[diesel(check_for_backend(Pg))]
pub struct WebDavToken {
    pub id: String,
    pub user_id: i32,
    /// Shown on the owner's profile so it can be copied into a client.
    pub token: String,
    pub device_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub is_active: bool,
}

impl BearerRecord for WebDavToken {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> i32 {
        self.user_id
    }

    fn token(&self) -> &str {
        &self.token
    }

    fn expires_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.expires_at
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn last_activity(&self) -> chrono::DateTime<chrono::Utc> {
        self.last_used_at.unwrap_or(self.created_at)
    }

    fn record_use(&mut self, now: chrono::DateTime<chrono::Utc>) {
        self.last_used_at = Some(now);
    }

    fn deactivate(&mut self) {
        self.is_active = false;
    }
}
