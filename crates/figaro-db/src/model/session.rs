use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use crate::model::credential::BearerRecord;

/// A browser session.
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
#[diesel(table_name = schema::user_sessions)]
#[diesel(check_for_backend(Pg))]
pub struct UserSession {
    pub id: String,
    pub user_id: i32,
    #[serde(skip_serializing)]
    pub token: String,
    pub device_name: String,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub is_active: bool,
}

impl BearerRecord for UserSession {
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
        self.updated_at
    }

    fn record_use(&mut self, now: chrono::DateTime<chrono::Utc>) {
        self.updated_at = now;
    }

    fn deactivate(&mut self) {
        self.is_active = false;
    }
}
