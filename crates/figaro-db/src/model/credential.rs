//! Shape shared by the two bearer-credential tables.

use chrono::{DateTime, Utc};

/// A stored opaque bearer credential bound to one user.
pub trait BearerRecord: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn user_id(&self) -> i32;
    fn token(&self) -> &str;
    fn expires_at(&self) -> DateTime<Utc>;
    fn is_active(&self) -> bool;

    /// Timestamp listings are ordered by, newest first.
    fn last_activity(&self) -> DateTime<Utc>;

    /// Records a successful use of the credential.
    fn record_use(&mut self, now: DateTime<Utc>);

    fn deactivate(&mut self);

    /// A credential is usable iff it is active and `now < expires_at`.
    fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && now < self.expires_at()
    }
}
