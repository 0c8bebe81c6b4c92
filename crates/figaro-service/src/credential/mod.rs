//! Opaque bearer credentials.
//!
//! Browser sessions and WebDAV tokens share one lifecycle: issue, lookup,
//! touch, deactivate, list. [`BearerCredentials`] implements it once; a
//! [`Namespace`] picks the record type, token encoding and store.

pub mod session;
pub mod webdav;

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use figaro_core::constants::CREDENTIAL_LIFETIME_DAYS;
use figaro_db::model::credential::BearerRecord;
use figaro_db::store::{BearerStore, UserStore};

use crate::auth::identity::Identity;
use crate::error::{ServiceError, ServiceResult};
use crate::util::clock::Clock;
use crate::util::random::random_hex;

pub use session::{SessionManager, SessionNamespace};
pub use webdav::{WebDavNamespace, WebDavTokenManager};

/// Random bytes in a credential id.
pub const CREDENTIAL_ID_BYTES: usize = 16;

/// Informational fields recorded with a new credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueContext {
    pub device_name: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl IssueContext {
    #[must_use]
    pub fn device(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            ..Self::default()
        }
    }
}

/// Everything a namespace needs to build a fresh record.
#[derive(Debug)]
pub struct NewCredential<'a> {
    pub id: String,
    pub user_id: i32,
    pub token: String,
    pub context: &'a IssueContext,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A family of bearer credentials stored apart from the others.
pub trait Namespace: Send + Sync + 'static {
    type Record: BearerRecord;

    /// Used in logs.
    const NAME: &'static str;

    fn generate_token() -> String;

    fn build_record(new: NewCredential<'_>) -> Self::Record;

    /// The error reported when a token is not usable.
    fn absent() -> ServiceError;
}

pub struct BearerCredentials<N: Namespace> {
    store: Arc<dyn BearerStore<N::Record>>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    namespace: PhantomData<fn() -> N>,
}

impl<N: Namespace> Clone for BearerCredentials<N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
            namespace: PhantomData,
        }
    }
}

impl<N: Namespace> BearerCredentials<N> {
    #[must_use]
    pub fn new(
        store: Arc<dyn BearerStore<N::Record>>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            users,
            clock,
            namespace: PhantomData,
        }
    }

    #[must_use]
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// ## Summary
    /// Issues an active credential valid for 30 days.
    ///
    /// ## Side Effects
    /// - Inserts a credential row
    ///
    /// ## Errors
    /// Returns an error if the store insert fails.
    #[tracing::instrument(skip(self, context), fields(namespace = N::NAME))]
    pub async fn issue(&self, user_id: i32, context: &IssueContext) -> ServiceResult<N::Record> {
        let now = self.clock.now();
        let record = N::build_record(NewCredential {
            id: random_hex(CREDENTIAL_ID_BYTES),
            user_id,
            token: N::generate_token(),
            context,
            issued_at: now,
            expires_at: now + Duration::days(CREDENTIAL_LIFETIME_DAYS),
        });

        let record = self.store.insert(record).await?;
        tracing::info!(credential_id = %record.id(), "Issued credential");
        Ok(record)
    }

    /// ## Summary
    /// Finds the usable record holding `token`.
    ///
    /// ## Errors
    /// Returns the namespace's absent error when no active, unexpired record
    /// matches.
    pub async fn lookup(&self, token: &str) -> ServiceResult<N::Record> {
        self.store
            .find_usable(token, self.clock.now())
            .await?
            .ok_or_else(N::absent)
    }

    /// Records activity on `token`. Failures are logged and swallowed.
    pub async fn touch(&self, token: &str) {
        if let Err(err) = self.store.touch(token, self.clock.now()).await {
            tracing::warn!(namespace = N::NAME, error = %err, "Failed to record credential use");
        }
    }

    /// ## Summary
    /// Looks up `token`, loads its owner and records the use.
    ///
    /// ## Errors
    /// Returns the namespace's absent error when the token is unusable or its
    /// owner no longer exists.
    pub async fn resolve(&self, token: &str) -> ServiceResult<(Identity, N::Record)> {
        let record = self.lookup(token).await?;
        let identity = match Identity::load_by_id(self.users.as_ref(), record.user_id()).await {
            Ok(identity) => identity,
            Err(ServiceError::UserNotFound) => return Err(N::absent()),
            Err(err) => return Err(err),
        };

        self.touch(token).await;
        Ok((identity, record))
    }

    /// ## Summary
    /// Deactivates one credential by id. Unknown ids are a no-op.
    ///
    /// ## Errors
    /// Returns an error if the store update fails.
    #[tracing::instrument(skip(self), fields(namespace = N::NAME))]
    pub async fn deactivate_one(&self, id: &str) -> ServiceResult<()> {
        self.store.deactivate(id, None).await?;
        Ok(())
    }

    /// ## Summary
    /// Deactivates a credential only if `owner_id` owns it. The outcome is
    /// the same whether or not a row matched.
    ///
    /// ## Errors
    /// Returns an error if the store update fails.
    #[tracing::instrument(skip(self), fields(namespace = N::NAME))]
    pub async fn revoke(&self, id: &str, owner_id: i32) -> ServiceResult<()> {
        self.store.deactivate(id, Some(owner_id)).await?;
        Ok(())
    }

    /// ## Summary
    /// Deactivates every credential of `user_id` except `exempt_id`.
    ///
    /// ## Errors
    /// Returns an error if the store update fails.
    #[tracing::instrument(skip(self), fields(namespace = N::NAME))]
    pub async fn deactivate_all_except(&self, user_id: i32, exempt_id: &str) -> ServiceResult<()> {
        self.store.deactivate_all_except(user_id, exempt_id).await?;
        Ok(())
    }

    /// ## Summary
    /// Usable credentials of `user_id`, most recently used first.
    ///
    /// ## Errors
    /// Returns an error if the store query fails.
    pub async fn list(&self, user_id: i32) -> ServiceResult<Vec<N::Record>> {
        Ok(self.store.list_usable(user_id, self.clock.now()).await?)
    }
}
