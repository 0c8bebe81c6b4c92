//! The per-process service graph handed to every request.

use std::path::PathBuf;
use std::sync::Arc;

use figaro_core::config::Settings;
use figaro_db::db::DbProvider;
use figaro_db::model::session::UserSession;
use figaro_db::model::webdav_token::WebDavToken;
use figaro_db::store::postgres::PgStore;
use figaro_db::store::{BearerStore, SharedFolderStore, UserStore};

use crate::catalog::Catalog;
use crate::credential::{SessionManager, WebDavTokenManager};
use crate::gateway::Gateway;
use crate::oauth::{GoogleProvider, IdentityProvider, OAuthBridge};
use crate::util::clock::{Clock, SystemClock};

/// Everything the HTTP layer calls into.
pub struct Services {
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionManager,
    pub webdav_tokens: WebDavTokenManager,
    pub oauth: OAuthBridge,
    pub catalog: Catalog,
    pub gateway: Gateway,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    /// ## Summary
    /// Wires the services over one store implementation.
    pub fn new<S>(
        store: Arc<S>,
        settings: &Settings,
        provider: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        S: UserStore + BearerStore<UserSession> + BearerStore<WebDavToken> + SharedFolderStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let session_store: Arc<dyn BearerStore<UserSession>> = store.clone();
        let token_store: Arc<dyn BearerStore<WebDavToken>> = store.clone();
        let folders: Arc<dyn SharedFolderStore> = store;
        let data_dir = PathBuf::from(&settings.storage.data_dir);

        let sessions = SessionManager::new(session_store, users.clone(), clock.clone());
        let webdav_tokens = WebDavTokenManager::new(token_store, users.clone(), clock.clone());
        let oauth = OAuthBridge::new(
            settings.oauth.clone(),
            provider,
            users.clone(),
            sessions.clone(),
        );
        let catalog = Catalog::new(folders.clone(), users.clone(), clock.clone(), data_dir.clone());
        let gateway = Gateway::new(
            data_dir,
            folders,
            clock.clone(),
            settings.storage.max_upload_size,
        );

        Self {
            users,
            sessions,
            webdav_tokens,
            oauth,
            catalog,
            gateway,
            clock,
        }
    }

    /// ## Summary
    /// Production wiring: `PostgreSQL`, Google and the wall clock.
    pub fn with_provider<P: DbProvider + 'static>(db: P, settings: &Settings) -> Self {
        Self::new(
            Arc::new(PgStore::new(db)),
            settings,
            Arc::new(GoogleProvider::new(&settings.oauth)),
            Arc::new(SystemClock),
        )
    }
}
