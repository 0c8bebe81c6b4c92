//! Long-lived tokens used as the Basic-auth password of WebDAV clients.

use figaro_db::model::webdav_token::WebDavToken;

use super::{BearerCredentials, Namespace, NewCredential};
use crate::auth::identity::Identity;
use crate::error::{ServiceError, ServiceResult};
use crate::util::random::random_url_safe;

const WEBDAV_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct WebDavNamespace;

impl Namespace for WebDavNamespace {
    type Record = WebDavToken;

    const NAME: &'static str = "webdav";

    fn generate_token() -> String {
        random_url_safe(WEBDAV_TOKEN_BYTES)
    }

    fn build_record(new: NewCredential<'_>) -> WebDavToken {
        WebDavToken {
            id: new.id,
            user_id: new.user_id,
            token: new.token,
            device_name: new.context.device_name.clone(),
            created_at: new.issued_at,
            last_used_at: None,
            expires_at: new.expires_at,
            is_active: true,
        }
    }

    fn absent() -> ServiceError {
        ServiceError::TokenExpiredOrAbsent
    }
}

pub type WebDavTokenManager = BearerCredentials<WebDavNamespace>;

impl BearerCredentials<WebDavNamespace> {
    /// ## Summary
    /// Authenticates the password field of a Basic-auth header.
    ///
    /// ## Side Effects
    /// - Updates `last_used_at` (best effort)
    ///
    /// ## Errors
    /// Returns `TokenExpiredOrAbsent` for an absent, inactive or expired token
    /// or an unknown owner.
    pub async fn authenticate(&self, password: &str) -> ServiceResult<Identity> {
        if password.is_empty() {
            return Err(ServiceError::TokenExpiredOrAbsent);
        }
        let (identity, token) = self.resolve(password).await?;
        tracing::debug!(token_id = %token.id, user_id = %identity.user_id(), "WebDAV token accepted");
        Ok(identity)
    }
}
