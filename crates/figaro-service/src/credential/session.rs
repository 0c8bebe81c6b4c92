//! Browser sessions.

use figaro_core::constants::LOGGED_IN_MARKER;
use figaro_db::model::session::UserSession;

use super::{BearerCredentials, Namespace, NewCredential};
use crate::auth::identity::Identity;
use crate::error::ServiceError;
use crate::util::random::random_hex;

const SESSION_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct SessionNamespace;

impl Namespace for SessionNamespace {
    type Record = UserSession;

    const NAME: &'static str = "session";

    fn generate_token() -> String {
        random_hex(SESSION_TOKEN_BYTES)
    }

    fn build_record(new: NewCredential<'_>) -> UserSession {
        UserSession {
            id: new.id,
            user_id: new.user_id,
            token: new.token,
            device_name: new.context.device_name.clone(),
            ip_address: new.context.ip_address.clone(),
            user_agent: new.context.user_agent.clone(),
            created_at: new.issued_at,
            updated_at: new.issued_at,
            expires_at: new.expires_at,
            is_active: true,
        }
    }

    fn absent() -> ServiceError {
        ServiceError::SessionExpiredOrAbsent
    }
}

pub type SessionManager = BearerCredentials<SessionNamespace>;

impl BearerCredentials<SessionNamespace> {
    /// ## Summary
    /// Resolves the browser cookies into an identity and its session.
    ///
    /// Both the session token and the `loggedin=yes` marker must be present.
    /// Any failure yields `None`.
    ///
    /// ## Side Effects
    /// - Touches the session on success
    pub async fn is_authenticated(
        &self,
        session_token: Option<&str>,
        logged_in_marker: Option<&str>,
    ) -> Option<(Identity, UserSession)> {
        let token = session_token.filter(|token| !token.is_empty())?;
        if logged_in_marker != Some(LOGGED_IN_MARKER) {
            return None;
        }

        match self.resolve(token).await {
            Ok(resolved) => Some(resolved),
            Err(err) if err.is_client_error() => {
                tracing::debug!("Session cookie not usable");
                None
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to resolve session");
                None
            }
        }
    }
}
