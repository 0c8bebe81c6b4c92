//! Sign-in through an external OAuth2 provider.
//!
//! The provider exchange is opaque: it turns an authorization code into a
//! verified email and name. Everything after that (domain policy, account
//! provisioning, session issue) happens here.

pub mod google;

use std::sync::Arc;

use async_trait::async_trait;

use figaro_core::config::OAuthConfig;
use figaro_core::constants::{OAUTH_DEFAULT_PERMISSIONS, OAUTH_DEVICE_NAME};
use figaro_db::model::session::UserSession;
use figaro_db::store::UserStore;

use crate::auth::identity::Identity;
use crate::credential::{IssueContext, SessionManager};
use crate::error::{ServiceError, ServiceResult};
use crate::util::random::random_url_safe;

pub use google::GoogleProvider;

const STATE_BYTES: usize = 32;
const SCOPE: &str = "openid email profile";

/// What the provider vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: String,
}

/// Client credentials required by every leg of the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// ## Summary
    /// Exchanges an authorization code for the account's email and name.
    ///
    /// ## Errors
    /// Returns `OAuthExchange` on any provider failure.
    async fn exchange(
        &self,
        credentials: &ClientCredentials,
        code: &str,
    ) -> ServiceResult<VerifiedIdentity>;
}

/// Where to send the browser and the state to remember.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRedirect {
    pub authorize_url: String,
    pub state: String,
}

/// Parameters of the provider callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OAuthCallback<'a> {
    pub state: Option<&'a str>,
    pub code: Option<&'a str>,
    /// Value of the state cookie set by [`OAuthBridge::begin`].
    pub expected_state: Option<&'a str>,
}

pub struct OAuthBridge {
    config: OAuthConfig,
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
}

impl OAuthBridge {
    #[must_use]
    pub fn new(
        config: OAuthConfig,
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserStore>,
        sessions: SessionManager,
    ) -> Self {
        Self {
            config,
            provider,
            users,
            sessions,
        }
    }

    /// ## Summary
    /// Checks the client credentials, then the enabled flag.
    ///
    /// ## Errors
    /// Returns `OAuthMisconfigured` or `OAuthDisabled`.
    pub fn credentials(&self) -> ServiceResult<ClientCredentials> {
        let present = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        let (Some(client_id), Some(client_secret), Some(redirect_url)) = (
            present(&self.config.client_id),
            present(&self.config.client_secret),
            present(&self.config.redirect_url),
        ) else {
            return Err(ServiceError::OAuthMisconfigured);
        };

        if !self.config.enabled {
            return Err(ServiceError::OAuthDisabled);
        }

        Ok(ClientCredentials {
            client_id,
            client_secret,
            redirect_url,
        })
    }

    /// ## Summary
    /// Starts a sign-in: generates a state and builds the authorize URL.
    ///
    /// ## Errors
    /// Returns `OAuthMisconfigured` or `OAuthDisabled`.
    pub fn begin(&self) -> ServiceResult<OAuthRedirect> {
        let credentials = self.credentials()?;
        let state = random_url_safe(STATE_BYTES);

        let query = [
            ("client_id", credentials.client_id.as_str()),
            ("redirect_uri", credentials.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", SCOPE),
            ("state", state.as_str()),
            ("access_type", "online"),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

        Ok(OAuthRedirect {
            authorize_url: format!("{}?{query}", self.config.authorize_url),
            state,
        })
    }

    /// ## Summary
    /// Completes a sign-in from the provider callback.
    ///
    /// ## Side Effects
    /// - May create a user with read-only permissions
    /// - Issues a session
    ///
    /// ## Errors
    /// Returns, in order of the checks: `OAuthMisconfigured`/`OAuthDisabled`,
    /// `OAuthStateMismatch`, `OAuthExchange`, `OAuthDomainRejected`, or a
    /// store error.
    #[tracing::instrument(skip_all)]
    pub async fn complete(
        &self,
        callback: OAuthCallback<'_>,
        context: &IssueContext,
    ) -> ServiceResult<(Identity, UserSession)> {
        let credentials = self.credentials()?;

        match (callback.state, callback.expected_state) {
            (Some(state), Some(expected)) if !state.is_empty() && state == expected => {}
            _ => {
                tracing::warn!("OAuth state mismatch");
                return Err(ServiceError::OAuthStateMismatch);
            }
        }

        let code = callback
            .code
            .filter(|code| !code.is_empty())
            .ok_or(ServiceError::OAuthExchange("authorization denied"))?;

        let verified = self.provider.exchange(&credentials, code).await?;

        if !self.domain_allowed(&verified.email) {
            tracing::warn!("OAuth account outside the hosted domain");
            return Err(ServiceError::OAuthDomainRejected);
        }

        let user = match self.users.find_user_by_email(&verified.email).await? {
            Some(user) => user,
            None => {
                let permissions: Vec<String> = OAUTH_DEFAULT_PERMISSIONS
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                let user = self
                    .users
                    .provision_user(&verified.email, &verified.name, &permissions)
                    .await?;
                tracing::info!(user_id = %user.id, username = %user.username, "Provisioned OAuth user");
                user
            }
        };

        let identity = Identity::load(self.users.as_ref(), user).await?;
        let session = self
            .sessions
            .issue(
                identity.user_id(),
                &IssueContext {
                    device_name: OAUTH_DEVICE_NAME.to_string(),
                    ..context.clone()
                },
            )
            .await?;

        Ok((identity, session))
    }

    fn domain_allowed(&self, email: &str) -> bool {
        let Some(domain) = self
            .config
            .hosted_domain
            .as_deref()
            .filter(|domain| !domain.is_empty())
        else {
            return true;
        };

        email
            .rsplit_once('@')
            .is_some_and(|(_, email_domain)| email_domain.eq_ignore_ascii_case(domain))
    }
}
