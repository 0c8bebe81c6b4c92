//! Google as identity provider.

use async_trait::async_trait;
use serde::Deserialize;

use figaro_core::config::OAuthConfig;

use super::{ClientCredentials, IdentityProvider, VerifiedIdentity};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
    #[serde(default, alias = "email_verified")]
    verified_email: Option<bool>,
}

/// Talks to the token and userinfo endpoints named in `[oauth]`.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: reqwest::Client,
    token_url: String,
    userinfo_url: String,
}

impl GoogleProvider {
    #[must_use]
    pub fn new(config: &OAuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: config.token_url.clone(),
            userinfo_url: config.userinfo_url.clone(),
        }
    }
}

fn exchange_failed(stage: &'static str, err: &reqwest::Error) -> ServiceError {
    tracing::error!(stage, error = %err, "OAuth provider request failed");
    ServiceError::OAuthExchange("provider request failed")
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    #[tracing::instrument(skip_all)]
    async fn exchange(
        &self,
        credentials: &ClientCredentials,
        code: &str,
    ) -> ServiceResult<VerifiedIdentity> {
        let token: TokenResponse = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("redirect_uri", credentials.redirect_url.as_str()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| exchange_failed("token", &err))?
            .json()
            .await
            .map_err(|err| exchange_failed("token", &err))?;

        let info: UserInfo = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| exchange_failed("userinfo", &err))?
            .json()
            .await
            .map_err(|err| exchange_failed("userinfo", &err))?;

        if info.verified_email == Some(false) {
            tracing::warn!("Provider reports an unverified email");
            return Err(ServiceError::OAuthExchange("email not verified"));
        }

        let email = info
            .email
            .filter(|email| !email.is_empty())
            .ok_or(ServiceError::OAuthExchange("provider returned no email"))?;
        let name = info
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| email.clone());

        Ok(VerifiedIdentity { email, name })
    }
}
