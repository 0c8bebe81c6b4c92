use salvo::basic_auth::{BasicAuth, BasicAuthValidator};
use salvo::http::StatusCode;
use salvo::http::header::WWW_AUTHENTICATE;
use salvo::{Depot, FlowCtrl, Handler, Request, Response};
use tracing::error;

use figaro_core::constants::WEBDAV_REALM;
use figaro_service::auth::DavContext;

use crate::services_handler::get_services_from_depot;

/// Marks a request whose token check failed on the server side rather than
/// on the credentials.
#[derive(Debug, Clone, Copy)]
struct TokenLookupFailed;

/// Accepts a Basic password that is a usable WebDAV token. The username is
/// ignored.
pub struct WebDavTokenValidator;

impl BasicAuthValidator for WebDavTokenValidator {
    async fn validate(&self, _username: &str, password: &str, depot: &mut Depot) -> bool {
        let services = match get_services_from_depot(depot) {
            Ok(services) => services,
            Err(e) => {
                error!(error = %e, "Failed to get services from depot");
                depot.inject(TokenLookupFailed);
                return false;
            }
        };

        match services.webdav_tokens.authenticate(password).await {
            Ok(identity) => {
                depot.inject(DavContext { identity });
                true
            }
            Err(e) if e.is_client_error() => {
                tracing::debug!("WebDAV token rejected");
                false
            }
            Err(e) => {
                error!(error = %e, "Failed to authenticate WebDAV token");
                depot.inject(TokenLookupFailed);
                false
            }
        }
    }
}

/// ## Summary
/// HTTP Basic authentication for the WebDAV mounts, every method included.
///
/// ## Side Effects
/// Injects `DavContext` into the depot on success.
///
/// ## Errors
/// Answers 401 with a `WWW-Authenticate` challenge for missing or rejected
/// credentials, and 500 without a challenge when the token store fails.
pub struct WebDavAuthMiddleware {
    basic: BasicAuth<WebDavTokenValidator>,
}

impl WebDavAuthMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self {
            basic: BasicAuth::new(WebDavTokenValidator).set_realm(WEBDAV_REALM),
        }
    }
}

impl Default for WebDavAuthMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

#[salvo::async_trait]
impl Handler for WebDavAuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        self.basic.handle(req, depot, res, ctrl).await;

        if depot.contains::<TokenLookupFailed>() {
            res.headers_mut().remove(WWW_AUTHENTICATE);
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
