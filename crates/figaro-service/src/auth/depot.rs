//! Typed request context placed in the salvo depot by the middleware.

use figaro_db::model::session::UserSession;

use super::identity::Identity;
use crate::error::{ServiceError, ServiceResult};

/// Context of a browser request carrying a valid session.
#[derive(Debug, Clone)]
pub struct WebContext {
    pub identity: Identity,
    pub session: UserSession,
}

/// Context of a WebDAV request authenticated with a token.
#[derive(Debug, Clone)]
pub struct DavContext {
    pub identity: Identity,
}

/// Get the browser context from the depot.
///
/// ## Errors
///
/// Returns `SessionExpiredOrAbsent` if the session middleware did not run or
/// found no session.
pub fn get_web_context_from_depot(depot: &salvo::Depot) -> ServiceResult<&WebContext> {
    depot
        .obtain::<WebContext>()
        .map_err(|_missing| ServiceError::SessionExpiredOrAbsent)
}

/// Get the WebDAV context from the depot.
///
/// ## Errors
///
/// Returns `TokenExpiredOrAbsent` if the WebDAV auth middleware did not run.
pub fn get_dav_context_from_depot(depot: &salvo::Depot) -> ServiceResult<&DavContext> {
    depot
        .obtain::<DavContext>()
        .map_err(|_missing| ServiceError::TokenExpiredOrAbsent)
}

/// The identity of whichever context is present.
#[must_use]
pub fn get_identity_from_depot(depot: &salvo::Depot) -> Option<&Identity> {
    get_web_context_from_depot(depot)
        .map(|ctx| &ctx.identity)
        .or_else(|_missing| get_dav_context_from_depot(depot).map(|ctx| &ctx.identity))
        .ok()
}
