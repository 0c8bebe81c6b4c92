use salvo::writing::Redirect;
use salvo::{Depot, Request, Response, Router, handler};
use tracing::error;

use figaro_core::constants::{LOGIN_ROUTE, SESSION_COOKIE};

use super::util::clear_login_cookies;
use crate::services_handler::get_services_from_depot;

/// ## Summary
/// GET /logout - Ends the browser session, if any.
///
/// ## Side Effects
/// - Deactivates the session named by the cookie
/// - Expires the login cookies
#[handler]
#[tracing::instrument(skip_all)]
async fn logout(req: &mut Request, res: &mut Response, depot: &Depot) {
    let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        match get_services_from_depot(depot) {
            Ok(services) => match services.sessions.lookup(&token).await {
                Ok(session) => {
                    if let Err(e) = services.sessions.deactivate_one(&session.id).await {
                        error!(error = %e, "Failed to deactivate session on logout");
                    } else {
                        tracing::info!(session_id = %session.id, "Session closed");
                    }
                }
                Err(_err) => tracing::debug!("Logout without a live session"),
            },
            Err(e) => error!(error = %e, "Failed to get services from depot"),
        }
    }

    clear_login_cookies(res);
    res.render(Redirect::found(LOGIN_ROUTE));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("logout").get(logout)
}
