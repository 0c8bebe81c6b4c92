use salvo::Depot;
use salvo::writing::Redirect;
use tracing::error;

use figaro_core::constants::{LOGGED_IN_COOKIE, LOGIN_ROUTE, SESSION_COOKIE};
use figaro_service::auth::WebContext;

use crate::services_handler::get_services_from_depot;

/// ## Summary
/// Session middleware for browser routes.
///
/// Resolves the `session_token` and `loggedin` cookies into a [`WebContext`].
/// Requests without a usable session are redirected to the login page.
///
/// ## Side Effects
/// Injects `WebContext` into the depot and touches the session.
pub struct SessionMiddleware;

#[salvo::async_trait]
impl salvo::Handler for SessionMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let services = match get_services_from_depot(depot) {
            Ok(services) => services,
            Err(e) => {
                error!(error = %e, "Failed to get services from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
        let marker = req.cookie(LOGGED_IN_COOKIE).map(|c| c.value().to_string());

        match services
            .sessions
            .is_authenticated(token.as_deref(), marker.as_deref())
            .await
        {
            Some((identity, session)) => {
                tracing::trace!(user_id = %identity.user_id(), "Session accepted");
                depot.inject(WebContext { identity, session });
            }
            None => {
                tracing::debug!("No usable session, redirecting to login");
                res.render(Redirect::found(LOGIN_ROUTE));
                ctrl.skip_rest();
            }
        }
    }
}
