use salvo::writing::Redirect;
use salvo::{Depot, Request, Response, Router, handler};
use tracing::error;

use figaro_core::constants::{LOGIN_ROUTE, OAUTH_DEVICE_NAME, OAUTH_STATE_COOKIE};
use figaro_service::error::ServiceError;
use figaro_service::oauth::OAuthCallback;

use super::util::{
    clear_oauth_state_cookie, issue_context, redirect_with, set_login_cookies,
    set_oauth_state_cookie,
};
use crate::config::get_config_from_depot;
use crate::services_handler::get_services_from_depot;

/// Message shown on the login page for an OAuth failure.
fn failure_message(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::OAuthDisabled => "OAuth está deshabilitado",
        ServiceError::OAuthMisconfigured => "OAuth no está configurado correctamente",
        ServiceError::OAuthStateMismatch => "Estado de OAuth inválido",
        ServiceError::OAuthExchange(_) => "Autorización de Google denegada",
        ServiceError::OAuthDomainRejected => "Dominio no permitido",
        _ => "Error al crear la sesión",
    }
}

/// ## Summary
/// GET /auth/google - Sends the browser to the provider's consent screen.
///
/// ## Side Effects
/// Sets the short-lived `oauth_state` cookie.
#[handler]
#[tracing::instrument(skip_all)]
async fn begin(res: &mut Response, depot: &Depot) {
    let (services, settings) = match (get_services_from_depot(depot), get_config_from_depot(depot)) {
        (Ok(services), Ok(settings)) => (services, settings),
        _ => {
            error!("OAuth handler is missing its services");
            redirect_with(res, LOGIN_ROUTE, "error", "Error de configuración OAuth");
            return;
        }
    };

    match services.oauth.begin() {
        Ok(redirect) => {
            set_oauth_state_cookie(res, &redirect.state, settings.server.secure_cookies);
            res.render(Redirect::temporary(redirect.authorize_url));
        }
        Err(e) => {
            tracing::warn!(error = %e, "OAuth sign-in unavailable");
            redirect_with(res, LOGIN_ROUTE, "error", failure_message(&e));
        }
    }
}

/// ## Summary
/// GET /auth/google/callback - Finishes the provider round trip.
///
/// ## Side Effects
/// - Clears the `oauth_state` cookie
/// - May provision a user
/// - Issues a session and sets the login cookies
///
/// ## Errors
/// Redirects to `/login?error=` with a localized message.
#[handler]
#[tracing::instrument(skip_all)]
async fn callback(req: &mut Request, res: &mut Response, depot: &Depot) {
    clear_oauth_state_cookie(res);

    let (services, settings) = match (get_services_from_depot(depot), get_config_from_depot(depot)) {
        (Ok(services), Ok(settings)) => (services, settings),
        _ => {
            error!("OAuth handler is missing its services");
            redirect_with(res, LOGIN_ROUTE, "error", "Error de configuración OAuth");
            return;
        }
    };

    let expected_state = req.cookie(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let state = req.query::<String>("state");
    let code = req.query::<String>("code");
    let context = issue_context(req, OAUTH_DEVICE_NAME);

    let outcome = services
        .oauth
        .complete(
            OAuthCallback {
                state: state.as_deref(),
                code: code.as_deref(),
                expected_state: expected_state.as_deref(),
            },
            &context,
        )
        .await;

    match outcome {
        Ok((identity, session)) => {
            tracing::info!(user_id = %identity.user_id(), session_id = %session.id, "OAuth login");
            set_login_cookies(
                res,
                &session.token,
                identity.username(),
                settings.server.secure_cookies,
            );
            res.render(Redirect::found("/"));
        }
        Err(e) if e.is_client_error() => {
            tracing::info!(error = %e, "OAuth login rejected");
            redirect_with(res, LOGIN_ROUTE, "error", failure_message(&e));
        }
        Err(e) => {
            error!(error = %e, "OAuth login failed");
            redirect_with(res, LOGIN_ROUTE, "error", failure_message(&e));
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("auth/google")
        .get(begin)
        .push(Router::with_path("callback").get(callback))
}
