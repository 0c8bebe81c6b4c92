use salvo::writing::{Json, Redirect};
use salvo::{Depot, Request, Response, Router, handler};
use serde_json::json;
use tracing::error;

use figaro_core::constants::{LOGIN_ROUTE, WEB_DEVICE_NAME};
use figaro_service::auth::login::{login_with_password, login_with_qr};

use super::util::{issue_context, redirect_with, set_login_cookies};
use crate::config::get_config_from_depot;
use crate::services_handler::get_services_from_depot;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Usuario o contraseña incorrectos";
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Usuario y contraseña requeridos";
const SESSION_FAILED_MESSAGE: &str = "Error al crear la sesión";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// ## Summary
/// GET /login - Describes the login form and echoes a pending error.
#[handler]
async fn login_page(req: &mut Request, depot: &Depot) -> Json<serde_json::Value> {
    let oauth_enabled = get_config_from_depot(depot)
        .map(|settings| settings.oauth.enabled)
        .unwrap_or(false);
    Json(json!({
        "error": req.query::<String>("error"),
        "oauth_enabled": oauth_enabled,
    }))
}

/// ## Summary
/// POST /login - Signs in with `username` + `password`, or with `qr_data`.
///
/// ## Side Effects
/// - Issues a "Web Browser" session
/// - Sets the session, username and logged-in cookies
///
/// ## Errors
/// Redirects back to `/login?error=` with a generic message.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn login(req: &mut Request, res: &mut Response, depot: &Depot) {
    let (services, settings) = match (get_services_from_depot(depot), get_config_from_depot(depot)) {
        (Ok(services), Ok(settings)) => (services, settings),
        _ => {
            error!("Login handler is missing its services");
            redirect_with(res, LOGIN_ROUTE, "error", SESSION_FAILED_MESSAGE);
            return;
        }
    };

    let qr_data = non_empty(req.form::<String>("qr_data").await);
    let username = non_empty(req.form::<String>("username").await);
    let password = non_empty(req.form::<String>("password").await);

    let outcome = match (qr_data, username, password) {
        (Some(payload), _, _) => login_with_qr(services.users.as_ref(), &payload).await,
        (None, Some(username), Some(password)) => {
            login_with_password(services.users.as_ref(), &username, &password).await
        }
        _ => {
            tracing::debug!("Login attempt without credentials");
            redirect_with(res, LOGIN_ROUTE, "error", MISSING_CREDENTIALS_MESSAGE);
            return;
        }
    };

    let identity = match outcome {
        Ok(identity) => identity,
        Err(e) if e.is_client_error() => {
            tracing::info!("Login rejected");
            redirect_with(res, LOGIN_ROUTE, "error", INVALID_CREDENTIALS_MESSAGE);
            return;
        }
        Err(e) => {
            error!(error = %e, "Login failed");
            redirect_with(res, LOGIN_ROUTE, "error", SESSION_FAILED_MESSAGE);
            return;
        }
    };

    let context = issue_context(req, WEB_DEVICE_NAME);
    match services.sessions.issue(identity.user_id(), &context).await {
        Ok(session) => {
            tracing::info!(user_id = %identity.user_id(), session_id = %session.id, "User logged in");
            set_login_cookies(
                res,
                &session.token,
                identity.username(),
                settings.server.secure_cookies,
            );
            res.render(Redirect::found("/"));
        }
        Err(e) => {
            error!(error = %e, "Failed to issue session");
            redirect_with(res, LOGIN_ROUTE, "error", SESSION_FAILED_MESSAGE);
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("login").get(login_page).post(login)
}
