use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde_json::json;
use tracing::error;

use figaro_core::constants::PROFILE_ROUTE;
use figaro_service::auth::get_web_context_from_depot;

use super::util::redirect_with;
use super::webdav_tokens;
use crate::services_handler::get_services_from_depot;

const SESSION_CLOSED_MESSAGE: &str = "Sesión cerrada correctamente";
const OTHERS_CLOSED_MESSAGE: &str = "Todas las demás sesiones han sido cerradas";
const UNKNOWN_ACTION_MESSAGE: &str = "Acción no válida";
const SESSION_ID_REQUIRED_MESSAGE: &str = "ID de sesión requerido";
const STORE_FAILED_MESSAGE: &str = "Error de base de datos";

/// ## Summary
/// GET /perfil - The user and their open sessions, newest activity first.
#[handler]
#[tracing::instrument(skip_all)]
async fn profile(res: &mut Response, depot: &Depot) {
    let (services, context) = match (get_services_from_depot(depot), get_web_context_from_depot(depot)) {
        (Ok(services), Ok(context)) => (services, context),
        _ => {
            error!("Profile handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match services.sessions.list(context.identity.user_id()).await {
        Ok(sessions) => res.render(Json(json!({
            "user": context.identity.user,
            "sessions": sessions,
            "current_session_id": context.session.id,
        }))),
        Err(e) => {
            error!(error = %e, "Failed to list sessions");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

/// ## Summary
/// POST /perfil - Closes one of the user's sessions or all but the current one.
///
/// ## Side Effects
/// Deactivates sessions owned by the signed-in user.
///
/// ## Errors
/// Redirects to `/perfil?error=` for unknown actions or store failures.
#[handler]
#[tracing::instrument(skip_all)]
async fn profile_action(req: &mut Request, res: &mut Response, depot: &Depot) {
    let (services, context) = match (get_services_from_depot(depot), get_web_context_from_depot(depot)) {
        (Ok(services), Ok(context)) => (services, context),
        _ => {
            error!("Profile handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let user_id = context.identity.user_id();

    let action = req.form::<String>("action").await.unwrap_or_default();
    let outcome = match action.as_str() {
        "logout_session" => {
            let Some(session_id) = req
                .form::<String>("session_id")
                .await
                .filter(|id| !id.is_empty())
            else {
                redirect_with(res, PROFILE_ROUTE, "error", SESSION_ID_REQUIRED_MESSAGE);
                return;
            };
            services
                .sessions
                .revoke(&session_id, user_id)
                .await
                .map(|()| SESSION_CLOSED_MESSAGE)
        }
        "logout_all_sessions" => services
            .sessions
            .deactivate_all_except(user_id, &context.session.id)
            .await
            .map(|()| OTHERS_CLOSED_MESSAGE),
        _ => {
            tracing::debug!(action = %action, "Unknown profile action");
            redirect_with(res, PROFILE_ROUTE, "error", UNKNOWN_ACTION_MESSAGE);
            return;
        }
    };

    match outcome {
        Ok(message) => redirect_with(res, PROFILE_ROUTE, "success", message),
        Err(e) => {
            error!(error = %e, "Profile action failed");
            redirect_with(res, PROFILE_ROUTE, "error", STORE_FAILED_MESSAGE);
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("perfil")
        .get(profile)
        .post(profile_action)
        .push(webdav_tokens::routes())
}
