use salvo::http::StatusCode;
use salvo::writing::{Json, Redirect};
use salvo::{Depot, Request, Response, Router, handler};
use serde_json::json;
use tracing::error;

use figaro_core::constants::CENTER_ROUTE;
use figaro_service::auth::center::choose_center;
use figaro_service::auth::get_web_context_from_depot;
use figaro_service::error::ServiceError;
use figaro_service::util::clock::Clock;

use super::util::redirect_with;
use crate::services_handler::get_services_from_depot;

const CENTER_REQUIRED_MESSAGE: &str = "Debe seleccionar un centro";
const CENTER_LOCKED_MESSAGE: &str = "Tu cuenta está fijada a su centro por defecto";
const STORE_FAILED_MESSAGE: &str = "Error de base de datos";

/// ## Summary
/// GET /elegir_centro - Every center, plus the one the user works in and
/// whether the user may change it.
#[handler]
#[tracing::instrument(skip_all)]
async fn list_centers(res: &mut Response, depot: &Depot) {
    let (services, context) = match (get_services_from_depot(depot), get_web_context_from_depot(depot)) {
        (Ok(services), Ok(context)) => (services, context),
        _ => {
            error!("Center handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match services.users.list_centers().await {
        Ok(centers) => res.render(Json(json!({
            "centers": centers,
            "current_center_id": context.identity.center_id(),
            "forced": context.identity.user.force_default_center,
        }))),
        Err(e) => {
            error!(error = %e, "Failed to list centers");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

/// ## Summary
/// POST /elegir_centro - Stores form field `center_id` as the user's default
/// center and goes back to `/`.
///
/// ## Errors
/// Redirects to `/elegir_centro?error=` for a missing or unknown center, or
/// when the account is pinned to another center.
#[handler]
#[tracing::instrument(skip_all)]
async fn select_center(req: &mut Request, res: &mut Response, depot: &Depot) {
    let (services, context) = match (get_services_from_depot(depot), get_web_context_from_depot(depot)) {
        (Ok(services), Ok(context)) => (services, context),
        _ => {
            error!("Center handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let Some(center_id) = req
        .form::<String>("center_id")
        .await
        .and_then(|value| value.trim().parse::<i32>().ok())
    else {
        redirect_with(res, CENTER_ROUTE, "error", CENTER_REQUIRED_MESSAGE);
        return;
    };

    match choose_center(
        services.users.as_ref(),
        &context.identity,
        center_id,
        services.clock.now(),
    )
    .await
    {
        Ok(_) => res.render(Redirect::found("/")),
        Err(ServiceError::Validation(message)) => {
            redirect_with(res, CENTER_ROUTE, "error", &message);
        }
        Err(ServiceError::PermissionDenied) => {
            redirect_with(res, CENTER_ROUTE, "error", CENTER_LOCKED_MESSAGE);
        }
        Err(e) => {
            error!(error = %e, "Failed to change default center");
            redirect_with(res, CENTER_ROUTE, "error", STORE_FAILED_MESSAGE);
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("elegir_centro")
        .get(list_centers)
        .post(select_center)
}
