use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde_json::json;
use tracing::error;

use figaro_core::constants::{PERSONAL_MOUNT_PREFIX, PROFILE_ROUTE, SHARED_MOUNT_PREFIX};
use figaro_service::auth::get_web_context_from_depot;
use figaro_service::credential::IssueContext;

use super::util::redirect_with;
use crate::config::get_config_from_depot;
use crate::services_handler::get_services_from_depot;

const TOKENS_ROUTE: &str = const_str::concat!(PROFILE_ROUTE, "/webdav");

const DEVICE_REQUIRED_MESSAGE: &str = "Nombre del dispositivo requerido";
const CREATE_FAILED_MESSAGE: &str = "Error al crear el token";
const REVOKED_MESSAGE: &str = "Token revocado correctamente";
const REVOKE_FAILED_MESSAGE: &str = "Error al revocar el token";

/// ## Summary
/// GET /perfil/webdav - The user's live WebDAV tokens and the mount URLs to
/// configure clients with.
#[handler]
#[tracing::instrument(skip_all)]
async fn list_tokens(res: &mut Response, depot: &Depot) {
    let (services, settings, context) = match (
        get_services_from_depot(depot),
        get_config_from_depot(depot),
        get_web_context_from_depot(depot),
    ) {
        (Ok(services), Ok(settings), Ok(context)) => (services, settings, context),
        _ => {
            error!("Token handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let origin = settings.server.origin();
    match services.webdav_tokens.list(context.identity.user_id()).await {
        Ok(tokens) => res.render(Json(json!({
            "tokens": tokens,
            "personal_url": format!("{origin}{PERSONAL_MOUNT_PREFIX}/"),
            "shared_url": format!("{origin}{SHARED_MOUNT_PREFIX}/"),
        }))),
        Err(e) => {
            error!(error = %e, "Failed to list WebDAV tokens");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

/// ## Summary
/// POST /perfil/webdav/crear - Issues a token for the named device.
///
/// ## Side Effects
/// Persists a new WebDAV token.
#[handler]
#[tracing::instrument(skip_all)]
async fn create_token(req: &mut Request, res: &mut Response, depot: &Depot) {
    let (services, context) = match (get_services_from_depot(depot), get_web_context_from_depot(depot)) {
        (Ok(services), Ok(context)) => (services, context),
        _ => {
            error!("Token handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let Some(device_name) = req
        .form::<String>("device_name")
        .await
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
    else {
        redirect_with(res, TOKENS_ROUTE, "error", DEVICE_REQUIRED_MESSAGE);
        return;
    };

    match services
        .webdav_tokens
        .issue(context.identity.user_id(), &IssueContext::device(&device_name))
        .await
    {
        Ok(token) => {
            tracing::info!(token_id = %token.id, "WebDAV token created");
            redirect_with(
                res,
                TOKENS_ROUTE,
                "success",
                &format!("Token creado para {device_name}"),
            );
        }
        Err(e) => {
            error!(error = %e, "Failed to create WebDAV token");
            redirect_with(res, TOKENS_ROUTE, "error", CREATE_FAILED_MESSAGE);
        }
    }
}

/// ## Summary
/// POST /perfil/webdav/revocar/{id} - Revokes one of the user's tokens.
///
/// Reports success whether or not the id named a token the user owns.
#[handler]
#[tracing::instrument(skip_all)]
async fn revoke_token(req: &mut Request, res: &mut Response, depot: &Depot) {
    let (services, context) = match (get_services_from_depot(depot), get_web_context_from_depot(depot)) {
        (Ok(services), Ok(context)) => (services, context),
        _ => {
            error!("Token handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let id = req.param::<String>("id").unwrap_or_default();
    match services.webdav_tokens.revoke(&id, context.identity.user_id()).await {
        Ok(()) => redirect_with(res, TOKENS_ROUTE, "success", REVOKED_MESSAGE),
        Err(e) => {
            error!(error = %e, "Failed to revoke WebDAV token");
            redirect_with(res, TOKENS_ROUTE, "error", REVOKE_FAILED_MESSAGE);
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("webdav")
        .get(list_tokens)
        .push(Router::with_path("crear").post(create_token))
        .push(Router::with_path("revocar/{id}").post(revoke_token))
}
