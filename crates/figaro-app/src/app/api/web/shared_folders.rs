use salvo::http::StatusCode;
use salvo::writing::{Json, Redirect};
use salvo::{Depot, Request, Response, Router, handler};
use serde_json::json;
use tracing::error;

use figaro_core::constants::{SHARED_FOLDERS_ROUTE, SUPERUSER_PERMISSION};
use figaro_service::auth::get_web_context_from_depot;
use figaro_service::catalog::NewFolderRequest;
use figaro_service::error::ServiceError;

use super::util::ErrorResponse;
use crate::middleware::permission::RequirePermission;
use crate::services_handler::get_services_from_depot;

fn render_error(res: &mut Response, status: StatusCode, message: impl Into<String>) {
    res.status_code(status);
    res.render(Json(ErrorResponse {
        error: message.into(),
    }));
}

fn render_service_error(res: &mut Response, err: &ServiceError) {
    match err {
        ServiceError::Validation(message) => {
            tracing::debug!(error = %message, "Shared folder request rejected");
            render_error(res, StatusCode::BAD_REQUEST, message.clone());
        }
        ServiceError::FolderNotAccessible => {
            render_error(res, StatusCode::NOT_FOUND, "Carpeta no encontrada");
        }
        ServiceError::PermissionDenied => {
            render_error(res, StatusCode::FORBIDDEN, "Permiso denegado");
        }
        other => {
            error!(error = %other, "Shared folder operation failed");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Error de base de datos");
        }
    }
}

/// Checkbox values browsers and scripts send for "on".
fn is_checked(value: Option<&str>) -> bool {
    matches!(value, Some("on" | "true" | "1"))
}

/// ## Summary
/// GET /carpetas-compartidas - Folders visible to the user's center, global
/// ones first, with the owning center's name.
#[handler]
#[tracing::instrument(skip_all)]
async fn list_folders(res: &mut Response, depot: &Depot) {
    let (services, context) = match (get_services_from_depot(depot), get_web_context_from_depot(depot)) {
        (Ok(services), Ok(context)) => (services, context),
        _ => {
            error!("Folder handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match services.catalog.list_for(&context.identity).await {
        Ok(folders) => res.render(Json(json!({ "folders": folders }))),
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// POST /carpetas-compartidas/crear - Creates a local or cloud folder.
///
/// ## Side Effects
/// Creates the backing directory of a local folder.
///
/// ## Errors
/// Answers 400 with a JSON error when validation fails.
#[handler]
#[tracing::instrument(skip_all)]
async fn create_folder(req: &mut Request, res: &mut Response, depot: &Depot) {
    let (services, context) = match (get_services_from_depot(depot), get_web_context_from_depot(depot)) {
        (Ok(services), Ok(context)) => (services, context),
        _ => {
            error!("Folder handler is missing its request context");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let center_id = match req.form::<String>("center_id").await.filter(|v| !v.is_empty()) {
        Some(raw) => match raw.parse::<i32>() {
            Ok(id) => Some(id),
            Err(_err) => {
                render_error(res, StatusCode::BAD_REQUEST, "ID de centro no válido");
                return;
            }
        },
        None => None,
    };

    let request = NewFolderRequest {
        name: req.form::<String>("nombre").await.unwrap_or_default(),
        description: req.form::<String>("descripcion").await.unwrap_or_default(),
        folder_type: req.form::<String>("tipo").await.unwrap_or_default(),
        cloud_url: req.form::<String>("cloud_url").await,
        center_id,
        is_global: is_checked(req.form::<String>("is_global").await.as_deref()),
    };

    match services.catalog.create(&context.identity, request).await {
        Ok(_folder) => res.render(Redirect::found(SHARED_FOLDERS_ROUTE)),
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// POST /carpetas-compartidas/eliminar/{id} - Soft-deletes a folder.
///
/// ## Errors
/// Answers 400 for a malformed id and 404 for an unknown folder.
#[handler]
#[tracing::instrument(skip_all, fields(id = ?req.param::<String>("id")))]
async fn delete_folder(req: &mut Request, res: &mut Response, depot: &Depot) {
    let services = match get_services_from_depot(depot) {
        Ok(services) => services,
        Err(e) => {
            error!(error = %e, "Failed to get services from depot");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let Some(id) = req.param::<i32>("id") else {
        render_error(res, StatusCode::BAD_REQUEST, "ID de carpeta no válido");
        return;
    };

    match services.catalog.delete(id).await {
        Ok(()) => {
            tracing::info!(folder_id = %id, "Shared folder deleted");
            res.render(Redirect::found(SHARED_FOLDERS_ROUTE));
        }
        Err(e) => render_service_error(res, &e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("carpetas-compartidas")
        .get(list_folders)
        .push(
            Router::with_path("crear")
                .hoop(RequirePermission(SUPERUSER_PERMISSION))
                .post(create_folder),
        )
        .push(
            Router::with_path("eliminar/{id}")
                .hoop(RequirePermission(SUPERUSER_PERMISSION))
                .post(delete_folder),
        )
}
