//! PUT method handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{dav_scope, fs_status};

/// ## Summary
/// Writes the request body to the target file.
///
/// ## Side Effects
/// Creates or replaces the file.
///
/// ## Errors
/// Returns 413 over the upload limit, 423 when locked, 409 without a parent
/// collection and 405 when the target is a collection.
#[handler]
#[tracing::instrument(skip_all, fields(method = "PUT", path = %req.uri().path()))]
pub async fn put(req: &mut Request, res: &mut Response, depot: &Depot) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };
    let path = &scope.target.path;

    if let Err(status) = scope.check_write(req, path, false) {
        res.status_code(status);
        return;
    }

    let max = scope.services.gateway.max_upload_size();
    let declared = req
        .headers()
        .get("Content-Length")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    if declared.is_some_and(|len| len > max) {
        tracing::info!(declared = ?declared, max, "Upload over the size limit");
        res.status_code(StatusCode::PAYLOAD_TOO_LARGE);
        return;
    }

    let body = match req
        .payload_with_max_size(usize::try_from(max).unwrap_or(usize::MAX))
        .await
    {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::info!(error = %e, "Upload body rejected");
            res.status_code(StatusCode::PAYLOAD_TOO_LARGE);
            return;
        }
    };

    match scope.target.mount.fs.write(path, &body).await {
        Ok(true) => {
            tracing::debug!(bytes = body.len(), "File created");
            res.status_code(StatusCode::CREATED);
        }
        Ok(false) => {
            tracing::debug!(bytes = body.len(), "File replaced");
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => {
            res.status_code(fs_status(&e));
        }
    }
}
