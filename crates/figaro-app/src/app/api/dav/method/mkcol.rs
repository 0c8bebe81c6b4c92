//! MKCOL method handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{dav_scope, fs_status};

/// ## Summary
/// Creates one collection.
///
/// ## Errors
/// Returns 415 for a request body, 405 if the target exists, 409 without a
/// parent collection and 423 when locked.
#[handler]
#[tracing::instrument(skip_all, fields(method = "MKCOL", path = %req.uri().path()))]
pub async fn mkcol(req: &mut Request, res: &mut Response, depot: &Depot) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };
    let path = &scope.target.path;

    match req.payload().await {
        Ok(body) if body.is_empty() => {}
        Ok(_) => {
            res.status_code(StatusCode::UNSUPPORTED_MEDIA_TYPE);
            return;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    }

    if path.is_root() {
        res.status_code(StatusCode::METHOD_NOT_ALLOWED);
        return;
    }

    if let Err(status) = scope.check_write(req, path, false) {
        res.status_code(status);
        return;
    }

    match scope.target.mount.fs.create_dir(path).await {
        Ok(()) => {
            res.status_code(StatusCode::CREATED);
        }
        Err(e) => {
            res.status_code(fs_status(&e));
        }
    }
}
