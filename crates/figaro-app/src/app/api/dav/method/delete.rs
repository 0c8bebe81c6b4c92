//! DELETE method handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{dav_scope, fs_status};

/// ## Summary
/// Removes a file, or a collection with its contents.
///
/// ## Side Effects
/// Drops the locks rooted at or below the removed entry.
///
/// ## Errors
/// Returns 403 for the mount root, 404 when missing and 423 when the entry
/// or a descendant is locked.
#[handler]
#[tracing::instrument(skip_all, fields(method = "DELETE", path = %req.uri().path()))]
pub async fn delete(req: &mut Request, res: &mut Response, depot: &Depot) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };
    let path = &scope.target.path;

    if let Err(status) = scope.check_write(req, path, true) {
        res.status_code(status);
        return;
    }

    match scope.target.mount.fs.remove(path).await {
        Ok(()) => {
            scope.target.mount.locks.release_tree(path);
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => {
            res.status_code(fs_status(&e));
        }
    }
}
