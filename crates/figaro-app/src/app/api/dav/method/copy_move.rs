//! COPY and MOVE method handlers.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use figaro_rfc::rfc::dav::core::Depth;
use figaro_service::gateway::DavPath;

use crate::app::api::dav::extract::headers;
use crate::app::api::dav::util::{DavScope, dav_scope, fs_status};
use crate::middleware::mount::destination_in_mount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Copy,
    Move,
}

/// ## Summary
/// Copies the target to the `Destination` within the same mount.
///
/// ## Errors
/// Returns 400 without a destination, 502 for one outside the mount, 403
/// onto itself, 412 when it exists and `Overwrite: F`, 423 when locked.
#[handler]
#[tracing::instrument(skip_all, fields(method = "COPY", path = %req.uri().path()))]
pub async fn copy(req: &mut Request, res: &mut Response, depot: &Depot) {
    transfer(req, res, depot, Transfer::Copy).await;
}

/// ## Summary
/// Moves the target to the `Destination` within the same mount. Always
/// depth infinity.
///
/// ## Errors
/// Same as COPY, and 423 when the source is locked.
#[handler]
#[tracing::instrument(skip_all, fields(method = "MOVE", path = %req.uri().path()))]
pub async fn r#move(req: &mut Request, res: &mut Response, depot: &Depot) {
    transfer(req, res, depot, Transfer::Move).await;
}

async fn transfer(req: &Request, res: &mut Response, depot: &Depot, kind: Transfer) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };

    match run(req, &scope, kind).await {
        Ok(status) | Err(status) => {
            res.status_code(status);
        }
    }
}

async fn run(req: &Request, scope: &DavScope, kind: Transfer) -> Result<StatusCode, StatusCode> {
    let source = &scope.target.path;
    let fs = &scope.target.mount.fs;
    let locks = &scope.target.mount.locks;

    let Some(raw_destination) = headers::destination(req) else {
        tracing::debug!("Missing Destination header");
        return Err(StatusCode::BAD_REQUEST);
    };
    let destination = destination_in_mount(&scope.target.mount, raw_destination)?;

    let recursive = match kind {
        Transfer::Move => true,
        Transfer::Copy => match headers::depth(req)? {
            None | Some(Depth::Infinity) => true,
            Some(Depth::Zero) => false,
            Some(Depth::One) => return Err(StatusCode::BAD_REQUEST),
        },
    };

    if overlaps(source, &destination) {
        tracing::debug!(destination = %destination, "Destination overlaps the source");
        return Err(StatusCode::FORBIDDEN);
    }

    fs.stat(source).await.map_err(|e| fs_status(&e))?;

    if kind == Transfer::Move {
        scope.check_write(req, source, true)?;
    }
    scope.check_write(req, &destination, true)?;

    let existed = fs
        .exists(&destination)
        .await
        .map_err(|e| fs_status(&e))?;
    if existed {
        if !headers::overwrite(req) {
            return Err(StatusCode::PRECONDITION_FAILED);
        }
        fs.remove(&destination).await.map_err(|e| fs_status(&e))?;
        locks.release_tree(&destination);
    }

    match kind {
        Transfer::Copy => fs.copy(source, &destination, recursive).await,
        Transfer::Move => fs.rename(source, &destination).await,
    }
    .map_err(|e| fs_status(&e))?;

    if kind == Transfer::Move {
        locks.release_tree(source);
    }

    tracing::debug!(destination = %destination, existed, "Transfer complete");
    Ok(if existed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CREATED
    })
}

/// Source and destination are the same entry or one contains the other.
fn overlaps(source: &DavPath, destination: &DavPath) -> bool {
    destination.starts_with(source) || source.starts_with(destination)
}
