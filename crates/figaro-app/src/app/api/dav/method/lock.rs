//! LOCK and UNLOCK method handlers.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use figaro_rfc::rfc::dav::build::serialize_lock_response;
use figaro_rfc::rfc::dav::core::{Depth, LockInfo, LockScope};
use figaro_rfc::rfc::dav::parse::parse_lockinfo;
use figaro_service::gateway::LockRequest;
use figaro_service::gateway::lock::GrantedLock;

use crate::app::api::dav::extract::headers;
use crate::app::api::dav::util::{DavScope, dav_scope, fs_status, set_header, write_xml};

/// ## Summary
/// Grants an exclusive write lock, or refreshes one when the body is empty.
///
/// A lock on a missing resource creates an empty file.
///
/// ## Side Effects
/// Sets the `Lock-Token` header on new locks.
///
/// ## Errors
/// Returns 400 for a malformed body or depth, 501 for shared locks, 423 on
/// conflict and 412 when a refresh names no held token.
#[handler]
#[tracing::instrument(skip_all, fields(method = "LOCK", path = %req.uri().path()))]
pub async fn lock(req: &mut Request, res: &mut Response, depot: &Depot) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };

    let body = match req.payload().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let info = match parse_lockinfo(&body) {
        Ok(info) => info,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed LOCK body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let outcome = match info {
        Some(info) => grant(req, &scope, info).await,
        None => refresh(req, &scope).await,
    };

    match outcome {
        Ok((status, granted, is_new)) => {
            let now = scope.now();
            let is_collection = scope
                .target
                .mount
                .fs
                .stat(&granted.path)
                .await
                .is_ok_and(|entry| entry.is_dir);
            let root = granted
                .path
                .to_href(&scope.target.mount.href_base, is_collection);
            match serialize_lock_response(&granted.to_active_lock(root, now)) {
                Ok(xml) => {
                    if is_new {
                        set_header(res, "Lock-Token", &format!("<{}>", granted.token));
                    }
                    write_xml(res, status, xml);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize lock response");
                    res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
        Err(status) => {
            res.status_code(status);
        }
    }
}

async fn grant(
    req: &Request,
    scope: &DavScope,
    info: LockInfo,
) -> Result<(StatusCode, GrantedLock, bool), StatusCode> {
    if info.scope == LockScope::Shared {
        tracing::debug!("Shared locks are not supported");
        return Err(StatusCode::NOT_IMPLEMENTED);
    }

    let depth = match headers::depth(req)? {
        None | Some(Depth::Infinity) => Depth::Infinity,
        Some(Depth::Zero) => Depth::Zero,
        Some(Depth::One) => return Err(StatusCode::BAD_REQUEST),
    };

    let path = &scope.target.path;
    let fs = &scope.target.mount.fs;
    let locks = &scope.target.mount.locks;

    if path.is_hidden() {
        return Err(StatusCode::NOT_FOUND);
    }
    let exists = fs.exists(path).await.map_err(|e| fs_status(&e))?;

    let granted = locks
        .lock(
            LockRequest {
                path: path.clone(),
                depth,
                owner: info.owner,
                timeout: headers::timeout(req),
            },
            scope.now(),
        )
        .map_err(|e| {
            tracing::debug!("Lock conflict");
            e.status_code()
        })?;

    if exists {
        return Ok((StatusCode::OK, granted, true));
    }

    if let Err(e) = fs.write(path, &[]).await {
        // Drop the lock granted for the resource that failed to appear.
        if let Err(unlock_err) = locks.unlock(&granted.token, path, scope.now()) {
            tracing::warn!(error = %unlock_err, "Failed to drop lock after create failure");
        }
        return Err(fs_status(&e));
    }
    tracing::debug!("Created empty resource for lock");
    Ok((StatusCode::CREATED, granted, true))
}

async fn refresh(
    req: &Request,
    scope: &DavScope,
) -> Result<(StatusCode, GrantedLock, bool), StatusCode> {
    let tokens = headers::submitted_tokens(req);
    if tokens.is_empty() {
        tracing::debug!("Lock refresh without an If header");
        return Err(StatusCode::BAD_REQUEST);
    }

    scope
        .target
        .mount
        .locks
        .refresh(&tokens, &scope.target.path, headers::timeout(req), scope.now())
        .map(|granted| (StatusCode::OK, granted, false))
        .map_err(|_err| StatusCode::PRECONDITION_FAILED)
}

/// ## Summary
/// Releases the lock named by the `Lock-Token` header.
///
/// ## Errors
/// Returns 400 without the header and 409 when the token is unknown or does
/// not cover the target.
#[handler]
#[tracing::instrument(skip_all, fields(method = "UNLOCK", path = %req.uri().path()))]
pub async fn unlock(req: &mut Request, res: &mut Response, depot: &Depot) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };

    let Some(token) = headers::lock_token(req) else {
        res.status_code(StatusCode::BAD_REQUEST);
        return;
    };

    match scope
        .target
        .mount
        .locks
        .unlock(&token, &scope.target.path, scope.now())
    {
        Ok(()) => {
            tracing::debug!("Lock released");
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => {
            res.status_code(e.status_code());
        }
    }
}
