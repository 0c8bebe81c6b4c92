//! PROPPATCH method handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use figaro_rfc::rfc::dav::build::serialize_multistatus;
use figaro_rfc::rfc::dav::core::{DavProperty, Href, Multistatus, PropstatResponse, Status};
use figaro_rfc::rfc::dav::parse::parse_proppatch;

use crate::app::api::dav::util::{dav_scope, fs_status, write_xml};

/// ## Summary
/// Parses the update and refuses every property: there is no dead-property
/// store, and live properties are read-only.
///
/// ## Errors
/// Returns 400 for a malformed body, 404 when missing, 423 when locked.
#[handler]
#[tracing::instrument(skip_all, fields(method = "PROPPATCH", path = %req.uri().path()))]
pub async fn proppatch(req: &mut Request, res: &mut Response, depot: &Depot) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };
    let path = &scope.target.path;

    let body = match req.payload().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let update = match parse_proppatch(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed PROPPATCH body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let info = match scope.target.mount.fs.stat(path).await {
        Ok(info) => info,
        Err(e) => {
            res.status_code(fs_status(&e));
            return;
        }
    };

    if let Err(status) = scope.check_write(req, path, false) {
        res.status_code(status);
        return;
    }

    let refused = update.names().cloned().map(DavProperty::not_found).collect();
    let href = Href::new(path.to_href(&scope.target.mount.href_base, info.is_dir));

    let mut multistatus = Multistatus::new();
    multistatus.add_response(PropstatResponse::with_status(href, refused, Status::FORBIDDEN));

    match serialize_multistatus(&multistatus) {
        Ok(xml) => write_xml(res, StatusCode::MULTI_STATUS, xml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize multistatus");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
