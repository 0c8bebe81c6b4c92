use std::sync::Arc;

use chrono::{DateTime, Utc};
use salvo::http::{HeaderValue, StatusCode};
use salvo::{Depot, Request, Response};

use figaro_service::gateway::{DavPath, FsError};
use figaro_service::services::Services;
use figaro_service::util::clock::Clock;

use super::extract::headers;
use crate::middleware::mount::{DavTarget, get_dav_target_from_depot};
use crate::services_handler::get_services_from_depot;

/// What every WebDAV method handler works with.
pub struct DavScope {
    pub services: Arc<Services>,
    pub target: DavTarget,
}

impl DavScope {
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.services.clock.now()
    }

    /// ## Summary
    /// Checks the mount's locks before writing to `path`.
    ///
    /// ## Errors
    /// Returns 423 if a lock applies and its token was not submitted.
    pub fn check_write(
        &self,
        req: &Request,
        path: &DavPath,
        with_descendants: bool,
    ) -> Result<(), StatusCode> {
        let tokens = headers::submitted_tokens(req);
        self.target
            .mount
            .locks
            .check_write(path, &tokens, with_descendants, self.now())
            .map_err(|e| {
                tracing::debug!(path = %path, "Write blocked by lock");
                e.status_code()
            })
    }
}

/// ## Summary
/// Collects the services and the resolved target for a WebDAV handler.
///
/// ## Errors
/// Returns 500 if the middleware did not populate the depot.
pub fn dav_scope(depot: &Depot) -> Result<DavScope, StatusCode> {
    let services = get_services_from_depot(depot).map_err(|e| {
        tracing::error!(error = %e, "Failed to get services from depot");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let target = get_dav_target_from_depot(depot)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get WebDAV target from depot");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .clone();
    Ok(DavScope { services, target })
}

/// Status for a filesystem failure. Unexpected IO errors are logged here.
#[must_use]
pub fn fs_status(err: &FsError) -> StatusCode {
    if let FsError::Io(io) = err {
        tracing::error!(error = %io, "Filesystem operation failed");
    }
    err.status_code()
}

pub fn set_header(res: &mut Response, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        #[expect(
            clippy::let_underscore_must_use,
            reason = "Header addition failure is non-fatal"
        )]
        let _ = res.add_header(name, value, true);
    }
}

/// Writes an XML body with the given status.
pub fn write_xml(res: &mut Response, status: StatusCode, xml: String) {
    res.status_code(status);
    set_header(res, "Content-Type", "application/xml; charset=utf-8");
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Write body failure is non-fatal"
    )]
    let _ = res.write_body(xml);
}
