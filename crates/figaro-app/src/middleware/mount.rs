//! Resolution of WebDAV request paths to a mounted root.
//!
//! The raw request path is decoded segment by segment and split into the
//! mount prefix and the path below the mount root, so handlers only ever
//! see a [`DavPath`] that cannot escape its root.

use salvo::Depot;
use salvo::http::StatusCode;
use tracing::error;

use figaro_core::constants::{PERSONAL_MOUNT_PREFIX, SHARED_MOUNT_PREFIX};
use figaro_core::error::CoreError;
use figaro_service::auth::get_dav_context_from_depot;
use figaro_service::error::ServiceError;
use figaro_service::gateway::{DavPath, MountedRoot};

use crate::error::AppResult;
use crate::services_handler::get_services_from_depot;

/// Which mount family a router serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// `/dav/MisArchivos/...`
    Personal,
    /// `/dav/CarpetasCompartidas/<folder>/...`
    Shared,
}

/// The resolved target of a WebDAV request.
#[derive(Debug, Clone)]
pub struct DavTarget {
    pub mount: MountedRoot,
    pub path: DavPath,
}

/// ## Summary
/// Resolves the mount and the path below it for every request.
///
/// ## Side Effects
/// Injects `DavTarget` into the depot. The personal root is created on
/// first access.
///
/// ## Errors
/// Answers 403 for traversal attempts and 404 for folders the caller cannot
/// reach.
pub struct MountMiddleware(pub MountKind);

#[salvo::async_trait]
impl salvo::Handler for MountMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        mount = ?self.0,
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        match self.resolve(req.uri().path(), depot).await {
            Ok(target) => {
                tracing::trace!(target_path = %target.path, "Mount resolved");
                depot.inject(target);
            }
            Err(status) => {
                res.status_code(status);
                ctrl.skip_rest();
            }
        }
    }
}

impl MountMiddleware {
    async fn resolve(&self, raw_path: &str, depot: &Depot) -> Result<DavTarget, StatusCode> {
        let services = get_services_from_depot(depot).map_err(|e| {
            error!(error = %e, "Failed to get services from depot");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        let identity = &get_dav_context_from_depot(depot)
            .map_err(|_err| StatusCode::UNAUTHORIZED)?
            .identity;

        let full = DavPath::parse(raw_path).map_err(|e| {
            tracing::warn!("Rejected request path");
            e.status_code()
        })?;

        let mounted = match self.0 {
            MountKind::Personal => {
                let path = below(&full, PERSONAL_MOUNT_PREFIX)?;
                services
                    .gateway
                    .personal_mount(identity.user_id())
                    .await
                    .map(|mount| DavTarget { mount, path })
            }
            MountKind::Shared => {
                let rest = below(&full, SHARED_MOUNT_PREFIX)?;
                let folder = rest
                    .segments()
                    .first()
                    .cloned()
                    .ok_or(StatusCode::NOT_FOUND)?;
                let path = rest
                    .strip_prefix(&DavPath::root().join(&folder))
                    .ok_or(StatusCode::NOT_FOUND)?;
                services
                    .gateway
                    .shared_mount(&folder, identity.center_id())
                    .await
                    .map(|mount| DavTarget { mount, path })
            }
        };

        mounted.map_err(|e| match e {
            ServiceError::FolderNotAccessible => StatusCode::NOT_FOUND,
            other => {
                error!(error = %other, "Failed to mount gateway root");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })
    }
}

/// Part of `full` below the route prefix `prefix`.
fn below(full: &DavPath, prefix: &str) -> Result<DavPath, StatusCode> {
    let base = DavPath::parse(prefix).map_err(|_err| StatusCode::INTERNAL_SERVER_ERROR)?;
    full.strip_prefix(&base).ok_or(StatusCode::NOT_FOUND)
}

/// ## Summary
/// Retrieves the resolved WebDAV target from the depot.
///
/// ## Errors
/// Returns an error if the mount middleware did not run.
pub fn get_dav_target_from_depot(depot: &Depot) -> AppResult<&DavTarget> {
    depot
        .obtain::<DavTarget>()
        .map_err(|_err| CoreError::MissingFromDepot("WebDAV target").into())
}

/// ## Summary
/// Resolves a `Destination` header against the mount of the request.
///
/// Accepts absolute URLs and absolute paths.
///
/// ## Errors
/// Returns 400 for an unusable header, 403 for traversal and 502 for a
/// destination outside the mount.
pub fn destination_in_mount(mount: &MountedRoot, destination: &str) -> Result<DavPath, StatusCode> {
    let path = match destination.split_once("://") {
        Some((_scheme, rest)) => rest.find('/').map_or("/", |index| &rest[index..]),
        None if destination.starts_with('/') => destination,
        None => return Err(StatusCode::BAD_REQUEST),
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let full = DavPath::parse(path).map_err(|e| e.status_code())?;
    let base = DavPath::parse(&mount.href_base).map_err(|_err| StatusCode::INTERNAL_SERVER_ERROR)?;
    full.strip_prefix(&base).ok_or(StatusCode::BAD_GATEWAY)
}
