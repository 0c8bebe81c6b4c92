//! `WebDAV` class 1 and 2 over the personal and shared mounts.

use salvo::{Handler, Router};

use figaro_core::constants::{PERSONAL_MOUNT_COMPONENT, SHARED_MOUNT_COMPONENT};

use crate::middleware::mount::{MountKind, MountMiddleware};
use crate::middleware::webdav_auth::WebDavAuthMiddleware;

pub mod extract;
pub mod method;
pub mod util;

/// ## Summary
/// Routes for both mount families, behind Basic authentication.
#[must_use]
pub fn routes() -> Router {
    Router::new()
        .hoop(WebDavAuthMiddleware::new())
        .push(
            Router::with_path(format!("{PERSONAL_MOUNT_COMPONENT}/{{**path}}"))
                .hoop(MountMiddleware(MountKind::Personal))
                .push(methods()),
        )
        .push(
            Router::with_path(format!("{SHARED_MOUNT_COMPONENT}/{{folder}}/{{**path}}"))
                .hoop(MountMiddleware(MountKind::Shared))
                .push(methods()),
        )
}

fn methods() -> Router {
    Router::new()
        .options(method::options::options)
        .get(method::get_head::get)
        .head(method::get_head::head)
        .post(method::get_head::get)
        .put(method::put::put)
        .delete(method::delete::delete)
        .push(extension("PROPFIND", method::propfind::propfind))
        .push(extension("PROPPATCH", method::proppatch::proppatch))
        .push(extension("MKCOL", method::mkcol::mkcol))
        .push(extension("COPY", method::copy_move::copy))
        .push(extension("MOVE", method::copy_move::r#move))
        .push(extension("LOCK", method::lock::lock))
        .push(extension("UNLOCK", method::lock::unlock))
}

/// Salvo has no builder for non-standard verbs, so they match on the
/// method name.
fn extension(verb: &'static str, goal: impl Handler) -> Router {
    Router::new()
        .filter_fn(move |req, _| req.method().as_str() == verb)
        .goal(goal)
}
