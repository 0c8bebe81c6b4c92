pub mod dav;
pub mod web;

use salvo::Router;

// Re-export route constants from core
pub use figaro_core::constants::{DAV_ROUTE_COMPONENT, DAV_ROUTE_PREFIX};

/// ## Summary
/// Constructs the application router: the browser routes plus the `WebDAV`
/// gateway under `/dav`.
#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path(DAV_ROUTE_COMPONENT).push(dav::routes()))
        .push(web::routes())
}
