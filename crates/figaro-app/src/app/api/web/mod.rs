//! Browser-facing routes: login, profile, center choice and the shared
//! folder catalog.
//!
//! Everything except login, logout, OAuth and the healthcheck runs behind
//! [`SessionMiddleware`].

use salvo::Router;

use crate::middleware::session::SessionMiddleware;

mod center;
mod healthcheck;
mod index;
mod login;
mod logout;
mod oauth;
mod profile;
mod shared_folders;
mod util;
mod webdav_tokens;

pub use login::{INVALID_CREDENTIALS_MESSAGE, MISSING_CREDENTIALS_MESSAGE};

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(healthcheck::routes())
        .push(login::routes())
        .push(logout::routes())
        .push(oauth::routes())
        .push(
            Router::new()
                .hoop(SessionMiddleware)
                .push(index::routes())
                .push(center::routes())
                .push(profile::routes())
                .push(shared_folders::routes()),
        )
}
