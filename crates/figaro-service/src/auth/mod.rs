//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `access`: capability checks against an identity's permission set
//! - `center`: choosing the center a user works in
//! - `depot`: typed request context injected by the middleware
//! - `identity`: a user together with its permissions
//! - `login`: password and QR login
//! - `password`: bcrypt hashing and verification

pub mod access;
pub mod center;
pub mod depot;
pub mod identity;
pub mod login;
pub mod password;

pub use access::has_access;
pub use depot::{
    DavContext, WebContext, get_dav_context_from_depot, get_identity_from_depot,
    get_web_context_from_depot,
};
pub use identity::Identity;
