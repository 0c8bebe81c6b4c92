//! Query builders and statements, one module per table family.

pub mod center;
pub mod session;
pub mod shared_folder;
pub mod user;
pub mod webdav_token;
