pub mod mount;
pub mod permission;
pub mod session;
pub mod webdav_auth;
