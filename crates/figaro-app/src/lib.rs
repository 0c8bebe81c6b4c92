//! HTTP surface of the Figaro gateway: web session routes, OAuth redirects
//! and the WebDAV mounts.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services_handler;
