//! `WebDAV` request parsing, core types and response building.

pub mod build;
pub mod core;
pub mod parse;
