//! RFC 4918 (`WebDAV`) vocabulary used by the Figaro file gateway.

pub mod error;
pub mod rfc;
