//! `WebDAV` XML types.
//!
//! This module defines the core types for `WebDAV` XML elements
//! used in `PROPFIND`, `PROPPATCH`, `LOCK` and multistatus responses.

mod depth;
mod lock;
mod multistatus;
mod namespace;
pub mod property;
mod propfind;
mod proppatch;

pub use depth::Depth;
pub use lock::{ActiveLock, LockInfo, LockOwner, LockScope, Timeout};
pub use multistatus::{Href, Multistatus, Propstat, PropstatResponse, Status};
pub use namespace::{DAV_NS, Namespace, QName, dav_props};
pub use property::{DavProperty, PropertyName, PropertyValue};
pub use propfind::PropfindRequest;
pub use proppatch::{PatchInstruction, ProppatchRequest};
