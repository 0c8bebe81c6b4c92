//! The WebDAV file gateway.
//!
//! ## Module Organization
//!
//! - `error`: filesystem errors and their HTTP status
//! - `fs`: root-confined filesystem access that hides dot-entries
//! - `lock`: in-memory lock tables, one per root
//! - `mount`: resolution of personal and shared mounts to a root
//! - `path`: decoded, traversal-free request paths

pub mod error;
pub mod fs;
pub mod lock;
pub mod mount;
pub mod path;

pub use error::{FsError, FsResult};
pub use fs::{EntryInfo, HiddenFilteringFs};
pub use lock::{LockError, LockRegistry, LockRequest, LockTable};
pub use mount::{Gateway, MountedRoot};
pub use path::DavPath;
