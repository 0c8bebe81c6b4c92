//! Persistence for identities, bearer credentials and shared folders.

pub mod db;
pub mod error;
pub mod model;
pub mod store;
