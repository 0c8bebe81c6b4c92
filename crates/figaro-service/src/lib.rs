//! Business logic between the HTTP layer and the stores.

pub mod auth;
pub mod catalog;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod oauth;
pub mod services;
pub mod util;
