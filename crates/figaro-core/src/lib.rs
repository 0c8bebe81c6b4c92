//! Shared configuration, constants and error types for the Figaro gateway.

pub mod config;
pub mod constants;
pub mod error;
