//! Figaro gateway - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `figaro_test::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    // Re-export core and service modules at the component level
    pub use figaro_core::*;
    pub use figaro_service::*;

    // Both crates define `error`; tests want the service taxonomy
    pub use figaro_service::error;

    pub mod db {
        pub use figaro_db::db::*;
        pub use figaro_db::store;
    }

    pub mod model {
        pub use figaro_db::model::*;
    }

    pub mod middleware {
        pub use figaro_app::middleware::*;
    }

    // Re-export config from both core and app
    pub mod config {
        pub use figaro_app::config::ConfigHandler;
        pub use figaro_core::config::*;
    }
}

pub mod app {
    pub use figaro_app::*;

    pub mod api {
        pub use figaro_app::app::api::*;
    }
}

pub use figaro_rfc as rfc;
