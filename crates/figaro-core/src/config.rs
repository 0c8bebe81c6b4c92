//! Runtime settings.
//!
//! Values come from `config.toml` (optional) overlaid by environment
//! variables, with `__` between section and key (`SERVER__PORT`,
//! `OAUTH__CLIENT_ID`). `DATABASE_URL` is honored as well, since diesel
//! tooling reads it. A `.env` file is loaded into the environment first.
//! Every key except `database.url` has a default.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// 10 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "OAuthConfig::disabled")]
    pub oauth: OAuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub max_connections: u8,
}

const fn default_pool_size() -> u8 {
    4
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public origin used in links handed to users, when it differs from
    /// the bind address.
    pub serve_origin: Option<String>,
    /// Marks issued cookies `Secure`.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            serve_origin: None,
            secure_cookies: false,
        }
    }
}

impl ServerConfig {
    /// Origin clients should use, without a trailing slash.
    #[must_use]
    pub fn origin(&self) -> String {
        match &self.serve_origin {
            Some(origin) => origin.trim_end_matches('/').to_owned(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of personal and shared storage.
    pub data_dir: String,
    /// Largest accepted WebDAV PUT body, in bytes.
    pub max_upload_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_owned(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `figaro_app=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    #[serde(default)]
    pub enabled: bool,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
    /// When set, only emails under this domain may sign in.
    pub hosted_domain: Option<String>,
    #[serde(default = "google::authorize")]
    pub authorize_url: String,
    #[serde(default = "google::token")]
    pub token_url: String,
    #[serde(default = "google::userinfo")]
    pub userinfo_url: String,
}

mod google {
    pub fn authorize() -> String {
        super::GOOGLE_AUTHORIZE_URL.to_owned()
    }

    pub fn token() -> String {
        super::GOOGLE_TOKEN_URL.to_owned()
    }

    pub fn userinfo() -> String {
        super::GOOGLE_USERINFO_URL.to_owned()
    }
}

impl OAuthConfig {
    /// Sign-in with Google switched off, endpoints left at Google's.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            client_id: None,
            client_secret: None,
            redirect_url: None,
            hosted_domain: None,
            authorize_url: google::authorize(),
            token_url: google::token(),
            userinfo_url: google::userinfo(),
        }
    }
}

impl Settings {
    /// ## Errors
    /// Fails when a source cannot be read or a value has the wrong type,
    /// or when `database.url` is missing.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("config.toml").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

/// Reads `.env` if present, then [`Settings::load`].
///
/// ## Errors
/// See [`Settings::load`].
pub fn load_config() -> Result<Settings> {
    match dotenvy::dotenv() {
        Err(e) if !e.not_found() => Err(anyhow::anyhow!("unreadable .env file: {e}")),
        _ => Settings::load(),
    }
}
