#![allow(
    clippy::unused_async,
    clippy::expect_used,
    clippy::unwrap_used,
    dead_code,
    clippy::missing_panics_doc
)]
//! Shared fixtures for the integration suite: an isolated [`TestApp`]
//! (in-memory store, temp data dir, settable clock), seeding helpers, and a
//! small request/response wrapper over `salvo::test`.
//!
//! ## Isolation
//! Every [`TestApp`] owns its own store and data directory, so tests run in
//! parallel without sharing state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use salvo::http::cookie::Cookie;
use salvo::http::header::HeaderName;
use salvo::http::{Method, ReqBody, StatusCode};
use salvo::prelude::*;
use salvo::test::{RequestBuilder, ResponseExt};
use tempfile::TempDir;

use figaro_test::app::api::routes;
use figaro_test::app::services_handler::ServicesHandler;
use figaro_test::component::auth::password::hash_password_with_cost;
use figaro_test::component::config::{
    ConfigHandler, DatabaseConfig, LoggingConfig, OAuthConfig, ServerConfig, Settings,
    StorageConfig,
};
use figaro_test::component::constants::{LOGGED_IN_COOKIE, SESSION_COOKIE};
use figaro_test::component::credential::IssueContext;
use figaro_test::component::db::enums::FolderType;
use figaro_test::component::db::store::memory::MemoryStore;
use figaro_test::component::db::store::{SharedFolderStore, UserStore};
use figaro_test::component::error::{ServiceError, ServiceResult};
use figaro_test::component::oauth::{ClientCredentials, IdentityProvider, VerifiedIdentity};
use figaro_test::component::services::Services;
use figaro_test::component::util::clock::FixedClock;
use figaro_test::component::model::center::Center;
use figaro_test::component::model::shared_folder::{SharedFolder, SharedFolderDraft};
use figaro_test::component::model::user::{User, UserDraft};

pub use tracing;

/// Lowest bcrypt cost, to keep seeding fast.
const TEST_BCRYPT_COST: u32 = 4;

pub const TEST_REDIRECT_URL: &str = "http://127.0.0.1:5800/auth/google/callback";
pub const TEST_AUTHORIZE_URL: &str = "https://accounts.example.test/o/oauth2/auth";

/// Identity provider answering every code with a configured account.
#[derive(Default)]
pub struct StubIdentityProvider {
    calls: AtomicUsize,
    identity: Mutex<Option<VerifiedIdentity>>,
}

impl StubIdentityProvider {
    pub fn answer_with(&self, email: &str, name: &str) {
        *self.identity.lock().unwrap_or_else(PoisonError::into_inner) = Some(VerifiedIdentity {
            email: email.to_string(),
            name: name.to_string(),
        });
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn exchange(
        &self,
        _credentials: &ClientCredentials,
        _code: &str,
    ) -> ServiceResult<VerifiedIdentity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ServiceError::OAuthExchange("no account configured"))
    }
}

/// Settings for a test app rooted at `data_dir`, with OAuth enabled.
#[must_use]
pub fn test_settings(data_dir: &Path) -> Settings {
    Settings {
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5800,
            serve_origin: None,
            secure_cookies: false,
        },
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().into_owned(),
            max_upload_size: 1024 * 1024,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        oauth: OAuthConfig {
            enabled: true,
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            redirect_url: Some(TEST_REDIRECT_URL.to_string()),
            hosted_domain: None,
            authorize_url: TEST_AUTHORIZE_URL.to_string(),
            ..OAuthConfig::disabled()
        },
    }
}

/// A fully wired app over an in-memory store.
pub struct TestApp {
    pub service: Service,
    pub store: Arc<MemoryStore>,
    pub services: Arc<Services>,
    pub clock: Arc<FixedClock>,
    pub provider: Arc<StubIdentityProvider>,
    pub settings: Settings,
    data_dir: TempDir,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(|_| {})
    }

    /// Builds an app after letting the caller adjust the settings.
    #[must_use]
    pub fn with_settings(configure: impl FnOnce(&mut Settings)) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp data dir");
        let mut settings = test_settings(data_dir.path());
        configure(&mut settings);

        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let provider = Arc::new(StubIdentityProvider::default());
        let services = Arc::new(Services::new(
            store.clone(),
            &settings,
            provider.clone(),
            clock.clone(),
        ));

        // Matches the router built in main.rs
        let router = Router::new()
            .hoop(Logger::new())
            .hoop(ConfigHandler::new(settings.clone()))
            .hoop(ServicesHandler {
                services: services.clone(),
            })
            .push(routes());

        Self {
            service: Service::new(router),
            store,
            services,
            clock,
            provider,
            settings,
            data_dir,
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Directory backing a user's personal mount.
    #[must_use]
    pub fn personal_dir(&self, user_id: i32) -> PathBuf {
        self.data_dir()
            .join("ArchivosPersonales")
            .join(user_id.to_string())
    }

    pub async fn seed_center(&self, name: &str) -> Center {
        self.store
            .create_center(name)
            .await
            .expect("Failed to seed center")
    }

    pub async fn seed_user(&self, username: &str, password: &str, permissions: &[&str]) -> User {
        self.seed_user_in(username, password, permissions, None).await
    }

    pub async fn seed_user_in(
        &self,
        username: &str,
        password: &str,
        permissions: &[&str],
        center_id: Option<i32>,
    ) -> User {
        let draft = UserDraft {
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            password_hash: hash_password_with_cost(password, TEST_BCRYPT_COST)
                .expect("Failed to hash password"),
            display_name: username.to_string(),
            default_center_id: center_id,
            force_default_center: false,
        };
        let permissions: Vec<String> = permissions.iter().map(ToString::to_string).collect();
        self.store
            .create_user(&draft, &permissions)
            .await
            .expect("Failed to seed user")
    }

    /// A user that may not leave its default center.
    pub async fn seed_pinned_user(&self, username: &str, password: &str, center_id: i32) -> User {
        let draft = UserDraft {
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            password_hash: hash_password_with_cost(password, TEST_BCRYPT_COST)
                .expect("Failed to hash password"),
            display_name: username.to_string(),
            default_center_id: Some(center_id),
            force_default_center: true,
        };
        self.store
            .create_user(&draft, &[])
            .await
            .expect("Failed to seed user")
    }

    /// Inserts a local folder whose directory is `shared_folders/<dir>`.
    pub async fn seed_local_folder(
        &self,
        name: &str,
        dir: &str,
        center_id: Option<i32>,
    ) -> SharedFolder {
        let relative = format!("shared_folders/{dir}");
        std::fs::create_dir_all(self.data_dir().join(&relative))
            .expect("Failed to create folder directory");
        self.store
            .create_folder(&SharedFolderDraft {
                center_id,
                name: name.to_string(),
                description: String::new(),
                folder_type: FolderType::Local,
                local_path: Some(relative),
                cloud_url: None,
            })
            .await
            .expect("Failed to seed folder")
    }

    pub async fn seed_cloud_folder(&self, name: &str, center_id: Option<i32>) -> SharedFolder {
        self.store
            .create_folder(&SharedFolderDraft {
                center_id,
                name: name.to_string(),
                description: String::new(),
                folder_type: FolderType::Cloud,
                local_path: None,
                cloud_url: Some("https://drive.example.test/folder".to_string()),
            })
            .await
            .expect("Failed to seed folder")
    }

    /// Issues a WebDAV token and returns its secret value.
    pub async fn webdav_token(&self, user_id: i32) -> String {
        self.services
            .webdav_tokens
            .issue(user_id, &IssueContext::device("Test client"))
            .await
            .expect("Failed to issue WebDAV token")
            .token
    }

    /// Signs in through `POST /login` and returns the browser cookies.
    pub async fn login(&self, username: &str, password: &str) -> BrowserSession {
        let response = TestRequest::post("/login")
            .form(&[("username", username), ("password", password)])
            .send(&self.service)
            .await
            .assert_status(StatusCode::FOUND)
            .assert_header("Location", "/");
        BrowserSession::from_response(&response)
    }
}

/// Cookies a browser would replay after signing in.
#[derive(Debug, Clone)]
pub struct BrowserSession {
    pub session_token: String,
    pub cookie_header: String,
}

impl BrowserSession {
    #[must_use]
    pub fn from_response(response: &TestResponse) -> Self {
        let session_token = response
            .cookie(SESSION_COOKIE)
            .expect("Session cookie should be set")
            .value()
            .to_string();
        let marker = response
            .cookie(LOGGED_IN_COOKIE)
            .expect("Logged-in cookie should be set")
            .value()
            .to_string();
        Self {
            cookie_header: format!("{SESSION_COOKIE}={session_token}; {LOGGED_IN_COOKIE}={marker}"),
            session_token,
        }
    }
}

/// Basic `Authorization` header value carrying a WebDAV token.
#[must_use]
pub fn basic_auth(username: &str, token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{token}")))
}

/// A request against the in-process service. Headers are kept as strings
/// until [`TestRequest::send`] so tests can write them literally.
pub struct TestRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

macro_rules! verbs {
    ($($ctor:ident => $verb:literal),* $(,)?) => {
        $(
            #[must_use]
            pub fn $ctor(path: &str) -> Self {
                Self::new($verb, path)
            }
        )*
    };
}

impl TestRequest {
    #[must_use]
    pub fn new(verb: &str, path: &str) -> Self {
        Self {
            method: Method::from_bytes(verb.as_bytes()).expect("HTTP method token"),
            path: path.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    verbs! {
        get => "GET",
        head => "HEAD",
        post => "POST",
        put => "PUT",
        delete => "DELETE",
        options => "OPTIONS",
        propfind => "PROPFIND",
        proppatch => "PROPPATCH",
        mkcol => "MKCOL",
        copy => "COPY",
        r#move => "MOVE",
        lock => "LOCK",
        unlock => "UNLOCK",
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Replays the cookies of a signed-in browser.
    #[must_use]
    pub fn session(self, session: &BrowserSession) -> Self {
        self.header("Cookie", &session.cookie_header)
    }

    /// Authenticates as a WebDAV client. The username is ignored by the
    /// server, so any value works.
    #[must_use]
    pub fn token(self, token: &str) -> Self {
        self.header("Authorization", &basic_auth("cliente", token))
    }

    #[must_use]
    pub fn depth(self, depth: &str) -> Self {
        self.header("Depth", depth)
    }

    #[must_use]
    pub fn destination(self, dest: &str) -> Self {
        self.header("Destination", dest)
    }

    #[must_use]
    pub fn overwrite(self, allowed: bool) -> Self {
        self.header("Overwrite", if allowed { "T" } else { "F" })
    }

    /// Untagged `If` list naming one lock token.
    #[must_use]
    pub fn if_header(self, token: &str) -> Self {
        self.header("If", &format!("(<{token}>)"))
    }

    #[must_use]
    pub fn content_type(self, content_type: &str) -> Self {
        self.header("Content-Type", content_type)
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn xml_body(self, xml: &str) -> Self {
        self.content_type("application/xml; charset=utf-8").body(xml)
    }

    #[must_use]
    pub fn form(self, fields: &[(&str, &str)]) -> Self {
        let encoded: Vec<String> = fields
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect();
        self.content_type("application/x-www-form-urlencoded")
            .body(encoded.join("&"))
    }

    pub async fn send(self, service: &Service) -> TestResponse {
        let mut builder = RequestBuilder::new(format!("http://127.0.0.1:5800{}", self.path), self.method);
        for (name, value) in self.headers {
            let name = HeaderName::try_from(name).expect("valid header name");
            builder = builder.add_header(name, value, true);
        }
        if let Some(bytes) = self.body {
            builder = builder.body(ReqBody::Once(bytes.into()));
        }

        let mut response = builder.send(service).await;
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| (name.to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();

        // Set-Cookie headers written directly, not through the cookie jar.
        let mut cookies: Vec<Cookie<'static>> = response.cookies().iter().cloned().collect();
        let raw = headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("set-cookie"))
            .filter_map(|(_, value)| Cookie::parse(value.clone()).ok());
        for cookie in raw {
            if cookies.iter().all(|known| known.name() != cookie.name()) {
                cookies.push(cookie);
            }
        }

        TestResponse {
            status: response.status_code.unwrap_or(StatusCode::OK),
            body: response.take_bytes(None).await.map(|b| b.to_vec()).unwrap_or_default(),
            headers,
            cookies,
        }
    }
}

/// Everything a test inspects about a response. Assertion helpers take and
/// return `self` so they chain.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<Cookie<'static>>,
    pub body: Vec<u8>,
}

impl TestResponse {
    #[track_caller]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(self.status, expected, "body:\n{}", self.body_string());
        self
    }

    #[track_caller]
    fn required_header(&self, name: &str) -> &str {
        self.get_header(name)
            .unwrap_or_else(|| panic!("no {name} header in {:?}", self.headers))
    }

    #[track_caller]
    pub fn assert_header(self, name: &str, expected: &str) -> Self {
        assert_eq!(self.required_header(name), expected, "{name} header");
        self
    }

    #[track_caller]
    pub fn assert_header_contains(self, name: &str, needle: &str) -> Self {
        let value = self.required_header(name);
        assert!(value.contains(needle), "{name}: {value:?} lacks {needle:?}");
        self
    }

    #[track_caller]
    pub fn assert_redirect_starts_with(self, prefix: &str) -> Self {
        let location = self.location().unwrap_or_default();
        assert!(location.starts_with(prefix), "redirected to {location:?}, wanted {prefix:?}...");
        self
    }

    #[track_caller]
    pub fn assert_body_contains(self, needle: &str) -> Self {
        let body = self.body_string();
        assert!(body.contains(needle), "body lacks {needle:?}:\n{body}");
        self
    }

    #[track_caller]
    pub fn assert_body_not_contains(self, needle: &str) -> Self {
        let body = self.body_string();
        assert!(!body.contains(needle), "body has {needle:?}:\n{body}");
        self
    }

    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find_map(|(key, value)| key.eq_ignore_ascii_case(name).then_some(value.as_str()))
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.get_header("Location")
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.cookies.iter().find(|c| c.name() == name)
    }

    /// Number of `D:response` elements in a multistatus body.
    #[must_use]
    pub fn count_multistatus_responses(&self) -> usize {
        self.body_string().matches("<D:response>").count()
    }
}

/// A `D:lockinfo` body for an exclusive write lock.
#[must_use]
pub fn exclusive_lockinfo(owner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<D:lockinfo xmlns:D="DAV:">
  <D:lockscope><D:exclusive/></D:lockscope>
  <D:locktype><D:write/></D:locktype>
  <D:owner><D:href>{owner}</D:href></D:owner>
</D:lockinfo>"#
    )
}

/// A `D:lockinfo` body asking for a shared lock.
#[must_use]
pub fn shared_lockinfo() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8"?>
<D:lockinfo xmlns:D="DAV:">
  <D:lockscope><D:shared/></D:lockscope>
  <D:locktype><D:write/></D:locktype>
</D:lockinfo>"#
}

/// PROPFIND body naming specific DAV properties.
#[must_use]
pub fn propfind_props(props: &[&str]) -> String {
    let props = props
        .iter()
        .map(|name| format!("<D:{name}/>"))
        .collect::<String>();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:"><D:prop>{props}</D:prop></D:propfind>"#
    )
}

/// Extracts the lock token from a `Lock-Token: <...>` header value.
#[must_use]
pub fn lock_token(response: &TestResponse) -> String {
    response
        .get_header("Lock-Token")
        .expect("Lock-Token header should be set")
        .trim_matches(['<', '>'])
        .to_string()
}
