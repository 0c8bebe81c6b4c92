/// Route component constants shared across crates
pub const DAV_ROUTE_COMPONENT: &str = "dav";
pub const DAV_ROUTE_PREFIX: &str = const_str::concat!("/", DAV_ROUTE_COMPONENT);

pub const PERSONAL_MOUNT_COMPONENT: &str = "MisArchivos";
pub const PERSONAL_MOUNT_PREFIX: &str =
    const_str::concat!(DAV_ROUTE_PREFIX, "/", PERSONAL_MOUNT_COMPONENT);

pub const SHARED_MOUNT_COMPONENT: &str = "CarpetasCompartidas";
pub const SHARED_MOUNT_PREFIX: &str =
    const_str::concat!(DAV_ROUTE_PREFIX, "/", SHARED_MOUNT_COMPONENT);

pub const LOGIN_ROUTE: &str = "/login";
pub const LOGOUT_ROUTE: &str = "/logout";
pub const PROFILE_ROUTE: &str = "/perfil";
pub const CENTER_ROUTE: &str = "/elegir_centro";
pub const SHARED_FOLDERS_ROUTE: &str = "/carpetas-compartidas";
pub const OAUTH_BEGIN_ROUTE: &str = "/auth/google";
pub const OAUTH_CALLBACK_ROUTE: &str = const_str::concat!(OAUTH_BEGIN_ROUTE, "/callback");

/// Storage directories under `storage.data_dir`
pub const PERSONAL_STORAGE_DIR: &str = "ArchivosPersonales";
pub const SHARED_STORAGE_DIR: &str = "shared_folders";
pub const SHARED_LOCAL_PREFIX: &str = "shared_local_";

/// Cookie names
pub const SESSION_COOKIE: &str = "session_token";
pub const USERNAME_COOKIE: &str = "username";
pub const LOGGED_IN_COOKIE: &str = "loggedin";
pub const LOGGED_IN_MARKER: &str = "yes";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

pub const SUPERUSER_PERMISSION: &str = "ADMIN";
pub const CREDENTIAL_LIFETIME_DAYS: i64 = 30;
pub const OAUTH_STATE_TTL_SECS: i64 = 300;
pub const WEBDAV_REALM: &str = "Figaro WebDAV";

pub const WEB_DEVICE_NAME: &str = "Web Browser";
pub const OAUTH_DEVICE_NAME: &str = "Google OAuth";

/// Permissions granted to accounts created through OAuth
pub const OAUTH_DEFAULT_PERMISSIONS: &[&str] = &["materiales.view", "actividades.view"];

pub const PERMISSION_DENIED_FLASH: &str = "No tienes permiso para acceder a esta página";
