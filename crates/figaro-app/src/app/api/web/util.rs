//! Helpers shared by the browser handlers.

use salvo::http::cookie::Cookie;
use salvo::http::cookie::time::Duration;
use salvo::writing::Redirect;
use salvo::{Request, Response};

use figaro_core::constants::{
    CREDENTIAL_LIFETIME_DAYS, LOGGED_IN_COOKIE, LOGGED_IN_MARKER, OAUTH_STATE_COOKIE,
    OAUTH_STATE_TTL_SECS, SESSION_COOKIE, USERNAME_COOKIE,
};
use figaro_service::credential::IssueContext;

/// Serializable error body for JSON failures.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// ## Summary
/// Redirects with `302` to `route?key=<message>`, URL-encoding the message.
pub fn redirect_with(res: &mut Response, route: &str, key: &str, message: &str) {
    res.render(Redirect::found(format!(
        "{route}?{key}={}",
        urlencoding::encode(message)
    )));
}

/// Describes the requesting browser for a new session.
pub fn issue_context(req: &Request, device_name: &str) -> IssueContext {
    let ip_address = req
        .remote_addr()
        .clone()
        .into_std()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default();
    let user_agent = req
        .headers()
        .get("User-Agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    IssueContext {
        device_name: device_name.to_string(),
        ip_address,
        user_agent,
    }
}

fn cookie(name: &'static str, value: String, max_age: Duration, http_only: bool, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// ## Summary
/// Sets the session, username and logged-in cookies for a fresh login.
pub fn set_login_cookies(res: &mut Response, session_token: &str, username: &str, secure: bool) {
    let lifetime = Duration::days(CREDENTIAL_LIFETIME_DAYS);
    res.add_cookie(cookie(SESSION_COOKIE, session_token.to_string(), lifetime, true, secure));
    res.add_cookie(cookie(USERNAME_COOKIE, username.to_string(), lifetime, false, secure));
    res.add_cookie(cookie(
        LOGGED_IN_COOKIE,
        LOGGED_IN_MARKER.to_string(),
        lifetime,
        false,
        secure,
    ));
}

/// Expires the three login cookies.
pub fn clear_login_cookies(res: &mut Response) {
    for name in [SESSION_COOKIE, USERNAME_COOKIE, LOGGED_IN_COOKIE] {
        res.add_cookie(cookie(name, String::new(), Duration::ZERO, name == SESSION_COOKIE, false));
    }
}

pub fn set_oauth_state_cookie(res: &mut Response, state: &str, secure: bool) {
    res.add_cookie(cookie(
        OAUTH_STATE_COOKIE,
        state.to_string(),
        Duration::seconds(OAUTH_STATE_TTL_SECS),
        true,
        secure,
    ));
}

pub fn clear_oauth_state_cookie(res: &mut Response) {
    res.add_cookie(cookie(OAUTH_STATE_COOKIE, String::new(), Duration::ZERO, true, false));
}
