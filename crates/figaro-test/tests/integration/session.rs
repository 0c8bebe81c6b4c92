#![allow(clippy::unused_async, unused_must_use)]
//! Tests for browser login, sessions and logout.

use chrono::Duration;
use salvo::http::StatusCode;
use salvo::http::cookie::time::Duration as CookieDuration;

use figaro_test::component::auth::login::encode_qr_payload;

use super::helpers::*;

/// ## Summary
/// A password login sets the three cookies for thirty days and lands on `/`.
#[test_log::test(tokio::test)]
async fn password_login_sets_cookies() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &["materiales.view"]).await;

    let response = TestRequest::post("/login")
        .form(&[("username", "ana"), ("password", "p@ss1")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/");

    let session = response.cookie("session_token").expect("session cookie");
    assert!(!session.value().is_empty());
    assert_eq!(session.http_only(), Some(true));
    assert_eq!(session.path(), Some("/"));
    assert_eq!(session.max_age(), Some(CookieDuration::days(30)));

    assert_eq!(response.cookie("loggedin").expect("marker").value(), "yes");
    assert_eq!(response.cookie("username").expect("username").value(), "ana");
}

/// ## Summary
/// The stored session expires thirty days after issue.
#[test_log::test(tokio::test)]
async fn session_lasts_thirty_days() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let browser = app.login("ana", "p@ss1").await;

    let stored = app
        .services
        .sessions
        .lookup(&browser.session_token)
        .await
        .expect("session should resolve");
    assert_eq!(stored.expires_at - stored.created_at, Duration::days(30));
    assert_eq!(stored.device_name, "Web Browser");

    app.clock.advance(Duration::days(29));
    TestRequest::get("/")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    app.clock.advance(Duration::days(1));
    TestRequest::get("/")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/login");
}

/// ## Summary
/// The index reports the identity, its permissions and the session id.
#[test_log::test(tokio::test)]
async fn index_returns_identity() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &["materiales.view"]).await;
    let browser = app.login("ana", "p@ss1").await;

    let response = TestRequest::get("/")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_not_contains("password_hash")
        .assert_body_not_contains(&browser.session_token);

    let json = response.json();
    assert_eq!(json["user"]["username"], "ana");
    assert_eq!(json["permissions"][0], "materiales.view");
    assert!(json["session_id"].as_str().is_some_and(|id| id.len() == 32));
}

/// ## Summary
/// Authentication is touched on every accepted request.
#[test_log::test(tokio::test)]
async fn accepted_request_touches_session() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let browser = app.login("ana", "p@ss1").await;
    let before = app
        .services
        .sessions
        .lookup(&browser.session_token)
        .await
        .expect("session")
        .updated_at;

    app.clock.advance(Duration::hours(2));
    TestRequest::get("/")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let after = app
        .services
        .sessions
        .lookup(&browser.session_token)
        .await
        .expect("session")
        .updated_at;
    assert_eq!(after - before, Duration::hours(2));
}

/// ## Summary
/// Protected routes without a session go to the login page.
#[test_log::test(tokio::test)]
async fn anonymous_index_redirects_to_login() {
    let app = TestApp::new();

    TestRequest::get("/")
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/login");

    TestRequest::get("/perfil")
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/login");
}

/// ## Summary
/// A session token without the `loggedin=yes` marker is not a login.
#[test_log::test(tokio::test)]
async fn session_cookie_requires_marker() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let browser = app.login("ana", "p@ss1").await;

    TestRequest::get("/")
        .header("Cookie", &format!("session_token={}", browser.session_token))
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/login");

    TestRequest::get("/")
        .header(
            "Cookie",
            &format!("session_token={}; loggedin=no", browser.session_token),
        )
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND);
}

/// ## Summary
/// Wrong passwords and unknown users get the same generic message.
#[test_log::test(tokio::test)]
async fn failed_login_is_generic() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;

    let wrong_password = TestRequest::post("/login")
        .form(&[("username", "ana"), ("password", "p@ss2")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/login?error=");

    let unknown_user = TestRequest::post("/login")
        .form(&[("username", "nadie"), ("password", "p@ss1")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND);

    assert_eq!(wrong_password.location(), unknown_user.location());
    assert!(wrong_password.cookie("session_token").is_none());
}

/// ## Summary
/// A form without credentials gets its own message.
#[test_log::test(tokio::test)]
async fn missing_credentials_are_reported() {
    let app = TestApp::new();

    let response = TestRequest::post("/login")
        .form(&[("username", "ana")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/login?error=");

    let location = response.location().unwrap_or_default();
    assert!(location.contains(&urlencoding::encode("Usuario y contraseña requeridos").into_owned()));
}

/// ## Summary
/// A QR payload signs in; a tampered digest does not.
#[test_log::test(tokio::test)]
async fn qr_login() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;

    let payload = encode_qr_payload("ana", "p@ss1");
    TestRequest::post("/login")
        .form(&[("qr_data", &payload)])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/");

    let mut tampered = payload.clone();
    tampered.pop();
    tampered.push(if payload.ends_with('0') { '1' } else { '0' });
    TestRequest::post("/login")
        .form(&[("qr_data", &tampered)])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/login?error=");
}

/// ## Summary
/// Logout deactivates the session and expires the cookies.
#[test_log::test(tokio::test)]
async fn logout_ends_session() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let browser = app.login("ana", "p@ss1").await;

    let response = TestRequest::get("/logout")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/login");
    let cleared = response.cookie("session_token").expect("cleared cookie");
    assert!(cleared.value().is_empty());

    TestRequest::get("/")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/login");
}

/// ## Summary
/// "Close all other sessions" keeps only the current device signed in.
#[test_log::test(tokio::test)]
async fn logout_all_other_sessions() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let laptop = app.login("ana", "p@ss1").await;
    let phone = app.login("ana", "p@ss1").await;

    TestRequest::post("/perfil")
        .session(&phone)
        .form(&[("action", "logout_all_sessions")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/perfil?success=");

    TestRequest::get("/")
        .session(&laptop)
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND);
    TestRequest::get("/")
        .session(&phone)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// The profile lists sessions without their secret tokens.
#[test_log::test(tokio::test)]
async fn profile_lists_sessions() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let first = app.login("ana", "p@ss1").await;
    let second = app.login("ana", "p@ss1").await;

    let response = TestRequest::get("/perfil")
        .session(&second)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_not_contains(&first.session_token)
        .assert_body_not_contains(&second.session_token);

    let json = response.json();
    assert_eq!(json["sessions"].as_array().map(Vec::len), Some(2));
    assert!(json["current_session_id"].is_string());
}

/// ## Summary
/// A user cannot close somebody else's session.
#[test_log::test(tokio::test)]
async fn closing_foreign_session_has_no_effect() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    app.seed_user("luis", "clave", &[]).await;
    let ana = app.login("ana", "p@ss1").await;
    let luis = app.login("luis", "clave").await;

    let ana_session_id = TestRequest::get("/")
        .session(&ana)
        .send(&app.service)
        .await
        .json()["session_id"]
        .as_str()
        .expect("session id")
        .to_string();

    TestRequest::post("/perfil")
        .session(&luis)
        .form(&[("action", "logout_session"), ("session_id", &ana_session_id)])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/perfil?success=");

    TestRequest::get("/")
        .session(&ana)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// The healthcheck needs no session.
#[test_log::test(tokio::test)]
async fn healthcheck_is_public() {
    let app = TestApp::new();
    let response = TestRequest::get("/healthcheck")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.body_string(), "OK");
}
