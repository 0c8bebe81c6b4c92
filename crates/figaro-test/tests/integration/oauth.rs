#![allow(clippy::unused_async, unused_must_use)]
//! Tests for the Google OAuth sign-in bridge.

use salvo::http::StatusCode;
use salvo::http::cookie::time::Duration as CookieDuration;

use figaro_test::component::db::store::UserStore;

use super::helpers::*;

/// Starts a sign-in and returns the state the browser would carry back.
async fn begin(app: &TestApp) -> String {
    let response = TestRequest::get("/auth/google")
        .send(&app.service)
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
    response
        .cookie("oauth_state")
        .expect("state cookie")
        .value()
        .to_string()
}

fn callback(state: &str, cookie_state: &str) -> TestRequest {
    TestRequest::get(&format!("/auth/google/callback?state={state}&code=auth-code"))
        .header("Cookie", &format!("oauth_state={cookie_state}"))
}

/// ## Summary
/// Begin redirects to the provider with a state mirrored in a cookie.
#[test_log::test(tokio::test)]
async fn begin_redirects_with_state() {
    let app = TestApp::new();

    let response = TestRequest::get("/auth/google")
        .send(&app.service)
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT)
        .assert_redirect_starts_with(TEST_AUTHORIZE_URL);

    let cookie = response.cookie("oauth_state").expect("state cookie");
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(300)));

    let location = response.location().expect("location");
    assert!(location.contains(&format!("state={}", cookie.value())));
    assert!(location.contains("client_id=client-id"));
    assert!(location.contains(&format!(
        "redirect_uri={}",
        urlencoding::encode(TEST_REDIRECT_URL)
    )));
}

/// ## Summary
/// A state that does not match the cookie never reaches the provider.
#[test_log::test(tokio::test)]
async fn state_mismatch_is_rejected() {
    let app = TestApp::new();
    app.provider.answer_with("nuevo@example.com", "Nuevo");
    let state = begin(&app).await;

    let response = callback("forged", &state)
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/login?error=");
    assert_eq!(app.provider.calls(), 0);
    assert!(response.cookie("session_token").is_none());

    // Callback without any cookie
    TestRequest::get(&format!("/auth/google/callback?state={state}&code=auth-code"))
        .send(&app.service)
        .await
        .assert_redirect_starts_with("/login?error=");
    assert_eq!(app.provider.calls(), 0);
}

/// ## Summary
/// First sign-in provisions a read-only account and a session.
#[test_log::test(tokio::test)]
async fn first_sign_in_provisions_user() {
    let app = TestApp::new();
    app.provider.answer_with("marta.ruiz@example.com", "Marta Ruiz");
    let state = begin(&app).await;

    let response = callback(&state, &state)
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/");
    assert_eq!(app.provider.calls(), 1);

    let state_cookie = response.cookie("oauth_state").expect("cleared state cookie");
    assert!(state_cookie.value().is_empty());

    let user = app
        .store
        .find_user_by_email("marta.ruiz@example.com")
        .await
        .expect("lookup")
        .expect("provisioned user");
    assert_eq!(user.username, "marta.ruiz");
    assert_eq!(user.display_name, "Marta Ruiz");

    let browser = BrowserSession::from_response(&response);
    let json = TestRequest::get("/")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(json["user"]["username"], "marta.ruiz");
    let permissions = json["permissions"].as_array().expect("permissions");
    assert!(permissions.iter().any(|p| p == "materiales.view"));
    assert!(!permissions.iter().any(|p| p == "ADMIN"));
}

/// ## Summary
/// A returning account reuses the existing user.
#[test_log::test(tokio::test)]
async fn returning_account_reuses_user() {
    let app = TestApp::new();
    let existing = app.seed_user("ana", "p@ss1", &["ADMIN"]).await;
    app.provider.answer_with("ana@example.com", "Ana");
    let state = begin(&app).await;

    let response = callback(&state, &state)
        .send(&app.service)
        .await
        .assert_header("Location", "/");

    let browser = BrowserSession::from_response(&response);
    let json = TestRequest::get("/")
        .session(&browser)
        .send(&app.service)
        .await
        .json();
    assert_eq!(json["user"]["id"], existing.id);
    assert_eq!(json["permissions"][0], "ADMIN");
}

/// ## Summary
/// Accounts outside the hosted domain are refused before provisioning.
#[test_log::test(tokio::test)]
async fn hosted_domain_is_enforced() {
    let app = TestApp::with_settings(|settings| {
        settings.oauth.hosted_domain = Some("colegio.example".to_string());
    });
    app.provider.answer_with("intruso@gmail.example", "Intruso");
    let state = begin(&app).await;

    callback(&state, &state)
        .send(&app.service)
        .await
        .assert_redirect_starts_with("/login?error=");

    assert!(
        app.store
            .find_user_by_email("intruso@gmail.example")
            .await
            .expect("lookup")
            .is_none()
    );
}

/// ## Summary
/// A denied exchange sends the browser back to the login page.
#[test_log::test(tokio::test)]
async fn provider_denial_is_reported() {
    let app = TestApp::new();
    let state = begin(&app).await;

    callback(&state, &state)
        .send(&app.service)
        .await
        .assert_redirect_starts_with("/login?error=");
    assert_eq!(app.provider.calls(), 1);
}

/// ## Summary
/// With OAuth disabled both endpoints answer with a login error.
#[test_log::test(tokio::test)]
async fn disabled_oauth_redirects_to_login() {
    let app = TestApp::with_settings(|settings| settings.oauth.enabled = false);

    let response = TestRequest::get("/auth/google")
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/login?error=");
    assert!(response.cookie("oauth_state").is_none());

    callback("x", "x")
        .send(&app.service)
        .await
        .assert_redirect_starts_with("/login?error=");
    assert_eq!(app.provider.calls(), 0);
}
