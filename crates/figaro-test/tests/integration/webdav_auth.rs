#![allow(clippy::unused_async, unused_must_use)]
//! Tests for WebDAV Basic authentication and token management.

use chrono::Duration;
use salvo::http::StatusCode;

use figaro_test::component::credential::IssueContext;

use super::helpers::*;

const ROOT: &str = "/dav/MisArchivos/";

/// ## Summary
/// Requests without credentials get a Basic challenge.
#[test_log::test(tokio::test)]
async fn missing_credentials_are_challenged() {
    let app = TestApp::new();

    TestRequest::propfind(ROOT)
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_header("WWW-Authenticate", "Basic realm=\"Figaro WebDAV\"");

    TestRequest::get("/dav/CarpetasCompartidas/Recursos/")
        .header("Authorization", "Bearer something")
        .send(&app.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// Undecodable Basic credentials are challenged, never a server error.
#[test_log::test(tokio::test)]
async fn malformed_basic_header_is_challenged() {
    let app = TestApp::new();

    for header in ["Basic !!!", "Basic ", "Basic c29sb3Vubw=="] {
        TestRequest::propfind(ROOT)
            .header("Authorization", header)
            .depth("0")
            .send(&app.service)
            .await
            .assert_status(StatusCode::UNAUTHORIZED)
            .assert_header_contains("WWW-Authenticate", "Figaro WebDAV");
    }
}

/// ## Summary
/// The Basic password must be a WebDAV token; the username is ignored.
#[test_log::test(tokio::test)]
async fn token_is_the_password() {
    let app = TestApp::new();
    let user = app.seed_user("ana", "p@ss1", &[]).await;
    let token = app.webdav_token(user.id).await;

    TestRequest::propfind(ROOT)
        .header("Authorization", &basic_auth("cualquiera", &token))
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS);

    TestRequest::propfind(ROOT)
        .header("Authorization", &basic_auth("ana", "p@ss1"))
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// Browser session tokens are not valid WebDAV credentials.
#[test_log::test(tokio::test)]
async fn session_token_is_not_accepted() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let browser = app.login("ana", "p@ss1").await;

    TestRequest::propfind(ROOT)
        .token(&browser.session_token)
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// Tokens stop working once revoked or expired.
#[test_log::test(tokio::test)]
async fn revoked_and_expired_tokens_fail() {
    let app = TestApp::new();
    let user = app.seed_user("ana", "p@ss1", &[]).await;
    let issued = app
        .services
        .webdav_tokens
        .issue(user.id, &IssueContext::device("Portátil"))
        .await
        .expect("issue");

    app.services
        .webdav_tokens
        .revoke(&issued.id, user.id)
        .await
        .expect("revoke");
    TestRequest::propfind(ROOT)
        .token(&issued.token)
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let token = app.webdav_token(user.id).await;
    app.clock.advance(Duration::days(31));
    TestRequest::propfind(ROOT)
        .token(&token)
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// Revoking someone else's token through the profile does nothing.
#[test_log::test(tokio::test)]
async fn revoke_is_owner_scoped() {
    let app = TestApp::new();
    let ana = app.seed_user("ana", "p@ss1", &[]).await;
    app.seed_user("luis", "clave", &[]).await;
    let issued = app
        .services
        .webdav_tokens
        .issue(ana.id, &IssueContext::device("Portátil"))
        .await
        .expect("issue");
    let luis = app.login("luis", "clave").await;

    TestRequest::post(&format!("/perfil/webdav/revocar/{}", issued.id))
        .session(&luis)
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/perfil/webdav?success=");

    TestRequest::propfind(ROOT)
        .token(&issued.token)
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS);
}

/// ## Summary
/// Tokens created from the profile are listed and usable.
#[test_log::test(tokio::test)]
async fn create_list_and_revoke_from_profile() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let browser = app.login("ana", "p@ss1").await;

    TestRequest::post("/perfil/webdav/crear")
        .session(&browser)
        .form(&[("device_name", "Móvil")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/perfil/webdav?success=");

    let json = TestRequest::get("/perfil/webdav")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let tokens = json["tokens"].as_array().expect("tokens");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0]["device_name"], "Móvil");
    assert_eq!(json["personal_url"], "http://127.0.0.1:5800/dav/MisArchivos/");
    assert_eq!(
        json["shared_url"],
        "http://127.0.0.1:5800/dav/CarpetasCompartidas/"
    );

    let secret = tokens[0]["token"].as_str().expect("token value").to_string();
    let id = tokens[0]["id"].as_str().expect("token id").to_string();
    TestRequest::propfind(ROOT)
        .token(&secret)
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS);

    TestRequest::post(&format!("/perfil/webdav/revocar/{id}"))
        .session(&browser)
        .send(&app.service)
        .await
        .assert_redirect_starts_with("/perfil/webdav?success=");
    TestRequest::propfind(ROOT)
        .token(&secret)
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// A token needs a device name.
#[test_log::test(tokio::test)]
async fn device_name_is_required() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &[]).await;
    let browser = app.login("ana", "p@ss1").await;

    TestRequest::post("/perfil/webdav/crear")
        .session(&browser)
        .form(&[("device_name", "   ")])
        .send(&app.service)
        .await
        .assert_redirect_starts_with("/perfil/webdav?error=");

    let json = TestRequest::get("/perfil/webdav")
        .session(&browser)
        .send(&app.service)
        .await
        .json();
    assert!(json["tokens"].as_array().is_some_and(Vec::is_empty));
}

/// ## Summary
/// The token management pages need a browser session.
#[test_log::test(tokio::test)]
async fn token_pages_need_session() {
    let app = TestApp::new();

    TestRequest::get("/perfil/webdav")
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/login");
}
