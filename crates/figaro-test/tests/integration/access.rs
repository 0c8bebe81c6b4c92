#![allow(clippy::unused_async, unused_must_use)]
//! Tests for capability checks on browser routes.

use salvo::http::StatusCode;

use super::helpers::*;

/// ## Summary
/// A viewer is bounced from admin actions with the permission flash.
#[test_log::test(tokio::test)]
async fn viewer_cannot_create_folders() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &["materiales.view"]).await;
    let browser = app.login("ana", "p@ss1").await;

    TestRequest::post("/carpetas-compartidas/crear")
        .session(&browser)
        .form(&[("nombre", "Fotos"), ("tipo", "local"), ("is_global", "on")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_redirect_starts_with("/?flash=No%20tienes%20permiso");

    assert!(
        !app.data_dir()
            .join("shared_folders/shared_local_global_Fotos")
            .exists()
    );
}

/// ## Summary
/// `ADMIN` passes every capability check.
#[test_log::test(tokio::test)]
async fn admin_can_create_folders() {
    let app = TestApp::new();
    app.seed_user("root", "s3cret", &["ADMIN"]).await;
    let browser = app.login("root", "s3cret").await;

    TestRequest::post("/carpetas-compartidas/crear")
        .session(&browser)
        .form(&[("nombre", "Fotos"), ("tipo", "local"), ("is_global", "on")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/carpetas-compartidas");
}

/// ## Summary
/// The capability gate runs after the session check.
#[test_log::test(tokio::test)]
async fn anonymous_admin_action_goes_to_login() {
    let app = TestApp::new();

    TestRequest::post("/carpetas-compartidas/eliminar/1")
        .send(&app.service)
        .await
        .assert_status(StatusCode::FOUND)
        .assert_header("Location", "/login");
}

/// ## Summary
/// Listing folders only needs a session.
#[test_log::test(tokio::test)]
async fn viewer_can_list_folders() {
    let app = TestApp::new();
    app.seed_user("ana", "p@ss1", &["materiales.view"]).await;
    app.seed_local_folder("Recursos", "recursos", None).await;
    let browser = app.login("ana", "p@ss1").await;

    TestRequest::get("/carpetas-compartidas")
        .session(&browser)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("Recursos");
}
