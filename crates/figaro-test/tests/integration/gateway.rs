#![allow(clippy::unused_async, unused_must_use)]
//! Tests for the WebDAV file gateway on personal and shared mounts.

use salvo::http::StatusCode;

use super::helpers::*;

const ROOT: &str = "/dav/MisArchivos";

/// App with one user and a WebDAV token for them.
async fn personal_app() -> (TestApp, i32, String) {
    let app = TestApp::new();
    let user = app.seed_user("ana", "p@ss1", &["materiales.view"]).await;
    let token = app.webdav_token(user.id).await;
    (app, user.id, token)
}

/// ## Summary
/// MKCOL, PUT, GET and PROPFIND round trip on the personal mount.
#[test_log::test(tokio::test)]
async fn personal_round_trip() {
    let (app, user_id, token) = personal_app().await;

    TestRequest::mkcol(&format!("{ROOT}/apuntes"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::put(&format!("{ROOT}/apuntes/tema%201.txt"))
        .token(&token)
        .content_type("text/plain")
        .body("hola mundo")
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    let response = TestRequest::get(&format!("{ROOT}/apuntes/tema%201.txt"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header_contains("Content-Type", "text/plain");
    assert_eq!(response.body_string(), "hola mundo");
    assert!(response.get_header("ETag").is_some());

    let response = TestRequest::propfind(&format!("{ROOT}/apuntes/"))
        .token(&token)
        .depth("1")
        .xml_body(&propfind_props(&["displayname", "getcontentlength", "resourcetype"]))
        .send(&app.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("<D:href>/dav/MisArchivos/apuntes/</D:href>")
        .assert_body_contains("<D:href>/dav/MisArchivos/apuntes/tema%201.txt</D:href>")
        .assert_body_contains("<D:getcontentlength>10</D:getcontentlength>");
    assert_eq!(response.count_multistatus_responses(), 2);

    // Stored under the user's personal directory
    assert!(app.personal_dir(user_id).join("apuntes/tema 1.txt").is_file());
}

/// ## Summary
/// Files dropped on disk are served whole even past the upload limit.
#[test_log::test(tokio::test)]
async fn large_file_is_served_whole() {
    let (app, user_id, token) = personal_app().await;
    let size = usize::try_from(app.settings.storage.max_upload_size).expect("size") * 2 + 7;
    let contents: Vec<u8> = (0..size).map(|i| u8::try_from(i % 251).expect("byte")).collect();
    std::fs::create_dir_all(app.personal_dir(user_id)).expect("mkdir");
    std::fs::write(app.personal_dir(user_id).join("video.bin"), &contents).expect("write");

    let response = TestRequest::get(&format!("{ROOT}/video.bin"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("Content-Length", &size.to_string());
    assert!(response.get_header("ETag").is_some());
    assert_eq!(response.body, contents);

    TestRequest::head(&format!("{ROOT}/video.bin"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("Content-Length", &size.to_string());
}

/// ## Summary
/// PUT answers 201 on create and 204 on replace.
#[test_log::test(tokio::test)]
async fn put_create_then_replace() {
    let (app, _, token) = personal_app().await;
    let path = format!("{ROOT}/nota.txt");

    TestRequest::put(&path)
        .token(&token)
        .body("uno")
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);
    TestRequest::put(&path)
        .token(&token)
        .body("dos")
        .send(&app.service)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = TestRequest::get(&path)
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.body_string(), "dos");
}

/// ## Summary
/// Dot-files are neither listed nor served.
#[test_log::test(tokio::test)]
async fn hidden_entries_are_invisible() {
    let (app, user_id, token) = personal_app().await;
    let dir = app.personal_dir(user_id);
    std::fs::create_dir_all(&dir).expect("personal dir");
    std::fs::write(dir.join(".secret"), "oculto").expect("write hidden");
    std::fs::write(dir.join("notes.txt"), "visible").expect("write visible");

    TestRequest::propfind(&format!("{ROOT}/"))
        .token(&token)
        .depth("1")
        .send(&app.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("notes.txt")
        .assert_body_not_contains(".secret");

    TestRequest::get(&format!("{ROOT}/.secret"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    TestRequest::get(&format!("{ROOT}/"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("notes.txt")
        .assert_body_not_contains(".secret");
}

/// ## Summary
/// Dot-names cannot be created through MKCOL, COPY or MOVE.
#[test_log::test(tokio::test)]
async fn hidden_names_cannot_be_created() {
    let (app, user_id, token) = personal_app().await;
    let dir = app.personal_dir(user_id);
    std::fs::create_dir_all(&dir).expect("personal dir");
    std::fs::write(dir.join("notes.txt"), "visible").expect("write visible");

    TestRequest::mkcol(&format!("{ROOT}/.hidden/"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    TestRequest::copy(&format!("{ROOT}/notes.txt"))
        .token(&token)
        .destination(&format!("{ROOT}/.x"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    TestRequest::r#move(&format!("{ROOT}/notes.txt"))
        .token(&token)
        .destination(&format!("{ROOT}/.x"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert!(!dir.join(".hidden").exists());
    assert!(!dir.join(".x").exists());
    assert!(dir.join("notes.txt").is_file());
}

/// ## Summary
/// An infinite-depth PROPFIND skips hidden subtrees entirely.
#[test_log::test(tokio::test)]
async fn infinite_propfind_skips_hidden_subtrees() {
    let (app, user_id, token) = personal_app().await;
    let dir = app.personal_dir(user_id);
    std::fs::create_dir_all(dir.join("curso/tema1")).expect("visible tree");
    std::fs::create_dir_all(dir.join(".git/objects")).expect("hidden tree");
    std::fs::create_dir_all(dir.join("curso/.cache")).expect("nested hidden");
    std::fs::write(dir.join("curso/tema1/a.txt"), "a").expect("write");
    std::fs::write(dir.join(".git/objects/blob"), "b").expect("write");
    std::fs::write(dir.join("curso/.cache/c"), "c").expect("write");

    let response = TestRequest::propfind(&format!("{ROOT}/"))
        .token(&token)
        .depth("infinity")
        .send(&app.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/dav/MisArchivos/curso/tema1/a.txt")
        .assert_body_not_contains(".git")
        .assert_body_not_contains("blob")
        .assert_body_not_contains(".cache");
    // Root, curso, tema1 and a.txt
    assert_eq!(response.count_multistatus_responses(), 4);
}

/// ## Summary
/// Encoded `..` segments cannot climb out of the mount.
#[test_log::test(tokio::test)]
async fn traversal_is_rejected() {
    let (app, _, token) = personal_app().await;

    TestRequest::get(&format!("{ROOT}/..%2F..%2F..%2Fetc%2Fpasswd"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::put(&format!("{ROOT}/..%2Fotro%2Fx.txt"))
        .token(&token)
        .body("x")
        .send(&app.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

/// ## Summary
/// Each user only sees their own personal directory.
#[test_log::test(tokio::test)]
async fn personal_mounts_are_per_user() {
    let (app, _, ana_token) = personal_app().await;
    let luis = app.seed_user("luis", "clave", &[]).await;
    let luis_token = app.webdav_token(luis.id).await;

    TestRequest::put(&format!("{ROOT}/privado.txt"))
        .token(&ana_token)
        .body("de ana")
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::get(&format!("{ROOT}/privado.txt"))
        .token(&luis_token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// ## Summary
/// MKCOL needs an existing parent and a free name.
#[test_log::test(tokio::test)]
async fn mkcol_conflicts() {
    let (app, _, token) = personal_app().await;

    TestRequest::mkcol(&format!("{ROOT}/a/b"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::CONFLICT);

    TestRequest::mkcol(&format!("{ROOT}/a"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);
    TestRequest::mkcol(&format!("{ROOT}/a"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

/// ## Summary
/// DELETE removes a collection with its contents.
#[test_log::test(tokio::test)]
async fn delete_removes_tree() {
    let (app, _, token) = personal_app().await;

    TestRequest::mkcol(&format!("{ROOT}/viejo"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);
    TestRequest::put(&format!("{ROOT}/viejo/a.txt"))
        .token(&token)
        .body("a")
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::delete(&format!("{ROOT}/viejo"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    TestRequest::get(&format!("{ROOT}/viejo/a.txt"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// ## Summary
/// COPY duplicates; MOVE honours `Overwrite: F`.
#[test_log::test(tokio::test)]
async fn copy_and_move() {
    let (app, _, token) = personal_app().await;
    let origin = "http://127.0.0.1:5800";

    TestRequest::put(&format!("{ROOT}/a.txt"))
        .token(&token)
        .body("contenido")
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::copy(&format!("{ROOT}/a.txt"))
        .token(&token)
        .destination(&format!("{origin}{ROOT}/b.txt"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::r#move(&format!("{ROOT}/a.txt"))
        .token(&token)
        .destination(&format!("{ROOT}/b.txt"))
        .overwrite(false)
        .send(&app.service)
        .await
        .assert_status(StatusCode::PRECONDITION_FAILED);

    TestRequest::r#move(&format!("{ROOT}/a.txt"))
        .token(&token)
        .destination(&format!("{origin}{ROOT}/c.txt"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::get(&format!("{ROOT}/a.txt"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let moved = TestRequest::get(&format!("{ROOT}/c.txt"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(moved.body_string(), "contenido");
}

/// ## Summary
/// A destination outside the mount is refused.
#[test_log::test(tokio::test)]
async fn copy_outside_mount_is_refused() {
    let (app, _, token) = personal_app().await;

    TestRequest::put(&format!("{ROOT}/a.txt"))
        .token(&token)
        .body("x")
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::copy(&format!("{ROOT}/a.txt"))
        .token(&token)
        .destination("/dav/CarpetasCompartidas/Recursos/a.txt")
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}

/// ## Summary
/// Uploads above the configured limit are refused.
#[test_log::test(tokio::test)]
async fn oversized_put_is_refused() {
    let app = TestApp::with_settings(|settings| settings.storage.max_upload_size = 16);
    let user = app.seed_user("ana", "p@ss1", &[]).await;
    let token = app.webdav_token(user.id).await;

    TestRequest::put(&format!("{ROOT}/grande.bin"))
        .token(&token)
        .body(vec![b'x'; 64])
        .send(&app.service)
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    TestRequest::get(&format!("{ROOT}/grande.bin"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// ## Summary
/// PROPPATCH refuses every property with 403 inside a 207.
#[test_log::test(tokio::test)]
async fn proppatch_is_refused() {
    let (app, _, token) = personal_app().await;

    TestRequest::put(&format!("{ROOT}/a.txt"))
        .token(&token)
        .body("x")
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::proppatch(&format!("{ROOT}/a.txt"))
        .token(&token)
        .xml_body(
            r#"<?xml version="1.0" encoding="utf-8"?>
<D:propertyupdate xmlns:D="DAV:">
  <D:set><D:prop><D:displayname>Nuevo</D:displayname></D:prop></D:set>
</D:propertyupdate>"#,
        )
        .send(&app.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("HTTP/1.1 403");
}

/// ## Summary
/// OPTIONS advertises class 2 to authenticated clients.
#[test_log::test(tokio::test)]
async fn options_advertises_dav() {
    let (app, _, token) = personal_app().await;

    TestRequest::options(&format!("{ROOT}/"))
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("DAV", "1, 2")
        .assert_header_contains("Allow", "PROPFIND");
}

/// ## Summary
/// OPTIONS authenticates and resolves the mount like any other method.
#[test_log::test(tokio::test)]
async fn options_needs_credentials_and_a_mount() {
    let (app, _, token) = personal_app().await;
    app.seed_cloud_folder("Drive", None).await;

    TestRequest::options(&format!("{ROOT}/"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_header("WWW-Authenticate", "Basic realm=\"Figaro WebDAV\"");

    for folder in ["Nada", "Drive"] {
        TestRequest::options(&format!("/dav/CarpetasCompartidas/{folder}/"))
            .token(&token)
            .send(&app.service)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

/// ## Summary
/// A local shared folder is readable and writable through its mount.
#[test_log::test(tokio::test)]
async fn shared_folder_round_trip() {
    let (app, _, token) = personal_app().await;
    app.seed_local_folder("Recursos", "recursos", None).await;

    TestRequest::put("/dav/CarpetasCompartidas/Recursos/guia.txt")
        .token(&token)
        .body("guia")
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED);

    assert!(app.data_dir().join("shared_folders/recursos/guia.txt").is_file());

    TestRequest::propfind("/dav/CarpetasCompartidas/Recursos/")
        .token(&token)
        .depth("1")
        .send(&app.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/dav/CarpetasCompartidas/Recursos/guia.txt");
}

/// ## Summary
/// Cloud folders are catalog entries only; the gateway answers 404.
#[test_log::test(tokio::test)]
async fn cloud_folder_is_not_served() {
    let (app, _, token) = personal_app().await;
    app.seed_cloud_folder("Drive", None).await;

    TestRequest::get("/dav/CarpetasCompartidas/Drive/")
        .token(&token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// ## Summary
/// A center's folder shadows a global folder with the same name.
#[test_log::test(tokio::test)]
async fn center_folder_wins_name_tie() {
    let app = TestApp::new();
    let center = app.seed_center("Centro Norte").await;
    app.seed_local_folder("Recursos", "global_recursos", None).await;
    app.seed_local_folder("Recursos", "norte_recursos", Some(center.id)).await;
    std::fs::write(
        app.data_dir().join("shared_folders/global_recursos/origen.txt"),
        "global",
    )
    .expect("write");
    std::fs::write(
        app.data_dir().join("shared_folders/norte_recursos/origen.txt"),
        "centro",
    )
    .expect("write");

    let member = app.seed_user_in("ana", "p@ss1", &[], Some(center.id)).await;
    let outsider = app.seed_user("luis", "clave", &[]).await;
    let member_token = app.webdav_token(member.id).await;
    let outsider_token = app.webdav_token(outsider.id).await;

    let response = TestRequest::get("/dav/CarpetasCompartidas/Recursos/origen.txt")
        .token(&member_token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.body_string(), "centro");

    let response = TestRequest::get("/dav/CarpetasCompartidas/Recursos/origen.txt")
        .token(&outsider_token)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.body_string(), "global");
}

/// ## Summary
/// Another center's folder does not exist for outsiders.
#[test_log::test(tokio::test)]
async fn foreign_center_folder_is_hidden() {
    let app = TestApp::new();
    let center = app.seed_center("Centro Sur").await;
    app.seed_local_folder("Privada", "privada", Some(center.id)).await;
    let outsider = app.seed_user("luis", "clave", &[]).await;
    let token = app.webdav_token(outsider.id).await;

    TestRequest::propfind("/dav/CarpetasCompartidas/Privada/")
        .token(&token)
        .depth("0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
