//! GET, HEAD and POST handlers.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};
use tokio_util::io::ReaderStream;

use figaro_rfc::rfc::dav::build::http_date;
use figaro_service::gateway::EntryInfo;

use crate::app::api::dav::util::{DavScope, dav_scope, fs_status, set_header};

/// ## Summary
/// Streams a file, or a plain-text listing for a collection.
///
/// ## Errors
/// Returns 404 for missing or hidden entries.
#[handler]
#[tracing::instrument(skip_all, fields(method = "GET", path = %req.uri().path()))]
pub async fn get(req: &mut Request, res: &mut Response, depot: &Depot) {
    serve(req, res, depot, true).await;
}

/// ## Summary
/// Same as GET without the body.
#[handler]
#[tracing::instrument(skip_all, fields(method = "HEAD", path = %req.uri().path()))]
pub async fn head(req: &mut Request, res: &mut Response, depot: &Depot) {
    serve(req, res, depot, false).await;
}

async fn serve(req: &Request, res: &mut Response, depot: &Depot, with_body: bool) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };
    let fs = &scope.target.mount.fs;
    let path = &scope.target.path;

    let info = match fs.stat(path).await {
        Ok(info) => info,
        Err(e) => {
            res.status_code(fs_status(&e));
            return;
        }
    };

    if info.is_dir {
        serve_listing(&scope, res, with_body).await;
        return;
    }

    let etag = info.etag();
    if if_none_match(req, &etag) {
        set_header(res, "ETag", &etag);
        res.status_code(StatusCode::NOT_MODIFIED);
        return;
    }

    let file = if with_body {
        match fs.open(path).await {
            Ok(file) => Some(file),
            Err(e) => {
                res.status_code(fs_status(&e));
                return;
            }
        }
    } else {
        None
    };

    write_entry_headers(res, &info, &etag);
    res.status_code(StatusCode::OK);
    if let Some(file) = file {
        res.stream(ReaderStream::new(file));
    }
}

fn write_entry_headers(res: &mut Response, info: &EntryInfo, etag: &str) {
    set_header(res, "Content-Type", &info.content_type());
    set_header(res, "Content-Length", &info.len.to_string());
    set_header(res, "Last-Modified", &http_date(info.modified));
    set_header(res, "ETag", etag);
}

async fn serve_listing(scope: &DavScope, res: &mut Response, with_body: bool) {
    let children = match scope.target.mount.fs.list(&scope.target.path).await {
        Ok(children) => children,
        Err(e) => {
            res.status_code(fs_status(&e));
            return;
        }
    };

    let listing = render_listing(&children);
    set_header(res, "Content-Type", "text/plain; charset=utf-8");
    res.status_code(StatusCode::OK);
    if with_body && let Err(e) = res.write_body(listing) {
        tracing::error!("Failed to write response body: {}", e);
    }
}

/// One line per visible child; collections end with `/`.
fn render_listing(children: &[EntryInfo]) -> String {
    let mut out = String::new();
    for child in children {
        out.push_str(child.path.name().unwrap_or_default());
        if child.is_dir {
            out.push('/');
        }
        out.push('\n');
    }
    out
}

/// Whether `If-None-Match` names the current entity tag.
fn if_none_match(req: &Request, etag: &str) -> bool {
    req.headers()
        .get("If-None-Match")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .split(',')
                .map(str::trim)
                .any(|candidate| candidate == etag || candidate == "*")
        })
}
