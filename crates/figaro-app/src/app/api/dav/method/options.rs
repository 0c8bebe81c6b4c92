//! OPTIONS on any WebDAV path.

use salvo::http::StatusCode;
use salvo::http::header::{ALLOW, HeaderName, HeaderValue};
use salvo::{Request, Response, handler};

const ALLOWED_METHODS: &str =
    "OPTIONS, GET, HEAD, POST, PUT, DELETE, MKCOL, COPY, MOVE, PROPFIND, PROPPATCH, LOCK, UNLOCK";

/// ## Summary
/// Advertises DAV classes 1 and 2 and the methods above. `MS-Author-Via`
/// makes Windows' Web Folders client treat the share as writable.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn options(req: &mut Request, res: &mut Response) {
    let headers = res.headers_mut();
    headers.insert(HeaderName::from_static("dav"), HeaderValue::from_static("1, 2"));
    headers.insert(HeaderName::from_static("ms-author-via"), HeaderValue::from_static("DAV"));
    headers.insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    res.status_code(StatusCode::OK);
}
