//! PROPFIND method handler.

use chrono::{DateTime, Utc};
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use figaro_rfc::rfc::dav::build::{lockdiscovery_fragment, serialize_multistatus, supportedlock_fragment};
use figaro_rfc::rfc::dav::core::{
    DavProperty, Depth, Href, Multistatus, PropertyName, PropfindRequest,
    PropstatResponse, QName, dav_props,
};
use figaro_rfc::rfc::dav::parse::parse_propfind;
use figaro_service::gateway::{DavPath, EntryInfo, MountedRoot};

use crate::app::api::dav::extract::headers;
use crate::app::api::dav::util::{dav_scope, fs_status, write_xml};

/// ## Summary
/// Answers a PROPFIND with the live properties of the target and, per
/// `Depth`, its visible descendants.
///
/// ## Errors
/// Returns 400 for a malformed body or `Depth`, 404 when missing.
#[handler]
#[tracing::instrument(skip_all, fields(method = "PROPFIND", path = %req.uri().path()))]
pub async fn propfind(req: &mut Request, res: &mut Response, depot: &Depot) {
    let scope = match dav_scope(depot) {
        Ok(scope) => scope,
        Err(status) => {
            res.status_code(status);
            return;
        }
    };

    let depth = match headers::depth(req) {
        Ok(depth) => depth.unwrap_or(Depth::Infinity),
        Err(status) => {
            res.status_code(status);
            return;
        }
    };

    let body = match req.payload().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let request = match parse_propfind(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed PROPFIND body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let entries = match scope.target.mount.fs.walk(&scope.target.path, depth).await {
        Ok(entries) => entries,
        Err(e) => {
            res.status_code(fs_status(&e));
            return;
        }
    };

    let now = scope.now();
    let mut multistatus = Multistatus::new();
    for entry in &entries {
        multistatus.add_response(entry_response(&scope.target.mount, entry, &request, now));
    }
    tracing::debug!(responses = multistatus.len(), depth = %depth.as_str(), "PROPFIND answered");

    match serialize_multistatus(&multistatus) {
        Ok(xml) => write_xml(res, StatusCode::MULTI_STATUS, xml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize multistatus");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn entry_response(
    mount: &MountedRoot,
    entry: &EntryInfo,
    request: &PropfindRequest,
    now: DateTime<Utc>,
) -> PropstatResponse {
    let href = Href::new(entry.path.to_href(&mount.href_base, entry.is_dir));
    let live = |name: &QName| {
        if name.is_dav() {
            live_property(mount, entry, name.local_name(), now)
        } else {
            None
        }
    };

    match request {
        PropfindRequest::PropName => {
            let names = dav_props::all()
                .into_iter()
                .filter(|name| live(name).is_some())
                .map(DavProperty::not_found)
                .collect();
            PropstatResponse::ok(href, names)
        }
        PropfindRequest::AllProp { include } => {
            let mut found: Vec<DavProperty> = dav_props::all().iter().filter_map(&live).collect();
            let mut missing = Vec::new();
            for PropertyName(name) in include {
                if found.iter().any(|prop| prop.name == *name) {
                    continue;
                }
                match live(name) {
                    Some(prop) => found.push(prop),
                    None => missing.push(DavProperty::not_found(name.clone())),
                }
            }
            PropstatResponse::with_found_and_not_found(href, found, missing)
        }
        PropfindRequest::Prop(names) => {
            let mut found = Vec::new();
            let mut missing = Vec::new();
            for PropertyName(name) in names {
                match live(name) {
                    Some(prop) => found.push(prop),
                    None => missing.push(DavProperty::not_found(name.clone())),
                }
            }
            PropstatResponse::with_found_and_not_found(href, found, missing)
        }
    }
}

/// Value of one `DAV:` live property, or `None` when it does not apply.
fn live_property(
    mount: &MountedRoot,
    entry: &EntryInfo,
    local_name: &str,
    now: DateTime<Utc>,
) -> Option<DavProperty> {
    let name = QName::dav(local_name.to_string());
    match local_name {
        dav_props::DISPLAYNAME => Some(DavProperty::text(name, display_name(mount, &entry.path))),
        dav_props::RESOURCETYPE => Some(if entry.is_dir {
            DavProperty::collection_resourcetype()
        } else {
            DavProperty::resource_resourcetype()
        }),
        dav_props::GETCONTENTLENGTH if !entry.is_dir => Some(DavProperty::integer(name, entry.len)),
        dav_props::GETCONTENTTYPE => Some(DavProperty::text(name, entry.content_type())),
        dav_props::GETLASTMODIFIED => Some(DavProperty::http_date(name, entry.modified)),
        dav_props::CREATIONDATE => Some(DavProperty::datetime(name, entry.created)),
        dav_props::GETETAG if !entry.is_dir => Some(DavProperty::text(name, entry.etag())),
        dav_props::SUPPORTEDLOCK => Some(DavProperty::xml(name, supportedlock_fragment())),
        dav_props::LOCKDISCOVERY => {
            let active: Vec<_> = mount
                .locks
                .discover(&entry.path, now)
                .iter()
                .map(|held| {
                    let root = held.path.to_href(&mount.href_base, held.path == entry.path && entry.is_dir);
                    held.to_active_lock(root, now)
                })
                .collect();
            match lockdiscovery_fragment(&active) {
                Ok(xml) => Some(DavProperty::xml(name, xml)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to render lockdiscovery");
                    None
                }
            }
        }
        _ => None,
    }
}

/// Last path segment; the mount root is named after its href.
fn display_name(mount: &MountedRoot, path: &DavPath) -> String {
    path.name().map_or_else(
        || {
            DavPath::parse(&mount.href_base)
                .ok()
                .and_then(|base| base.name().map(ToString::to_string))
                .unwrap_or_default()
        },
        ToString::to_string,
    )
}
