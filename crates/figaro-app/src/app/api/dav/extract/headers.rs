//! Parsing of the `WebDAV` request headers.

use salvo::Request;
use salvo::http::StatusCode;

use figaro_rfc::rfc::dav::core::{Depth, Timeout};

fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

/// ## Summary
/// Parses the `Depth` header.
///
/// Returns `Ok(None)` when absent.
///
/// ## Errors
/// Returns 400 when present but invalid.
pub fn depth(req: &Request) -> Result<Option<Depth>, StatusCode> {
    match header(req, "Depth") {
        None => Ok(None),
        Some(value) => Depth::from_header(value)
            .map(Some)
            .ok_or(StatusCode::BAD_REQUEST),
    }
}

/// `Overwrite` header; defaults to `T`.
#[must_use]
pub fn overwrite(req: &Request) -> bool {
    header(req, "Overwrite").is_none_or(|value| !value.trim().eq_ignore_ascii_case("F"))
}

#[must_use]
pub fn destination(req: &Request) -> Option<&str> {
    header(req, "Destination").filter(|value| !value.trim().is_empty())
}

#[must_use]
pub fn timeout(req: &Request) -> Option<Timeout> {
    header(req, "Timeout").and_then(Timeout::from_header)
}

/// Token of the `Lock-Token` header, without angle brackets.
#[must_use]
pub fn lock_token(req: &Request) -> Option<String> {
    header(req, "Lock-Token").and_then(parse_lock_token)
}

/// Every lock token submitted in the `If` header.
#[must_use]
pub fn submitted_tokens(req: &Request) -> Vec<String> {
    header(req, "If").map(parse_if_tokens).unwrap_or_default()
}

fn parse_lock_token(value: &str) -> Option<String> {
    let token = value.trim().trim_start_matches('<').trim_end_matches('>').trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Collects the `<token>` state tokens inside the parenthesized lists of an
/// `If` header. Tagged resources (`<href> (...)`) and `Not` are tolerated;
/// entity tags in brackets are skipped.
fn parse_if_tokens(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut depth = 0_usize;
    let mut rest = value;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '(' => {
                depth += 1;
                rest = &rest[1..];
            }
            ')' => {
                depth = depth.saturating_sub(1);
                rest = &rest[1..];
            }
            '<' => {
                let Some(end) = rest.find('>') else {
                    break;
                };
                if depth > 0 {
                    tokens.push(rest[1..end].trim().to_string());
                }
                rest = &rest[end + 1..];
            }
            '[' => {
                let Some(end) = rest.find(']') else {
                    break;
                };
                rest = &rest[end + 1..];
            }
            _ => rest = &rest[ch.len_utf8()..],
        }
    }

    tokens.retain(|token| !token.is_empty());
    tokens
}
