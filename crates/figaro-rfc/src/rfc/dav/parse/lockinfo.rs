//! LOCK request XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{ParseError, ParseResult};
use super::{NsScopes, expect_root, is_blank};
use crate::rfc::dav::core::{LockInfo, LockOwner, LockScope};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Scope,
    Type,
    Owner,
}

/// Parses a LOCK request body.
///
/// ## Summary
/// A blank body is a refresh request and yields `None`. Otherwise the
/// body must be a `DAV:lockinfo` naming a scope and the `write` lock type.
///
/// ## Errors
/// Returns an error for malformed XML, a missing scope or type, or a
/// lock type other than `write`.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_lockinfo(xml: &[u8]) -> ParseResult<Option<LockInfo>> {
    if is_blank(xml) {
        return Ok(None);
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut scopes = NsScopes::default();
    let mut open = 0usize;
    let mut saw_root = false;
    let mut section: Option<Section> = None;
    let mut scope: Option<LockScope> = None;
    let mut saw_write = false;
    let mut owner_href: Option<String> = None;
    let mut owner_text = String::new();
    let mut in_owner_href = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                let qname = scopes.enter(e, open)?;

                match open {
                    0 => {
                        if saw_root {
                            return Err(ParseError::xml("multiple root elements"));
                        }
                        expect_root(&qname, "lockinfo")?;
                        saw_root = true;
                    }
                    1 if qname.is_dav() => {
                        section = match qname.local_name() {
                            "lockscope" => Some(Section::Scope),
                            "locktype" => Some(Section::Type),
                            "owner" => Some(Section::Owner),
                            _ => None,
                        };
                        if !is_start {
                            section = None;
                        }
                    }
                    2 => match section {
                        Some(Section::Scope) if qname.is_dav() => {
                            scope = match qname.local_name() {
                                "exclusive" => Some(LockScope::Exclusive),
                                "shared" => Some(LockScope::Shared),
                                other => return Err(ParseError::unexpected_element(other)),
                            };
                        }
                        Some(Section::Type) => {
                            if qname.is_dav() && qname.local_name() == "write" {
                                saw_write = true;
                            } else {
                                return Err(ParseError::unexpected_element(
                                    &qname.to_string(),
                                ));
                            }
                        }
                        Some(Section::Owner) if qname.is_dav() && qname.local_name() == "href" => {
                            owner_href.get_or_insert_with(String::new);
                            in_owner_href = is_start;
                        }
                        _ => {}
                    },
                    _ => {}
                }

                if is_start {
                    open += 1;
                } else {
                    scopes.leave(open);
                }
            }
            Event::Text(ref t) => {
                if section == Some(Section::Owner) {
                    let decoded = reader.decoder().decode(t)?;
                    if in_owner_href {
                        owner_href.get_or_insert_with(String::new).push_str(&decoded);
                    } else {
                        owner_text.push_str(&decoded);
                    }
                } else if open == 0 && !is_blank(t) {
                    return Err(ParseError::xml("text outside of the root element"));
                } else {
                    // Ignored
                }
            }
            Event::End(_) => {
                open = open.saturating_sub(1);
                scopes.leave(open);
                match open {
                    2 => in_owner_href = false,
                    1 => section = None,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if open != 0 {
        return Err(ParseError::unterminated(open));
    }
    if !saw_root {
        return Err(ParseError::missing_element("lockinfo"));
    }
    let scope = scope.ok_or_else(|| ParseError::missing_element("lockscope"))?;
    if !saw_write {
        return Err(ParseError::missing_element("locktype"));
    }

    let owner_text = owner_text.trim();
    let owner = match owner_href {
        Some(href) => Some(LockOwner::Href(href.trim().to_string())),
        None if !owner_text.is_empty() => Some(LockOwner::Text(owner_text.to_string())),
        None => None,
    };

    Ok(Some(LockInfo { scope, owner }))
}
