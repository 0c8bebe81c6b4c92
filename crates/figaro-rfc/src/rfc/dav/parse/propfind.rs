//! PROPFIND request XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{ParseError, ParseResult};
use super::{NsScopes, expect_root, is_blank};
use crate::rfc::dav::core::{PropertyName, PropfindRequest};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Prop,
    Include,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    AllProp,
    PropName,
    Prop,
}

/// Parses a PROPFIND request body.
///
/// ## Summary
/// An empty body means `allprop`. Otherwise the root must be
/// `DAV:propfind` holding one of `allprop`, `propname` or `prop`.
///
/// ## Errors
/// Returns an error if the XML is malformed, unterminated, or rooted
/// in anything other than `DAV:propfind`.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_propfind(xml: &[u8]) -> ParseResult<PropfindRequest> {
    if is_blank(xml) {
        tracing::debug!("Empty PROPFIND body, returning allprop");
        return Ok(PropfindRequest::allprop());
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut scopes = NsScopes::default();
    let mut open = 0usize;
    let mut saw_root = false;
    let mut section: Option<Section> = None;
    let mut kind: Option<Kind> = None;
    let mut properties: Vec<PropertyName> = Vec::new();
    let mut include: Vec<PropertyName> = Vec::new();

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
                        expect_root(&qname, "propfind")?;
                        saw_root = true;
                    }
                    1 if qname.is_dav() => match qname.local_name() {
                        "allprop" => kind = Some(Kind::AllProp),
                        "propname" => kind = Some(Kind::PropName),
                        "prop" => {
                            kind.get_or_insert(Kind::Prop);
                            section = is_start.then_some(Section::Prop);
                        }
                        "include" => section = is_start.then_some(Section::Include),
                        _ => {}
                    },
                    2 => match section {
                        Some(Section::Prop) => properties.push(PropertyName::new(qname)),
                        Some(Section::Include) => include.push(PropertyName::new(qname)),
                        None => {}
                    },
                    _ => {}
                }

                if is_start {
                    open += 1;
                } else {
                    scopes.leave(open);
                }
            }
            Event::End(_) => {
                open = open.saturating_sub(1);
                scopes.leave(open);
                if open == 1 {
                    section = None;
                }
            }
            Event::Text(ref t) if open == 0 && !is_blank(t) => {
                return Err(ParseError::xml("text outside of the root element"));
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
        return Err(ParseError::missing_element("propfind"));
    }

    let request = match kind {
        Some(Kind::PropName) => PropfindRequest::PropName,
        Some(Kind::Prop) => PropfindRequest::Prop(properties),
        Some(Kind::AllProp) | None => PropfindRequest::AllProp { include },
    };

    tracing::debug!("PROPFIND request parsed");
    Ok(request)
}
