//! PROPPATCH request XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{ParseError, ParseResult};
use super::{NsScopes, expect_root, is_blank};
use crate::rfc::dav::core::{DavProperty, PatchInstruction, ProppatchRequest, QName};

#[derive(Clone, Copy)]
enum Op {
    Set,
    Remove,
}

/// Parses a PROPPATCH request body.
///
/// ## Summary
/// Collects every property named under `set` and `remove`, in document
/// order. Text content of set properties is kept; nested markup is not.
///
/// ## Errors
/// Returns an error if the body is empty or malformed, is not rooted in
/// `DAV:propertyupdate`, or names no properties.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_proppatch(xml: &[u8]) -> ParseResult<ProppatchRequest> {
    if is_blank(xml) {
        return Err(ParseError::missing_element("propertyupdate"));
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut scopes = NsScopes::default();
    let mut request = ProppatchRequest::default();
    let mut open = 0usize;
    let mut saw_root = false;
    let mut operation: Option<Op> = None;
    let mut in_prop = false;
    let mut pending: Option<QName> = None;
    let mut content = String::new();

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
                        expect_root(&qname, "propertyupdate")?;
                        saw_root = true;
                    }
                    1 if qname.is_dav() => {
                        operation = match qname.local_name() {
                            "set" => Some(Op::Set),
                            "remove" => Some(Op::Remove),
                            other => return Err(ParseError::unexpected_element(other)),
                        };
                    }
                    2 if operation.is_some() && qname.is_dav() && qname.local_name() == "prop" => {
                        in_prop = is_start;
                    }
                    3 if in_prop => {
                        if is_start {
                            pending = Some(qname);
                            content.clear();
                        } else {
                            push_instruction(&mut request, operation, qname, "");
                        }
                    }
                    _ => {}
                }

                if is_start {
                    open += 1;
                } else {
                    scopes.leave(open);
                }
            }
            Event::Text(ref t) => {
                if pending.is_some() {
                    content.push_str(&reader.decoder().decode(t)?);
                } else if open == 0 && !is_blank(t) {
                    return Err(ParseError::xml("text outside of the root element"));
                } else {
                    // Whitespace or ignored markup
                }
            }
            Event::End(_) => {
                open = open.saturating_sub(1);
                scopes.leave(open);
                match open {
                    3 => {
                        if let Some(qname) = pending.take() {
                            push_instruction(&mut request, operation, qname, &content);
                        }
                    }
                    2 => in_prop = false,
                    1 => operation = None,
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
        return Err(ParseError::missing_element("propertyupdate"));
    }
    if request.is_empty() {
        return Err(ParseError::missing_element("set or remove"));
    }

    Ok(request)
}

fn push_instruction(request: &mut ProppatchRequest, op: Option<Op>, qname: QName, content: &str) {
    let instruction = match op {
        Some(Op::Set) => match content.trim() {
            "" => PatchInstruction::Set(DavProperty::empty(qname)),
            text => PatchInstruction::Set(DavProperty::text(qname, text)),
        },
        Some(Op::Remove) => PatchInstruction::Remove(qname),
        None => return,
    };
    request.instructions.push(instruction);
}
