//! Lock discovery serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::{into_string, write_event};
use crate::error::RfcResult;
use crate::rfc::dav::core::{ActiveLock, DAV_NS, LockOwner};

/// Inner XML of `D:supportedlock`: exclusive write only.
#[must_use]
pub fn supportedlock_fragment() -> String {
    "<D:lockentry><D:lockscope><D:exclusive/></D:lockscope>\
     <D:locktype><D:write/></D:locktype></D:lockentry>"
        .to_string()
}

/// ## Summary
/// Renders the inner XML of `D:lockdiscovery` for the given locks.
///
/// ## Errors
/// Returns an error if the XML writer fails.
pub fn lockdiscovery_fragment(locks: &[ActiveLock]) -> RfcResult<String> {
    let mut writer = Writer::new(Vec::new());
    for lock in locks {
        write_active_lock(&mut writer, lock)?;
    }
    into_string(writer)
}

/// ## Summary
/// Serializes the body of a successful LOCK response:
/// `<D:prop><D:lockdiscovery>…</D:lockdiscovery></D:prop>`.
///
/// ## Errors
/// Returns an error if the XML writer fails.
pub fn serialize_lock_response(lock: &ActiveLock) -> RfcResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;
    write_event(
        &mut writer,
        Event::Start(BytesStart::new("D:prop").with_attributes([("xmlns:D", DAV_NS)])),
    )?;
    start(&mut writer, "D:lockdiscovery")?;
    write_active_lock(&mut writer, lock)?;
    end(&mut writer, "D:lockdiscovery")?;
    end(&mut writer, "D:prop")?;
    into_string(writer)
}

fn write_active_lock(writer: &mut Writer<Vec<u8>>, lock: &ActiveLock) -> RfcResult<()> {
    start(writer, "D:activelock")?;

    start(writer, "D:locktype")?;
    empty(writer, "D:write")?;
    end(writer, "D:locktype")?;

    start(writer, "D:lockscope")?;
    empty(writer, "D:exclusive")?;
    end(writer, "D:lockscope")?;

    text_element(writer, "D:depth", lock.depth.as_str())?;

    match &lock.owner {
        Some(LockOwner::Href(href)) => {
            start(writer, "D:owner")?;
            text_element(writer, "D:href", href)?;
            end(writer, "D:owner")?;
        }
        Some(LockOwner::Text(text)) => text_element(writer, "D:owner", text)?,
        None => {}
    }

    text_element(writer, "D:timeout", &format!("Second-{}", lock.timeout_secs))?;

    start(writer, "D:locktoken")?;
    text_element(writer, "D:href", &lock.token)?;
    end(writer, "D:locktoken")?;

    start(writer, "D:lockroot")?;
    text_element(writer, "D:href", &lock.root)?;
    end(writer, "D:lockroot")?;

    end(writer, "D:activelock")
}

fn start(writer: &mut Writer<Vec<u8>>, name: &str) -> RfcResult<()> {
    write_event(writer, Event::Start(BytesStart::new(name)))
}

fn empty(writer: &mut Writer<Vec<u8>>, name: &str) -> RfcResult<()> {
    write_event(writer, Event::Empty(BytesStart::new(name)))
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> RfcResult<()> {
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> RfcResult<()> {
    start(writer, name)?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    end(writer, name)
}
