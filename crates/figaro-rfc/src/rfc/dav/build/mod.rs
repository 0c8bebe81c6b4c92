//! `WebDAV` XML response serialization.

pub mod lock;
pub mod multistatus;

pub use lock::{lockdiscovery_fragment, serialize_lock_response, supportedlock_fragment};
pub use multistatus::serialize_multistatus;

use quick_xml::Writer;
use quick_xml::events::Event;

use crate::error::RfcResult;

/// Formats a timestamp as an RFC 1123 HTTP-date.
#[must_use]
pub fn http_date(value: chrono::DateTime<chrono::Utc>) -> String {
    value.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub(crate) fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> RfcResult<()> {
    writer.write_event(event)?;
    Ok(())
}

pub(crate) fn into_string(writer: Writer<Vec<u8>>) -> RfcResult<String> {
    Ok(String::from_utf8(writer.into_inner())?)
}
