//! Multistatus serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::{http_date, into_string, write_event};
use crate::error::RfcResult;
use crate::rfc::dav::core::{DAV_NS, DavProperty, Multistatus, PropertyValue, QName};

/// ## Summary
/// Serializes a multistatus document with the `D:` prefix bound to `DAV:`.
///
/// Properties outside `DAV:` are written with a local default namespace
/// declaration.
///
/// ## Errors
/// Returns an error if the XML writer fails.
pub fn serialize_multistatus(multistatus: &Multistatus) -> RfcResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;
    write_event(
        &mut writer,
        Event::Start(BytesStart::new("D:multistatus").with_attributes([("xmlns:D", DAV_NS)])),
    )?;

    for response in &multistatus.responses {
        start(&mut writer, "D:response")?;
        text_element(&mut writer, "D:href", response.href.as_str())?;
        for propstat in &response.propstats {
            start(&mut writer, "D:propstat")?;
            start(&mut writer, "D:prop")?;
            for property in &propstat.properties {
                write_property(&mut writer, property)?;
            }
            end(&mut writer, "D:prop")?;
            text_element(&mut writer, "D:status", &propstat.status.status_line())?;
            end(&mut writer, "D:propstat")?;
        }
        end(&mut writer, "D:response")?;
    }

    end(&mut writer, "D:multistatus")?;
    into_string(writer)
}

fn write_property(writer: &mut Writer<Vec<u8>>, property: &DavProperty) -> RfcResult<()> {
    let (name, element) = open_element(&property.name);

    let Some(value) = &property.value else {
        return write_event(writer, Event::Empty(element));
    };

    match value {
        PropertyValue::Empty => write_event(writer, Event::Empty(element)),
        PropertyValue::ResourceType(types) if types.is_empty() => {
            write_event(writer, Event::Empty(element))
        }
        PropertyValue::ResourceType(types) => {
            write_event(writer, Event::Start(element))?;
            for qname in types {
                let (_, child) = open_element(qname);
                write_event(writer, Event::Empty(child))?;
            }
            end(writer, &name)
        }
        PropertyValue::Xml(xml) => {
            write_event(writer, Event::Start(element))?;
            write_event(writer, Event::Text(BytesText::from_escaped(xml.as_str())))?;
            end(writer, &name)
        }
        PropertyValue::Text(text) => {
            write_event(writer, Event::Start(element))?;
            write_event(writer, Event::Text(BytesText::new(text)))?;
            end(writer, &name)
        }
        PropertyValue::Integer(value) => {
            write_event(writer, Event::Start(element))?;
            write_event(writer, Event::Text(BytesText::new(&value.to_string())))?;
            end(writer, &name)
        }
        PropertyValue::DateTime(value) => {
            let formatted = value.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
            write_event(writer, Event::Start(element))?;
            write_event(writer, Event::Text(BytesText::new(&formatted)))?;
            end(writer, &name)
        }
        PropertyValue::HttpDate(value) => {
            write_event(writer, Event::Start(element))?;
            write_event(writer, Event::Text(BytesText::new(&http_date(*value))))?;
            end(writer, &name)
        }
    }
}

/// Builds the opening tag for a property, declaring its namespace when it
/// has no conventional prefix.
fn open_element(qname: &QName) -> (String, BytesStart<'static>) {
    if let Some(prefix) = qname.namespace.default_prefix() {
        let name = format!("{prefix}:{}", qname.local_name());
        (name.clone(), BytesStart::new(name))
    } else {
        let name = qname.local_name().to_string();
        let element = BytesStart::new(name.clone())
            .with_attributes([("xmlns", qname.namespace_uri())]);
        (name, element.into_owned())
    }
}

fn start(writer: &mut Writer<Vec<u8>>, name: &str) -> RfcResult<()> {
    write_event(writer, Event::Start(BytesStart::new(name)))
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> RfcResult<()> {
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> RfcResult<()> {
    start(writer, name)?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    end(writer, name)
}
