//! Property names and values carried in multistatus bodies.

use chrono::{DateTime, Utc};

use super::namespace::QName;

/// A property named in a PROPFIND `prop` or `include` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyName(pub QName);

impl PropertyName {
    #[must_use]
    pub const fn new(qname: QName) -> Self {
        Self(qname)
    }

    #[must_use]
    pub const fn qname(&self) -> &QName {
        &self.0
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        self.0.local_name()
    }
}

impl From<QName> for PropertyName {
    fn from(qname: QName) -> Self {
        Self(qname)
    }
}

/// A property as it appears inside a `DAV:propstat`.
///
/// `value: None` is how refused and unknown properties are reported: the
/// element is written empty under a 403 or 404 status.
#[derive(Debug, Clone)]
pub struct DavProperty {
    pub name: QName,
    pub value: Option<PropertyValue>,
}

impl DavProperty {
    const fn with(name: QName, value: PropertyValue) -> Self {
        Self {
            name,
            value: Some(value),
        }
    }

    #[must_use]
    pub const fn not_found(name: QName) -> Self {
        Self { name, value: None }
    }

    #[must_use]
    pub const fn empty(name: QName) -> Self {
        Self::with(name, PropertyValue::Empty)
    }

    #[must_use]
    pub fn text(name: QName, value: impl Into<String>) -> Self {
        Self::with(name, PropertyValue::Text(value.into()))
    }

    #[must_use]
    pub const fn integer(name: QName, value: u64) -> Self {
        Self::with(name, PropertyValue::Integer(value))
    }

    /// RFC 3339 timestamp, as `creationdate` wants.
    #[must_use]
    pub const fn datetime(name: QName, value: DateTime<Utc>) -> Self {
        Self::with(name, PropertyValue::DateTime(value))
    }

    /// RFC 1123 HTTP-date, as `getlastmodified` wants.
    #[must_use]
    pub const fn http_date(name: QName, value: DateTime<Utc>) -> Self {
        Self::with(name, PropertyValue::HttpDate(value))
    }

    /// Already-serialized children, written verbatim. Must use the `D:`
    /// prefix for `DAV:` elements.
    #[must_use]
    pub fn xml(name: QName, xml: impl Into<String>) -> Self {
        Self::with(name, PropertyValue::Xml(xml.into()))
    }

    /// `<D:resourcetype><D:collection/></D:resourcetype>`
    #[must_use]
    pub fn collection_resourcetype() -> Self {
        Self::with(
            QName::dav("resourcetype"),
            PropertyValue::ResourceType(vec![QName::dav("collection")]),
        )
    }

    /// `<D:resourcetype/>`
    #[must_use]
    pub fn resource_resourcetype() -> Self {
        Self::with(QName::dav("resourcetype"), PropertyValue::ResourceType(Vec::new()))
    }
}

#[derive(Debug, Clone)]
pub enum PropertyValue {
    Empty,
    /// Escaped on output.
    Text(String),
    Integer(u64),
    DateTime(DateTime<Utc>),
    HttpDate(DateTime<Utc>),
    ResourceType(Vec<QName>),
    Xml(String),
}

impl PropertyValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Xml(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}
