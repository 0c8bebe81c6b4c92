//! Namespaced XML names.

use std::borrow::Cow;
use std::fmt;

pub const DAV_NS: &str = "DAV:";

/// A namespace URI. Borrowed for the well-known ones, owned when read off
/// a request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(pub Cow<'static, str>);

impl Namespace {
    pub const DAV: Self = Self(Cow::Borrowed(DAV_NS));

    #[must_use]
    pub fn new(uri: impl Into<Cow<'static, str>>) -> Self {
        Self(uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix bound on the multistatus root. Only `DAV:` gets one; other
    /// namespaces are declared on the element that uses them.
    #[must_use]
    pub fn default_prefix(&self) -> Option<&'static str> {
        (self.0 == DAV_NS).then_some("D")
    }
}

impl From<&'static str> for Namespace {
    fn from(uri: &'static str) -> Self {
        Self(Cow::Borrowed(uri))
    }
}

impl From<String> for Namespace {
    fn from(uri: String) -> Self {
        Self(Cow::Owned(uri))
    }
}

/// Element name resolved against its namespace, written `{ns}local` in
/// logs and errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Namespace,
    pub local_name: Cow<'static, str>,
}

impl QName {
    #[must_use]
    pub fn new(namespace: impl Into<Namespace>, local_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    #[must_use]
    pub fn dav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::DAV, local_name)
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    #[must_use]
    pub fn namespace_uri(&self) -> &str {
        self.namespace.as_str()
    }

    #[must_use]
    pub fn is_dav(&self) -> bool {
        self.namespace == Namespace::DAV
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace_uri(), self.local_name)
    }
}

/// `DAV:` live properties the file gateway computes.
pub mod dav_props {
    use super::QName;

    pub const DISPLAYNAME: &str = "displayname";
    pub const RESOURCETYPE: &str = "resourcetype";
    pub const GETCONTENTLENGTH: &str = "getcontentlength";
    pub const GETCONTENTTYPE: &str = "getcontenttype";
    pub const GETLASTMODIFIED: &str = "getlastmodified";
    pub const CREATIONDATE: &str = "creationdate";
    pub const GETETAG: &str = "getetag";
    pub const SUPPORTEDLOCK: &str = "supportedlock";
    pub const LOCKDISCOVERY: &str = "lockdiscovery";

    /// Order used for `allprop` and `propname` answers.
    pub const ALL: &[&str] = &[
        DISPLAYNAME,
        RESOURCETYPE,
        GETCONTENTLENGTH,
        GETCONTENTTYPE,
        GETLASTMODIFIED,
        CREATIONDATE,
        GETETAG,
        SUPPORTEDLOCK,
        LOCKDISCOVERY,
    ];

    #[must_use]
    pub fn all() -> Vec<QName> {
        ALL.iter().copied().map(QName::dav).collect()
    }
}
