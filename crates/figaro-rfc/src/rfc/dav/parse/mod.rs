//! Request body parsers for PROPFIND, PROPPATCH and LOCK.
//!
//! Each parser is a single pass over `quick_xml` events that tracks element
//! depth by hand.

mod error;
pub mod lockinfo;
pub mod propfind;
pub mod proppatch;

pub use error::{ParseError, ParseResult};
pub use lockinfo::parse_lockinfo;
pub use propfind::parse_propfind;
pub use proppatch::parse_proppatch;

use quick_xml::events::BytesStart;

use crate::rfc::dav::core::{DAV_NS, Namespace, QName};

/// Whether a request body carries anything besides whitespace.
#[must_use]
pub fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// `xmlns` bindings in scope while walking a document.
///
/// Each binding remembers the depth of the element that declared it and
/// is dropped once that element closes.
#[derive(Debug, Default)]
pub(crate) struct NsScopes {
    bindings: Vec<Binding>,
}

#[derive(Debug)]
struct Binding {
    depth: usize,
    prefix: String,
    uri: String,
}

impl NsScopes {
    /// Registers the declarations on `e` (at `depth`) and resolves its name.
    ///
    /// A prefix with no binding in scope resolves to `DAV:`, as does an
    /// unprefixed name with no default namespace.
    pub(crate) fn enter(&mut self, e: &BytesStart<'_>, depth: usize) -> ParseResult<QName> {
        for attr in e.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let prefix = match key.strip_prefix("xmlns") {
                Some("") => "",
                Some(rest) => match rest.strip_prefix(':') {
                    Some(prefix) => prefix,
                    None => continue,
                },
                None => continue,
            };
            self.bindings.push(Binding {
                depth,
                prefix: prefix.to_owned(),
                uri: std::str::from_utf8(&attr.value)?.to_owned(),
            });
        }

        let raw = e.name();
        let name = std::str::from_utf8(raw.as_ref())?;
        let (prefix, local) = name.split_once(':').unwrap_or(("", name));
        let uri = self
            .bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map_or(DAV_NS, |b| b.uri.as_str());

        Ok(QName::new(Namespace::new(uri.to_owned()), local.to_owned()))
    }

    /// Drops bindings declared at `depth` or deeper.
    pub(crate) fn leave(&mut self, depth: usize) {
        while self.bindings.last().is_some_and(|b| b.depth >= depth) {
            self.bindings.pop();
        }
    }
}

/// Checks that the root element is the expected `DAV:` element.
pub(crate) fn expect_root(qname: &QName, expected: &str) -> ParseResult<()> {
    if qname.is_dav() && qname.local_name() == expected {
        Ok(())
    } else {
        Err(ParseError::unexpected_element(&qname.to_string()))
    }
}
