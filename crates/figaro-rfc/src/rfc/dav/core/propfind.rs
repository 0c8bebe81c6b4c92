//! What a PROPFIND asks for.

use super::property::PropertyName;

/// The three request shapes of RFC 4918 §9.1. An empty body is `AllProp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropfindRequest {
    /// Every live property, plus any `DAV:include`d names.
    AllProp { include: Vec<PropertyName> },
    /// Names only, with empty values.
    PropName,
    /// Exactly the named properties.
    Prop(Vec<PropertyName>),
}

impl PropfindRequest {
    #[must_use]
    pub const fn allprop() -> Self {
        Self::AllProp {
            include: Vec::new(),
        }
    }

    /// Names listed under `DAV:prop`, if this is a `prop` request.
    #[must_use]
    pub fn named(&self) -> Option<&[PropertyName]> {
        match self {
            Self::Prop(names) => Some(names),
            Self::AllProp { .. } | Self::PropName => None,
        }
    }
}

impl Default for PropfindRequest {
    fn default() -> Self {
        Self::allprop()
    }
}
