//! PROPPATCH request types.

use super::namespace::QName;
use super::property::DavProperty;

/// One `set` or `remove` entry of a `DAV:propertyupdate`.
#[derive(Debug, Clone)]
pub enum PatchInstruction {
    Set(DavProperty),
    Remove(QName),
}

impl PatchInstruction {
    #[must_use]
    pub fn name(&self) -> &QName {
        match self {
            Self::Set(prop) => &prop.name,
            Self::Remove(name) => name,
        }
    }
}

/// A parsed PROPPATCH body. Instructions keep document order, which
/// RFC 4918 §9.2 requires servers to apply in.
#[derive(Debug, Clone, Default)]
pub struct ProppatchRequest {
    pub instructions: Vec<PatchInstruction>,
}

impl ProppatchRequest {
    pub fn names(&self) -> impl Iterator<Item = &QName> {
        self.instructions.iter().map(PatchInstruction::name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
