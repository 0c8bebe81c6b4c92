//! Errors raised while reading WebDAV request bodies.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Why a request body was rejected. Every variant maps to 400.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("missing required element: {0}")]
    MissingElement(&'static str),

    #[error("unexpected element: {0}")]
    UnexpectedElement(String),

    #[error("document ended with {0} unclosed element(s)")]
    Unterminated(usize),

    #[error("body is not valid text: {0}")]
    Encoding(String),
}

impl ParseError {
    #[must_use]
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    #[must_use]
    pub const fn missing_element(name: &'static str) -> Self {
        Self::MissingElement(name)
    }

    #[must_use]
    pub fn unexpected_element(name: &str) -> Self {
        Self::UnexpectedElement(name.to_string())
    }

    #[must_use]
    pub const fn unterminated(open: usize) -> Self {
        Self::Unterminated(open)
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for ParseError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Encoding(err.to_string())
    }
}
