use thiserror::Error;

use crate::rfc::dav::parse::ParseError;

#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("XML write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("Serialized XML is not UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
