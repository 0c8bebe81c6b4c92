use std::io;

use salvo::http::StatusCode;
use thiserror::Error;

/// Filesystem errors. Messages never carry paths.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Already exists")]
    AlreadyExists,

    #[error("Parent collection missing")]
    MissingParent,

    #[error("Target is a collection")]
    IsCollection,

    #[error("IO error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for FsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Forbidden,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            _ => Self::Io(err),
        }
    }
}

impl FsError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AlreadyExists | Self::IsCollection => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingParent => StatusCode::CONFLICT,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type FsResult<T> = std::result::Result<T, FsError>;
