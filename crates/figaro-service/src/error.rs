use thiserror::Error;

use crate::gateway::FsError;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Session expired or absent")]
    SessionExpiredOrAbsent,

    #[error("WebDAV token expired or absent")]
    TokenExpiredOrAbsent,

    #[error("OAuth login is disabled")]
    OAuthDisabled,

    #[error("OAuth login is misconfigured")]
    OAuthMisconfigured,

    #[error("OAuth state mismatch")]
    OAuthStateMismatch,

    #[error("OAuth account domain rejected")]
    OAuthDomainRejected,

    #[error("OAuth exchange failed: {0}")]
    OAuthExchange(&'static str),

    #[error("Folder not accessible")]
    FolderNotAccessible,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    DatabaseError(#[from] figaro_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] figaro_core::error::CoreError),

    #[error(transparent)]
    FsError(#[from] FsError),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl ServiceError {
    /// Whether the error stems from the caller rather than the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::UserNotFound
                | Self::SessionExpiredOrAbsent
                | Self::TokenExpiredOrAbsent
                | Self::OAuthStateMismatch
                | Self::OAuthDomainRejected
                | Self::OAuthExchange(_)
                | Self::FolderNotAccessible
                | Self::PermissionDenied
                | Self::Validation(_)
        )
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
