use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Pool setup error: {0}")]
    PoolSetup(#[from] diesel_async::pooled_connection::PoolError),

    #[error("Connection error: {0}")]
    ConnectionError(#[from] diesel::ConnectionError),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Username candidates exhausted for {0}")]
    UsernameExhausted(String),

    #[error(transparent)]
    CoreError(#[from] figaro_core::error::CoreError),
}

impl DbError {
    /// Whether the error is a unique-constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            ))
        )
    }

    /// Builds a unique-violation error, as raised by the in-memory store.
    #[must_use]
    pub fn unique_violation(message: impl Into<String>) -> Self {
        Self::DatabaseError(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new(message.into()),
        ))
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
