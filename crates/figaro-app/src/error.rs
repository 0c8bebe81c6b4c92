use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] figaro_service::error::ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] figaro_db::error::DbError),

    #[error(transparent)]
    RfcError(#[from] figaro_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] figaro_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
