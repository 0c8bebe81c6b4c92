use thiserror::Error;

/// Failures of the request plumbing shared by every layer.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A hoop that should have run before the handler did not inject its
    /// value. Always a routing bug.
    #[error("{0} missing from request depot")]
    MissingFromDepot(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
