use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Render error: {0}")]
    Render(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Dependency error: {0}")]
    Dependency(String),

    #[error("Dependency call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tonic::Status> for ServiceError {
    fn from(status: tonic::Status) -> Self {
        ServiceError::Dependency(format!("{}: {}", status.code(), status.message()))
    }
}
