use shared::errors::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("order is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("order field `{field}` is malformed: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("mail backend misconfigured: {0}")]
    Config(String),

    #[error("invalid recipient address '{address}': {reason}")]
    InvalidRecipient { address: String, reason: String },

    #[error("mail transport error: {0}")]
    Transport(String),
}

impl From<RenderError> for ServiceError {
    fn from(err: RenderError) -> Self {
        ServiceError::Render(err.to_string())
    }
}

impl From<DispatchError> for ServiceError {
    fn from(err: DispatchError) -> Self {
        ServiceError::Dispatch(err.to_string())
    }
}
