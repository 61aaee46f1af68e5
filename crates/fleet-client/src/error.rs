//! Client error model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Fleet answered with a status code the operation does not expect.
    /// The response body is kept as detail.
    #[error("Unexpected status code from server: got HTTP {status}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn unexpected(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    /// The response body attached to the error, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}
